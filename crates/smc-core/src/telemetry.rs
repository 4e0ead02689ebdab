//! Live telemetry: the snapshot contract, the link state machine that fails
//! over between the push channel and polling, and the display projection.

use crate::format::{clamp_percent, format_bytes, format_rate, format_timestamp, percent_of};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_secs(1);
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TelemetrySnapshot {
    pub cpu_usage: f64,
    pub system_load_average: Vec<f64>,
    pub memory_used_bytes: u64,
    pub memory_free_bytes: u64,
    pub memory_total_bytes: u64,
    pub disk_total_bytes: u64,
    pub disk_free_bytes: u64,
    pub disk_read_bytes_per_sec: f64,
    pub disk_write_bytes_per_sec: f64,
    pub net_up_bytes_per_sec: f64,
    pub net_down_bytes_per_sec: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

pub fn parse_snapshot(text: &str) -> Result<TelemetrySnapshot, serde_json::Error> {
    serde_json::from_str(text)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Connecting,
    Live,
    Retrying,
    Offline,
}

impl ConnectionStatus {
    pub fn label(self) -> &'static str {
        match self {
            ConnectionStatus::Connecting => "connecting",
            ConnectionStatus::Live => "live",
            ConnectionStatus::Retrying => "retrying",
            ConnectionStatus::Offline => "offline",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    Push,
    Poll,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkTiming {
    pub reconnect_delay: Duration,
    pub poll_interval: Duration,
}

impl Default for LinkTiming {
    fn default() -> Self {
        Self {
            reconnect_delay: DEFAULT_RECONNECT_DELAY,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

/// Everything the transports report back to the link.
#[derive(Debug, Clone, PartialEq)]
pub enum LinkEvent {
    /// The push channel could not be opened at all.
    PushUnavailable(String),
    PushOpened,
    Frame(String),
    /// Transport error on an open channel; the channel is still open.
    PushFailed(String),
    PushClosed,
    PollSucceeded(TelemetrySnapshot),
    PollFailed(String),
}

/// What the transport side must do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkCommand {
    None,
    Connect,
    Close,
    ReconnectAfter(Duration),
    StartPolling(Duration),
}

#[derive(Debug, Clone)]
pub struct TelemetryLink {
    status: ConnectionStatus,
    transport: Transport,
    timing: LinkTiming,
    latest: Option<TelemetrySnapshot>,
    reconnects: u64,
    dropped_frames: u64,
}

impl TelemetryLink {
    pub fn new(timing: LinkTiming) -> Self {
        Self {
            status: ConnectionStatus::Connecting,
            transport: Transport::Push,
            timing,
            latest: None,
            reconnects: 0,
            dropped_frames: 0,
        }
    }

    pub fn start(&self) -> LinkCommand {
        LinkCommand::Connect
    }

    pub fn status(&self) -> ConnectionStatus {
        self.status
    }

    pub fn transport(&self) -> Transport {
        self.transport
    }

    pub fn timing(&self) -> LinkTiming {
        self.timing
    }

    pub fn latest(&self) -> Option<&TelemetrySnapshot> {
        self.latest.as_ref()
    }

    pub fn reconnects(&self) -> u64 {
        self.reconnects
    }

    pub fn dropped_frames(&self) -> u64 {
        self.dropped_frames
    }

    /// The single transition function. Polling is terminal: once entered,
    /// push events are ignored.
    pub fn on_event(&mut self, event: LinkEvent) -> LinkCommand {
        match (self.transport, event) {
            (Transport::Push, LinkEvent::PushOpened) => {
                self.status = ConnectionStatus::Live;
                LinkCommand::None
            }
            (Transport::Push, LinkEvent::Frame(text)) => {
                match parse_snapshot(&text) {
                    Ok(snapshot) => self.render(snapshot),
                    Err(_) => self.dropped_frames += 1,
                }
                LinkCommand::None
            }
            (Transport::Push, LinkEvent::PushFailed(_)) => LinkCommand::Close,
            (Transport::Push, LinkEvent::PushClosed) => {
                self.status = ConnectionStatus::Retrying;
                self.reconnects += 1;
                LinkCommand::ReconnectAfter(self.timing.reconnect_delay)
            }
            (Transport::Push, LinkEvent::PushUnavailable(_)) => {
                self.transport = Transport::Poll;
                LinkCommand::StartPolling(self.timing.poll_interval)
            }
            (_, LinkEvent::PollSucceeded(snapshot)) => {
                self.render(snapshot);
                LinkCommand::None
            }
            (_, LinkEvent::PollFailed(_)) => {
                self.status = ConnectionStatus::Offline;
                LinkCommand::None
            }
            (Transport::Poll, _) => LinkCommand::None,
        }
    }

    fn render(&mut self, snapshot: TelemetrySnapshot) {
        self.latest = Some(snapshot);
        self.status = ConnectionStatus::Live;
    }
}

impl Default for TelemetryLink {
    fn default() -> Self {
        Self::new(LinkTiming::default())
    }
}

/// Display-ready strings and gauge levels for one snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetryPanel {
    pub cpu_text: String,
    pub cpu_percent: f64,
    pub load_text: String,
    pub memory_used: String,
    pub memory_free: String,
    pub memory_total: String,
    pub memory_percent: f64,
    pub disk_used: String,
    pub disk_free: String,
    pub disk_read: String,
    pub disk_write: String,
    pub net_up: String,
    pub net_down: String,
    pub sampled_at: Option<String>,
}

impl TelemetryPanel {
    pub fn from_snapshot(snapshot: &TelemetrySnapshot) -> Self {
        let cpu_raw = snapshot.cpu_usage * 100.0;
        let load_text = snapshot
            .system_load_average
            .iter()
            .map(|value| format!("{value:.2}"))
            .collect::<Vec<_>>()
            .join(" / ");
        let disk_used = snapshot
            .disk_total_bytes
            .saturating_sub(snapshot.disk_free_bytes);
        Self {
            cpu_text: format!("{:.1}%", if cpu_raw.is_finite() { cpu_raw } else { 0.0 }),
            cpu_percent: clamp_percent(cpu_raw),
            load_text: if load_text.is_empty() {
                "-".to_string()
            } else {
                load_text
            },
            memory_used: format_bytes(snapshot.memory_used_bytes),
            memory_free: format_bytes(snapshot.memory_free_bytes),
            memory_total: format_bytes(snapshot.memory_total_bytes),
            memory_percent: percent_of(
                snapshot.memory_used_bytes as f64,
                snapshot.memory_total_bytes as f64,
            ),
            disk_used: format_bytes(disk_used),
            disk_free: format_bytes(snapshot.disk_free_bytes),
            disk_read: format_rate(snapshot.disk_read_bytes_per_sec),
            disk_write: format_rate(snapshot.disk_write_bytes_per_sec),
            net_up: format_rate(snapshot.net_up_bytes_per_sec),
            net_down: format_rate(snapshot.net_down_bytes_per_sec),
            sampled_at: snapshot.timestamp.map(format_timestamp),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> TelemetrySnapshot {
        TelemetrySnapshot {
            cpu_usage: 0.25,
            system_load_average: vec![0.5, 0.25, 1.0],
            memory_used_bytes: 1024 * 1024,
            memory_free_bytes: 3 * 1024 * 1024,
            memory_total_bytes: 4 * 1024 * 1024,
            disk_total_bytes: 10 * 1024,
            disk_free_bytes: 4 * 1024,
            disk_read_bytes_per_sec: 100.0,
            disk_write_bytes_per_sec: 2048.0,
            net_up_bytes_per_sec: 0.0,
            net_down_bytes_per_sec: 1024.0 * 1024.0,
            timestamp: None,
        }
    }

    #[test]
    fn parses_backend_json_with_missing_fields() {
        let snapshot = parse_snapshot(r#"{"cpuUsage":0.5,"memoryTotalBytes":2048}"#)
            .expect("parse snapshot");
        assert_eq!(snapshot.cpu_usage, 0.5);
        assert_eq!(snapshot.memory_total_bytes, 2048);
        assert!(snapshot.system_load_average.is_empty());
        assert_eq!(snapshot.timestamp, None);
    }

    #[test]
    fn rejects_non_json_frames() {
        assert!(parse_snapshot("not json").is_err());
        assert!(parse_snapshot(r#"{"memoryUsedBytes":"lots"}"#).is_err());
    }

    #[test]
    fn push_open_then_close_schedules_single_reconnect() {
        let mut link = TelemetryLink::default();
        assert_eq!(link.start(), LinkCommand::Connect);
        assert_eq!(link.status(), ConnectionStatus::Connecting);

        assert_eq!(link.on_event(LinkEvent::PushOpened), LinkCommand::None);
        assert_eq!(link.status(), ConnectionStatus::Live);

        assert_eq!(
            link.on_event(LinkEvent::PushClosed),
            LinkCommand::ReconnectAfter(Duration::from_secs(1))
        );
        assert_eq!(link.status(), ConnectionStatus::Retrying);
        assert_eq!(link.reconnects(), 1);
    }

    #[test]
    fn reconnect_cadence_never_grows() {
        let timing = LinkTiming {
            reconnect_delay: Duration::from_millis(250),
            poll_interval: Duration::from_millis(500),
        };
        let mut link = TelemetryLink::new(timing);
        for _ in 0..5 {
            link.on_event(LinkEvent::PushOpened);
            assert_eq!(
                link.on_event(LinkEvent::PushClosed),
                LinkCommand::ReconnectAfter(Duration::from_millis(250))
            );
        }
        assert_eq!(link.reconnects(), 5);
    }

    #[test]
    fn transport_error_requests_close_before_retry() {
        let mut link = TelemetryLink::default();
        link.on_event(LinkEvent::PushOpened);
        assert_eq!(
            link.on_event(LinkEvent::PushFailed("reset".to_string())),
            LinkCommand::Close
        );
        assert_eq!(link.status(), ConnectionStatus::Live);
        assert_eq!(
            link.on_event(LinkEvent::PushClosed),
            LinkCommand::ReconnectAfter(DEFAULT_RECONNECT_DELAY)
        );
    }

    #[test]
    fn unavailable_push_falls_back_to_polling_for_good() {
        let mut link = TelemetryLink::default();
        assert_eq!(
            link.on_event(LinkEvent::PushUnavailable("refused".to_string())),
            LinkCommand::StartPolling(DEFAULT_POLL_INTERVAL)
        );
        assert_eq!(link.transport(), Transport::Poll);

        assert_eq!(
            link.on_event(LinkEvent::PollFailed("timeout".to_string())),
            LinkCommand::None
        );
        assert_eq!(link.status(), ConnectionStatus::Offline);

        assert_eq!(
            link.on_event(LinkEvent::PollSucceeded(sample())),
            LinkCommand::None
        );
        assert_eq!(link.status(), ConnectionStatus::Live);

        assert_eq!(link.on_event(LinkEvent::PushClosed), LinkCommand::None);
        assert_eq!(
            link.on_event(LinkEvent::PushUnavailable("again".to_string())),
            LinkCommand::None
        );
        assert_eq!(link.status(), ConnectionStatus::Live);
    }

    #[test]
    fn malformed_frame_is_dropped_without_status_change() {
        let mut link = TelemetryLink::default();
        link.on_event(LinkEvent::PushOpened);
        link.on_event(LinkEvent::Frame(r#"{"cpuUsage":0.1}"#.to_string()));
        link.on_event(LinkEvent::Frame("{broken".to_string()));

        assert_eq!(link.status(), ConnectionStatus::Live);
        assert_eq!(link.dropped_frames(), 1);
        assert_eq!(link.latest().map(|s| s.cpu_usage), Some(0.1));
    }

    #[test]
    fn frames_render_in_arrival_order_without_staleness_check() {
        let mut link = TelemetryLink::default();
        link.on_event(LinkEvent::PushOpened);
        link.on_event(LinkEvent::Frame(
            r#"{"cpuUsage":0.9,"timestamp":200}"#.to_string(),
        ));
        link.on_event(LinkEvent::Frame(
            r#"{"cpuUsage":0.2,"timestamp":100}"#.to_string(),
        ));
        assert_eq!(link.latest().and_then(|s| s.timestamp), Some(100));
    }

    #[test]
    fn panel_formats_every_field() {
        let panel = TelemetryPanel::from_snapshot(&sample());
        assert_eq!(panel.cpu_text, "25.0%");
        assert_eq!(panel.cpu_percent, 25.0);
        assert_eq!(panel.load_text, "0.50 / 0.25 / 1.00");
        assert_eq!(panel.memory_used, "1.0 MB");
        assert_eq!(panel.memory_free, "3.0 MB");
        assert_eq!(panel.memory_total, "4.0 MB");
        assert_eq!(panel.memory_percent, 25.0);
        assert_eq!(panel.disk_used, "6.0 KB");
        assert_eq!(panel.disk_free, "4.0 KB");
        assert_eq!(panel.disk_read, "100 B/s");
        assert_eq!(panel.disk_write, "2.0 KB/s");
        assert_eq!(panel.net_up, "0 B/s");
        assert_eq!(panel.net_down, "1.0 MB/s");
        assert_eq!(panel.sampled_at, None);
    }

    #[test]
    fn panel_clamps_inconsistent_upstream_values() {
        let snapshot = TelemetrySnapshot {
            cpu_usage: 1.7,
            memory_used_bytes: 8 * 1024,
            memory_total_bytes: 4 * 1024,
            disk_total_bytes: 10,
            disk_free_bytes: 50,
            ..TelemetrySnapshot::default()
        };
        let panel = TelemetryPanel::from_snapshot(&snapshot);
        assert_eq!(panel.cpu_percent, 100.0);
        assert_eq!(panel.cpu_text, "170.0%");
        assert_eq!(panel.memory_percent, 100.0);
        assert_eq!(panel.disk_used, "0 B");
        assert_eq!(panel.load_text, "-");

        let empty = TelemetryPanel::from_snapshot(&TelemetrySnapshot::default());
        assert_eq!(empty.memory_percent, 0.0);
    }
}
