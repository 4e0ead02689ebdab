//! Network side of the console. Nothing here decides what happens next: the
//! telemetry loop executes the link's commands and reports what it sees, and
//! file requests are executed as described.

use crate::app::AppEvent;
use futures_util::StreamExt;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use smc_core::{
    ApiError, Endpoints, FileReply, FileRequest, HttpMethod, LinkCommand, LinkEvent,
    TelemetrySnapshot,
};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, info, warn};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct Backend {
    client: reqwest::Client,
    endpoints: Endpoints,
}

impl Backend {
    pub fn new(endpoints: Endpoints) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { client, endpoints })
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// Metrics are the one endpoint that takes the token as a bearer header.
    pub async fn fetch_metrics(&self) -> Result<TelemetrySnapshot, ApiError> {
        let mut builder = self.client.get(self.endpoints.metrics_url());
        if let Some(bearer) = self.endpoints.bearer() {
            builder = builder.header(AUTHORIZATION, bearer);
        }
        let body = send_text(builder).await?;
        smc_core::telemetry::parse_snapshot(&body)
            .map_err(|err| ApiError::Malformed(err.to_string()))
    }

    pub async fn execute(&self, request: &FileRequest) -> Result<FileReply, ApiError> {
        let url = self.endpoints.file_url(request);
        let builder = match request.method() {
            HttpMethod::Get => self.client.get(url),
            HttpMethod::Post => self
                .client
                .post(url)
                .header(CONTENT_TYPE, "text/plain; charset=utf-8")
                .body(request.body().unwrap_or_default().to_string()),
        };
        let body = send_text(builder).await?;
        FileReply::from_body(request, &body)
    }

    pub async fn check_health(&self) -> Result<String, ApiError> {
        let body = send_text(self.client.get(self.endpoints.health_url())).await?;
        Ok(body.trim().to_string())
    }
}

/// Non-2xx answers count as failures even when they carry a body.
async fn send_text(builder: reqwest::RequestBuilder) -> Result<String, ApiError> {
    let response = builder
        .send()
        .await
        .map_err(|err| ApiError::Transport(err.to_string()))?;
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|err| ApiError::Transport(err.to_string()))?;
    if !status.is_success() {
        return Err(ApiError::Status {
            status: status.as_u16(),
            body: body.trim().to_string(),
        });
    }
    Ok(body)
}

pub async fn read_local_file(path: &Path) -> Result<String, String> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|err| err.to_string())
}

/// Runs until the app stops listening.
pub async fn telemetry_loop(
    backend: Arc<Backend>,
    events: mpsc::Sender<AppEvent>,
    mut commands: mpsc::Receiver<LinkCommand>,
) {
    while let Some(command) = commands.recv().await {
        match command {
            LinkCommand::Connect => {
                if !push_session(&backend, &events, &mut commands).await {
                    return;
                }
            }
            LinkCommand::ReconnectAfter(delay) => {
                debug!("push_reconnect_in_ms: {}", delay.as_millis());
                tokio::time::sleep(delay).await;
                if !push_session(&backend, &events, &mut commands).await {
                    return;
                }
            }
            LinkCommand::StartPolling(interval) => {
                poll_loop(backend, events, interval).await;
                return;
            }
            LinkCommand::None | LinkCommand::Close => {}
        }
    }
}

async fn emit(events: &mpsc::Sender<AppEvent>, event: LinkEvent) -> bool {
    events.send(AppEvent::Link(event)).await.is_ok()
}

/// One push connection from open to close. Returns false once the app is gone.
async fn push_session(
    backend: &Backend,
    events: &mpsc::Sender<AppEvent>,
    commands: &mut mpsc::Receiver<LinkCommand>,
) -> bool {
    let url = backend.endpoints().push_url();
    let mut ws = match connect_async(url.as_str()).await {
        Ok((ws, _)) => ws,
        Err(err) => {
            warn!("push_connect_error: {err}");
            return emit(events, LinkEvent::PushUnavailable(err.to_string())).await;
        }
    };
    info!("push_connected");
    if !emit(events, LinkEvent::PushOpened).await {
        return false;
    }

    let mut failed = false;
    loop {
        tokio::select! {
            frame = ws.next(), if !failed => match frame {
                Some(Ok(Message::Text(text))) => {
                    if !emit(events, LinkEvent::Frame(text)).await {
                        return false;
                    }
                }
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(err)) => {
                    warn!("push_read_error: {err}");
                    failed = true;
                    if !emit(events, LinkEvent::PushFailed(err.to_string())).await {
                        return false;
                    }
                }
            },
            command = commands.recv() => match command {
                Some(LinkCommand::Close) => {
                    let _ = ws.close(None).await;
                    break;
                }
                Some(other) => debug!("push_command_ignored: {other:?}"),
                None => return false,
            },
        }
    }
    info!("push_closed");
    emit(events, LinkEvent::PushClosed).await
}

/// Fixed-interval polling. A tick never waits for the previous request.
async fn poll_loop(backend: Arc<Backend>, events: mpsc::Sender<AppEvent>, interval: Duration) {
    info!("poll_started: every {}ms", interval.as_millis());
    let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        if events.is_closed() {
            return;
        }
        let backend = backend.clone();
        let events = events.clone();
        tokio::spawn(async move {
            let event = match backend.fetch_metrics().await {
                Ok(snapshot) => LinkEvent::PollSucceeded(snapshot),
                Err(err) => {
                    warn!("poll_failed: {err}");
                    LinkEvent::PollFailed(err.to_string())
                }
            };
            let _ = events.send(AppEvent::Link(event)).await;
        });
    }
}
