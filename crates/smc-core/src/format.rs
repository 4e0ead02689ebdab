use chrono::{Local, TimeZone};
use std::fmt::Display;

const STEP: f64 = 1024.0;
const BYTE_UNITS: [&str; 5] = ["KB", "MB", "GB", "TB", "PB"];
const RATE_UNITS: [&str; 4] = ["KB/s", "MB/s", "GB/s", "TB/s"];
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Whole bytes below 1 KiB, otherwise one decimal in the largest unit that
/// keeps the displayed value under 1024.
pub fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let (value, unit) = scale(bytes as f64, &BYTE_UNITS);
    format!("{value:.1} {unit}")
}

pub fn format_rate(bytes_per_sec: f64) -> String {
    let rate = if bytes_per_sec.is_finite() {
        bytes_per_sec.max(0.0)
    } else {
        0.0
    };
    if rate.round() < STEP {
        return format!("{rate:.0} B/s");
    }
    let (value, unit) = scale(rate, &RATE_UNITS);
    format!("{value:.1} {unit}")
}

/// Local date/time for an epoch-millis value; "-" when out of range.
pub fn format_timestamp(epoch_ms: i64) -> String {
    format_timestamp_in(&Local, epoch_ms)
}

pub fn format_timestamp_in<Tz>(tz: &Tz, epoch_ms: i64) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    match tz.timestamp_millis_opt(epoch_ms).single() {
        Some(at) => at.format(TIMESTAMP_FORMAT).to_string(),
        None => "-".to_string(),
    }
}

/// Percentage of `part` in `whole`, clamped to [0, 100]. Zero capacity
/// reads as an empty gauge.
pub fn percent_of(part: f64, whole: f64) -> f64 {
    if whole <= 0.0 {
        return 0.0;
    }
    clamp_percent(part / whole * 100.0)
}

pub fn clamp_percent(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 100.0)
}

fn scale(raw: f64, units: &[&'static str]) -> (f64, &'static str) {
    let mut value = raw / STEP;
    let mut index = 0;
    // Promote on the rounded value so "1024.0 KB" is never displayed.
    while shown_at_one_decimal(value) >= STEP && index + 1 < units.len() {
        value /= STEP;
        index += 1;
    }
    (value, units[index])
}

fn shown_at_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
