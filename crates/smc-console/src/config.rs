use clap::Parser;
use smc_core::{ConfigError, Endpoints, LinkTiming};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_URL: &str = "http://127.0.0.1:8080/";

#[derive(Parser, Debug, Clone)]
#[command(name = "smc", about = "Terminal console for a single monitored host")]
pub struct Args {
    /// Console URL of the backend; a `token` query parameter is picked up.
    #[arg(long, env = "SMC_URL", default_value = DEFAULT_URL)]
    pub url: String,
    /// Access token, overrides any token in the URL.
    #[arg(long, env = "SMC_TOKEN")]
    pub token: Option<String>,
    #[arg(long, env = "SMC_RECONNECT_MS", default_value_t = 1000)]
    pub reconnect_ms: u64,
    #[arg(long, env = "SMC_POLL_MS", default_value_t = 1000)]
    pub poll_ms: u64,
    #[arg(long, env = "SMC_LOG_DIR")]
    pub log_dir: Option<PathBuf>,
    /// Check the health endpoint and exit.
    #[arg(long)]
    pub check: bool,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub endpoints: Endpoints,
    pub timing: LinkTiming,
    pub log_dir: Option<PathBuf>,
    pub log_stdout: bool,
    pub log_level: String,
    pub check: bool,
}

pub fn load_config(args: Args) -> Result<Config, ConfigError> {
    let token = args
        .token
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty());
    let endpoints = Endpoints::from_console_url(&args.url, token)?;
    let defaults = LinkTiming::default();
    Ok(Config {
        endpoints,
        timing: LinkTiming {
            reconnect_delay: resolve_millis(args.reconnect_ms, defaults.reconnect_delay),
            poll_interval: resolve_millis(args.poll_ms, defaults.poll_interval),
        },
        log_dir: args.log_dir.filter(|dir| !dir.as_os_str().is_empty()),
        log_stdout: resolve_log_stdout(),
        log_level: resolve_log_level(),
        check: args.check,
    })
}

fn resolve_millis(value: u64, fallback: Duration) -> Duration {
    if value == 0 {
        fallback
    } else {
        Duration::from_millis(value)
    }
}

fn parse_bool_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn resolve_log_stdout() -> bool {
    std::env::var("SMC_LOG_STDOUT")
        .ok()
        .and_then(|value| parse_bool_flag(&value))
        .unwrap_or(false)
}

fn resolve_log_level() -> String {
    match std::env::var("SMC_LOG_LEVEL") {
        Ok(value) if !value.trim().is_empty() => value.trim().to_string(),
        _ => "info".to_string(),
    }
}
