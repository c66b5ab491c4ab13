//! Command-line interface for the `sse-replay` binary

use crate::config::SettingsOverrides;
use crate::domain::{Interval, LogLevel};
use clap::Parser;
use std::path::PathBuf;

/// A configurable SSE server for E2E testing
#[derive(Parser, Debug)]
#[command(name = "sse-replay")]
#[command(about = "Replays a JSON array of events as Server-Sent Events at a fixed pace")]
#[command(version)]
pub struct Cli {
    /// Path to the input JSON file (required unless set in config or environment)
    #[arg(short, long)]
    pub file: Option<String>,

    /// Port to listen on [default: 8080]
    #[arg(short, long)]
    pub port: Option<u16>,

    /// URL path to serve the stream on [default: /sse]
    #[arg(short, long)]
    pub endpoint: Option<String>,

    /// Time to wait between sending events, e.g. 100ms or 1s [default: 100ms]
    #[arg(short, long, value_parser = parse_interval)]
    pub interval: Option<Interval>,

    /// Address to bind [default: 0.0.0.0]
    #[arg(long)]
    pub host: Option<String>,

    /// Additional configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Run without the interactive display; status lines go to stdout
    #[arg(long)]
    pub headless: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "SSE_REPLAY_LOG", default_value = "info")]
    pub log_level: LogLevel,
}

fn parse_interval(raw: &str) -> Result<Interval, String> {
    raw.parse().map_err(|e: crate::domain::IntervalParseError| e.to_string())
}

impl Cli {
    pub fn overrides(&self) -> SettingsOverrides {
        SettingsOverrides {
            config_file: self.config.clone(),
            source_path: self.file.clone(),
            host: self.host.clone(),
            port: self.port,
            stream_path: self.endpoint.clone(),
            interval: self.interval.map(|interval| interval.to_string()),
            status_capacity: None,
        }
    }
}
