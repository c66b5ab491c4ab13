use anyhow::{Context, Result};
use clap::Parser;
use sse_replay::cli::Cli;
use sse_replay::infrastructure::{log_messages, run_printer, status_channel};
use sse_replay::{Application, ReplayConfig};
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// How long the printer may keep draining status lines after the server stops
const PRINTER_GRACE: Duration = Duration::from_secs(1);

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(cli.log_level.as_str())),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = ReplayConfig::load(&cli.overrides()).context("failed to load configuration")?;
    if !cli.headless {
        warn!("Interactive display is not available; printing status lines to stdout");
    }

    let (status, receiver) = status_channel(config.status_capacity);
    let printer = tokio::spawn(run_printer(receiver, tokio::io::stdout()));
    status.emit(log_messages::server::starting_headless(config.port));

    let app = Application::new(config, status.clone()).await?;
    let shutdown = app.shutdown_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received Ctrl-C");
            shutdown.shutdown();
        }
    });

    let result = app.run().await;

    drop(status);
    if tokio::time::timeout(PRINTER_GRACE, printer).await.is_err() {
        warn!("Status printer did not finish in time");
    }

    result.map_err(Into::into)
}
