//! geo-cli tray indicator entry point.

mod actions;
mod app;
mod config;
mod menu;
mod settings;
mod tasks;

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;

/// System tray companion for geo-cli.
#[derive(Debug, Parser)]
#[command(name = "geo-indicator", version, about)]
struct Cli {
    /// Indicator settings file (defaults to ~/.config/geo-indicator/indicator.toml).
    #[arg(long, value_name = "PATH")]
    settings: Option<PathBuf>,

    /// Run without a tray icon; menu and notifications go to the log.
    #[arg(long)]
    no_tray: bool,

    /// Log filter, e.g. `debug` or `geo_indicator=trace`. Overrides RUST_LOG.
    #[arg(long, value_name = "FILTER")]
    log_level: Option<String>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize structured logging.
    let filter = match &cli.log_level {
        Some(level) => EnvFilter::try_new(level)?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "starting geo-cli indicator");

    // Load configuration.
    let config = match &cli.settings {
        Some(path) => config::Config::load_from(path)?,
        None => config::Config::load()?,
    };
    tracing::info!(geo_cli_dir = %config.geo_cli_dir.display(), "configuration loaded");

    // Build and run the tokio runtime.
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(run_with_restart(config, !cli.no_tray))?;

    tracing::info!("indicator shut down cleanly");
    Ok(())
}

/// Runs the indicator, restarting it after failures up to
/// `restart_attempts` times.
async fn run_with_restart(config: config::Config, use_tray: bool) -> anyhow::Result<()> {
    let attempts = config.restart_attempts.max(1);
    let mut attempt = 1;
    loop {
        match app::run(config.clone(), use_tray).await {
            Ok(()) => return Ok(()),
            Err(e) if attempt < attempts => {
                let delay = restart_delay(attempt);
                tracing::error!(
                    attempt,
                    "indicator failed: {e:#}; restarting in {}s",
                    delay.as_secs()
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => {
                tracing::error!(attempt, "indicator failed, giving up");
                return Err(e);
            }
        }
    }
}

fn restart_delay(attempt: u32) -> Duration {
    Duration::from_secs(2 * u64::from(attempt))
}
