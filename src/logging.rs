use std::fs;

use anyhow::{anyhow, Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;

/// Route `tracing` output to the log file in the data directory. The terminal
/// belongs to the TUI, so nothing is written to stdout or stderr.
///
/// Keep the returned guard alive until exit so buffered lines are flushed.
pub fn init_logging(config: &AppConfig) -> Result<WorkerGuard> {
    let dir = config.data_dir()?;
    fs::create_dir_all(&dir).context("failed to create log directory")?;

    let appender = tracing_appender::rolling::never(&dir, &config.log_file);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("library_catalogue={}", config.log_level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .map_err(|err| anyhow!("failed to install log subscriber: {err}"))?;

    Ok(guard)
}
