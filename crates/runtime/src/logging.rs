//! Tracing subscriber setup.

use std::fs;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::LogConfig;
use crate::error::{Result, RuntimeError};

/// Installs the global subscriber.
///
/// Logs go to the configured file through a non-blocking writer, or to
/// stderr. Keep the returned guard alive for as long as the host runs, or
/// buffered lines are lost on shutdown.
///
/// # Errors
///
/// Fails if the filter does not parse, the log directory cannot be created,
/// or a subscriber is already installed.
pub fn init(config: &LogConfig) -> Result<Option<WorkerGuard>> {
    let env_filter = EnvFilter::try_new(&config.filter)
        .map_err(|e| RuntimeError::Logging(format!("invalid filter {:?}: {e}", config.filter)))?;

    let Some(path) = &config.file else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init()
            .map_err(|e| RuntimeError::Logging(e.to_string()))?;
        return Ok(None);
    };

    let dir = path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| std::path::Path::new("."));
    let file_name = path
        .file_name()
        .ok_or_else(|| RuntimeError::Logging(format!("{} is not a file", path.display())))?;
    fs::create_dir_all(dir).map_err(|e| RuntimeError::Logging(e.to_string()))?;

    let file_appender = tracing_appender::rolling::never(dir, file_name);
    let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .try_init()
        .map_err(|e| RuntimeError::Logging(e.to_string()))?;

    tracing::info!(log_file = %path.display(), "logging initialized");
    Ok(Some(guard))
}
