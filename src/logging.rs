//! Logging initialization for refund-desk.
//!
//! Logs go to stderr unless `logging.to_file` is set, in which case they
//! are written to `{logging.directory}/refund-desk-{datetime}.log`.

use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;

/// Keeps the log writer alive; dropping it flushes buffered lines
pub struct LoggingHandle {
    _guard: WorkerGuard,

    /// Path to the log file (only set with file logging enabled)
    pub log_file_path: Option<PathBuf>,
}

/// Build the log file name for a given start time
pub fn log_file_name(started: chrono::DateTime<chrono::Utc>) -> String {
    format!("refund-desk-{}.log", started.format("%Y%m%dT%H%M%SZ"))
}

/// Filter directive in effect: `RUST_LOG` wins, then `--debug`, then
/// `logging.level`
pub fn filter_directive(config: &Config, debug_override: bool, rust_log: Option<String>) -> String {
    match rust_log.filter(|v| !v.trim().is_empty()) {
        Some(directive) => directive,
        None if debug_override => "debug".to_string(),
        None => config.logging.level.clone(),
    }
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init_logging(config: &Config, debug_override: bool) -> Result<LoggingHandle> {
    let directive = filter_directive(config, debug_override, std::env::var("RUST_LOG").ok());
    let filter = EnvFilter::try_new(&directive)
        .with_context(|| format!("Invalid log filter '{}'", directive))?;

    let (writer, guard, log_file_path) = if config.logging.to_file {
        let logs_dir = config.logs_path();
        std::fs::create_dir_all(&logs_dir)
            .with_context(|| format!("Failed to create {}", logs_dir.display()))?;

        let log_filename = log_file_name(chrono::Utc::now());
        let file_appender = tracing_appender::rolling::never(&logs_dir, &log_filename);
        let (writer, guard) = tracing_appender::non_blocking(file_appender);
        (writer, guard, Some(logs_dir.join(log_filename)))
    } else {
        let (writer, guard) = tracing_appender::non_blocking(std::io::stderr());
        (writer, guard, None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_ansi(log_file_path.is_none())
                .with_writer(writer),
        )
        .try_init()
        .context("A global logger is already installed")?;

    match &log_file_path {
        Some(path) => tracing::info!(filter = %directive, path = %path.display(), "logging to file"),
        None => tracing::debug!(filter = %directive, "logging to stderr"),
    }

    Ok(LoggingHandle {
        _guard: guard,
        log_file_path,
    })
}
