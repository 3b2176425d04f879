//! Logging initialization.
//!
//! Installs a `tracing` subscriber with a stderr layer and, optionally, a
//! daily-rolling file layer written from a background thread. The filter
//! comes from `RUST_LOG` when set, otherwise from the configured level.

use std::path::Path;

use thiserror::Error;
use time::macros::format_description;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::time::LocalTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Base name of the rolling log file.
pub const LOG_FILE_PREFIX: &str = "fogmap.log";

/// Errors raised while setting up logging.
#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("Invalid log filter '{directive}': {reason}")]
    InvalidFilter { directive: String, reason: String },

    #[error("Failed to create log directory: {0}")]
    Io(#[from] std::io::Error),

    #[error("A global logger is already installed: {0}")]
    AlreadyInitialized(String),
}

/// Keeps the background log writer alive; flushes on drop.
#[must_use = "dropping the guard stops file logging"]
pub struct LoggingGuard {
    _file: Option<WorkerGuard>,
}

/// Build the filter, preferring `RUST_LOG` over the configured directive.
pub fn build_filter(level: &str) -> Result<EnvFilter, LoggingError> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(level).map_err(|e| LoggingError::InvalidFilter {
        directive: level.to_string(),
        reason: e.to_string(),
    })
}

/// Install the global subscriber.
///
/// # Arguments
///
/// * `level` - Filter directive used when `RUST_LOG` is unset
/// * `directory` - Where to write rolling log files, or `None` for stderr only
pub fn init_logging(level: &str, directory: Option<&Path>) -> Result<LoggingGuard, LoggingError> {
    let filter = build_filter(level)?;
    let timer = LocalTime::new(format_description!(
        "[hour]:[minute]:[second].[subsecond digits:3]"
    ));

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_timer(timer.clone())
        .with_target(false);

    let (file_layer, file_guard) = match directory {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_writer(writer)
                .with_timer(timer)
                .with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| LoggingError::AlreadyInitialized(e.to_string()))?;

    Ok(LoggingGuard { _file: file_guard })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_directive_is_rejected() {
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }
        let err = build_filter("fogmap=notalevel").unwrap_err();
        assert!(matches!(err, LoggingError::InvalidFilter { .. }));
    }

    #[test]
    fn test_valid_directive() {
        assert!(build_filter("fogmap=debug,info").is_ok());
    }
}
