//! CLI error type.

use std::path::PathBuf;

use fogmap::app::AppError;
use fogmap::config::ConfigError;
use fogmap::logging::LoggingError;
use fogmap::store::StoreError;
use fogmap::FogError;
use thiserror::Error;

/// Everything a command can fail with.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("{0}")]
    Config(String),

    #[error(transparent)]
    App(#[from] AppError),

    #[error(transparent)]
    Exploration(#[from] FogError),

    #[error("Explored point database error: {0}")]
    Store(#[from] StoreError),

    #[error("Failed to initialize logging: {0}")]
    Logging(#[from] LoggingError),

    #[error("Failed to read track file {path}: {source}")]
    TrackRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path}:{line}: {reason}")]
    TrackParse {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("Failed to create async runtime: {0}")]
    Runtime(#[source] std::io::Error),
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        CliError::Config(e.to_string())
    }
}
