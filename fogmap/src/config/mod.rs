//! Configuration file handling.
//!
//! Settings live in an INI file, by default at
//! `~/.config/fogmap/config.ini` (platform config dir). Missing files and
//! missing keys fall back to defaults.
//!
//! ```ini
//! [tracking]
//! min_interval_ms = 2000
//! min_displacement_m = 10
//! revisit_threshold_m = 30
//!
//! [storage]
//! database = /home/me/.local/share/fogmap/explored.db
//!
//! [render]
//! mode = overlay
//! reveal_radius_m = 30
//!
//! [logging]
//! level = info
//! directory = /home/me/.cache/fogmap/logs
//! ```

mod file;
mod keys;

pub use file::{
    config_file_path, default_database_path, default_log_directory, ConfigFile, LoggingSettings,
    RenderSettings, StorageSettings, TrackingSettings,
};
pub use keys::ConfigKey;

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while reading, writing or editing configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {reason}")]
    Read { path: PathBuf, reason: String },

    #[error("Failed to write config file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },

    #[error("Unknown configuration key '{0}'")]
    UnknownKey(String),

    #[error("Could not determine the platform configuration directory")]
    NoConfigDir,
}
