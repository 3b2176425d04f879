//! The INI-backed configuration file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use ini::Ini;
use tracing::debug;

use super::{ConfigError, ConfigKey};
use crate::position::{PositionStreamConfig, DEFAULT_MIN_DISPLACEMENT_M, DEFAULT_MIN_INTERVAL};
use crate::render::{OverlayConfig, RenderMode, DEFAULT_REVEAL_RADIUS_M};
use crate::tracker::{TrackerConfig, DEFAULT_REVISIT_THRESHOLD_M};

const APP_DIR: &str = "fogmap";
const CONFIG_FILE_NAME: &str = "config.ini";
const DATABASE_FILE_NAME: &str = "explored.db";

/// Path of the user's config file.
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    dirs::config_dir()
        .map(|dir| dir.join(APP_DIR).join(CONFIG_FILE_NAME))
        .ok_or(ConfigError::NoConfigDir)
}

/// Default database location under the platform data directory.
pub fn default_database_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
        .join(DATABASE_FILE_NAME)
}

/// Default log directory under the platform cache directory.
pub fn default_log_directory() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
        .join("logs")
}

/// `[tracking]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackingSettings {
    pub min_interval_ms: u64,
    pub min_displacement_m: f64,
    pub revisit_threshold_m: f64,
}

impl Default for TrackingSettings {
    fn default() -> Self {
        Self {
            min_interval_ms: DEFAULT_MIN_INTERVAL.as_millis() as u64,
            min_displacement_m: DEFAULT_MIN_DISPLACEMENT_M,
            revisit_threshold_m: DEFAULT_REVISIT_THRESHOLD_M,
        }
    }
}

/// `[storage]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct StorageSettings {
    pub database: PathBuf,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            database: default_database_path(),
        }
    }
}

/// `[render]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderSettings {
    pub mode: RenderMode,
    pub reveal_radius_m: f64,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            mode: RenderMode::default(),
            reveal_radius_m: DEFAULT_REVEAL_RADIUS_M,
        }
    }
}

/// `[logging]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingSettings {
    /// `EnvFilter` directive, e.g. `info` or `fogmap=debug`.
    pub level: String,
    pub directory: PathBuf,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: default_log_directory(),
        }
    }
}

/// All user settings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigFile {
    pub tracking: TrackingSettings,
    pub storage: StorageSettings,
    pub render: RenderSettings,
    pub logging: LoggingSettings,
}

impl ConfigFile {
    /// Load from the default location; a missing file yields defaults.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&config_file_path()?)
    }

    /// Load from an explicit path; a missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let ini = Ini::load_from_file(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let mut config = Self::default();
        for key in ConfigKey::all() {
            let value = ini
                .section(Some(key.section()))
                .and_then(|props| props.get(key.key_name()));
            if let Some(value) = value {
                key.set(&mut config, value)?;
            }
        }
        Ok(config)
    }

    /// Save to the default location.
    pub fn save(&self) -> Result<PathBuf, ConfigError> {
        let path = config_file_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    /// Save to an explicit path, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let write_err = |source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }

        let mut ini = Ini::new();
        for key in ConfigKey::all() {
            ini.with_section(Some(key.section()))
                .set(key.key_name(), key.get(self));
        }
        ini.write_to_file(path).map_err(write_err)
    }

    /// Thresholds for the position stream adapter.
    pub fn position_config(&self) -> PositionStreamConfig {
        PositionStreamConfig::default()
            .with_min_interval(Duration::from_millis(self.tracking.min_interval_ms))
            .with_min_displacement(self.tracking.min_displacement_m)
    }

    /// Deduplication settings for the tracker.
    pub fn tracker_config(&self) -> TrackerConfig {
        TrackerConfig::default().with_revisit_threshold(self.tracking.revisit_threshold_m)
    }

    /// Geometry settings for the overlay renderer.
    pub fn overlay_config(&self) -> OverlayConfig {
        OverlayConfig::default().with_reveal_radius(self.render.reveal_radius_m)
    }
}
