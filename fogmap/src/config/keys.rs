//! Addressable configuration keys (`section.key`).

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use super::{ConfigError, ConfigFile};
use crate::render::RenderMode;

/// Every setting that can be read or written by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    TrackingMinIntervalMs,
    TrackingMinDisplacementM,
    TrackingRevisitThresholdM,
    StorageDatabase,
    RenderMode,
    RenderRevealRadiusM,
    LoggingLevel,
    LoggingDirectory,
}

impl ConfigKey {
    /// All keys in file order.
    pub fn all() -> &'static [ConfigKey] {
        &[
            ConfigKey::TrackingMinIntervalMs,
            ConfigKey::TrackingMinDisplacementM,
            ConfigKey::TrackingRevisitThresholdM,
            ConfigKey::StorageDatabase,
            ConfigKey::RenderMode,
            ConfigKey::RenderRevealRadiusM,
            ConfigKey::LoggingLevel,
            ConfigKey::LoggingDirectory,
        ]
    }

    /// INI section name.
    pub fn section(&self) -> &'static str {
        match self {
            ConfigKey::TrackingMinIntervalMs
            | ConfigKey::TrackingMinDisplacementM
            | ConfigKey::TrackingRevisitThresholdM => "tracking",
            ConfigKey::StorageDatabase => "storage",
            ConfigKey::RenderMode | ConfigKey::RenderRevealRadiusM => "render",
            ConfigKey::LoggingLevel | ConfigKey::LoggingDirectory => "logging",
        }
    }

    /// Key name within its section.
    pub fn key_name(&self) -> &'static str {
        match self {
            ConfigKey::TrackingMinIntervalMs => "min_interval_ms",
            ConfigKey::TrackingMinDisplacementM => "min_displacement_m",
            ConfigKey::TrackingRevisitThresholdM => "revisit_threshold_m",
            ConfigKey::StorageDatabase => "database",
            ConfigKey::RenderMode => "mode",
            ConfigKey::RenderRevealRadiusM => "reveal_radius_m",
            ConfigKey::LoggingLevel => "level",
            ConfigKey::LoggingDirectory => "directory",
        }
    }

    /// Full `section.key` name.
    pub fn name(&self) -> String {
        format!("{}.{}", self.section(), self.key_name())
    }

    /// Current value rendered as a string.
    pub fn get(&self, config: &ConfigFile) -> String {
        match self {
            ConfigKey::TrackingMinIntervalMs => config.tracking.min_interval_ms.to_string(),
            ConfigKey::TrackingMinDisplacementM => config.tracking.min_displacement_m.to_string(),
            ConfigKey::TrackingRevisitThresholdM => {
                config.tracking.revisit_threshold_m.to_string()
            }
            ConfigKey::StorageDatabase => config.storage.database.display().to_string(),
            ConfigKey::RenderMode => config.render.mode.to_string(),
            ConfigKey::RenderRevealRadiusM => config.render.reveal_radius_m.to_string(),
            ConfigKey::LoggingLevel => config.logging.level.clone(),
            ConfigKey::LoggingDirectory => config.logging.directory.display().to_string(),
        }
    }

    /// Parse and store a value.
    pub fn set(&self, config: &mut ConfigFile, value: &str) -> Result<(), ConfigError> {
        let value = value.trim();
        match self {
            ConfigKey::TrackingMinIntervalMs => {
                config.tracking.min_interval_ms = value
                    .parse()
                    .map_err(|e: std::num::ParseIntError| self.invalid(value, e.to_string()))?;
            }
            ConfigKey::TrackingMinDisplacementM => {
                config.tracking.min_displacement_m = self.parse_meters(value, true)?;
            }
            ConfigKey::TrackingRevisitThresholdM => {
                config.tracking.revisit_threshold_m = self.parse_meters(value, false)?;
            }
            ConfigKey::StorageDatabase => {
                config.storage.database = self.parse_path(value)?;
            }
            ConfigKey::RenderMode => {
                config.render.mode = value
                    .parse::<RenderMode>()
                    .map_err(|reason| self.invalid(value, reason))?;
            }
            ConfigKey::RenderRevealRadiusM => {
                config.render.reveal_radius_m = self.parse_meters(value, false)?;
            }
            ConfigKey::LoggingLevel => {
                if value.is_empty() {
                    return Err(self.invalid(value, "must not be empty".to_string()));
                }
                config.logging.level = value.to_string();
            }
            ConfigKey::LoggingDirectory => {
                config.logging.directory = self.parse_path(value)?;
            }
        }
        Ok(())
    }

    fn invalid(&self, value: &str, reason: String) -> ConfigError {
        ConfigError::InvalidValue {
            key: self.name(),
            value: value.to_string(),
            reason,
        }
    }

    fn parse_meters(&self, value: &str, allow_zero: bool) -> Result<f64, ConfigError> {
        let meters: f64 = value
            .parse()
            .map_err(|e: std::num::ParseFloatError| self.invalid(value, e.to_string()))?;
        if !meters.is_finite() || meters < 0.0 || (!allow_zero && meters == 0.0) {
            let bound = if allow_zero { "zero or more" } else { "greater than zero" };
            return Err(self.invalid(value, format!("must be {} meters", bound)));
        }
        Ok(meters)
    }

    fn parse_path(&self, value: &str) -> Result<PathBuf, ConfigError> {
        if value.is_empty() {
            return Err(self.invalid(value, "path must not be empty".to_string()));
        }
        Ok(PathBuf::from(value))
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.section(), self.key_name())
    }
}

impl FromStr for ConfigKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        ConfigKey::all()
            .iter()
            .copied()
            .find(|key| key.name() == wanted)
            .ok_or_else(|| ConfigError::UnknownKey(s.to_string()))
    }
}
