//! Common types and utilities shared across CLI commands.

use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use fogmap::config::ConfigFile;
use fogmap::model::from_millis;
use fogmap::render::RenderMode;
use fogmap::{Coordinate, Fix};
use tokio::runtime::Runtime;

use crate::error::CliError;

/// Renderer selection for CLI arguments.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum RendererArg {
    /// Native fog overlay (summary printed at the end)
    Overlay,
    /// Web map bridge (JSON messages printed to stdout)
    Web,
}

impl From<RendererArg> for RenderMode {
    fn from(arg: RendererArg) -> Self {
        match arg {
            RendererArg::Overlay => RenderMode::Overlay,
            RendererArg::Web => RenderMode::Web,
        }
    }
}

/// Resolve the render mode: CLI takes precedence, then config.
pub fn resolve_render_mode(cli: Option<RendererArg>, config: &ConfigFile) -> RenderMode {
    cli.map(RenderMode::from).unwrap_or(config.render.mode)
}

/// Load the user's configuration.
pub fn load_config() -> Result<ConfigFile, CliError> {
    Ok(ConfigFile::load()?)
}

/// Runtime for commands that talk to the library's async API.
pub fn runtime() -> Result<Runtime, CliError> {
    Runtime::new().map_err(CliError::Runtime)
}

/// A malformed track file line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackLineError {
    /// 1-based line number.
    pub line: usize,
    pub reason: String,
}

/// Parse a track file.
///
/// One fix per line as `lat,lon` or `lat,lon,unix_ms`. Blank lines and
/// lines starting with `#` are skipped. A fix without a timestamp is placed
/// `step` after the previous one (the first at `start`).
pub fn parse_track(
    text: &str,
    start: DateTime<Utc>,
    step: Duration,
) -> Result<Vec<Fix>, TrackLineError> {
    let step = chrono::Duration::from_std(step).unwrap_or_else(|_| chrono::Duration::zero());
    let mut fixes = Vec::new();
    let mut previous: Option<DateTime<Utc>> = None;

    for (index, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let error = |reason: String| TrackLineError {
            line: index + 1,
            reason,
        };

        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        if !(2..=3).contains(&fields.len()) {
            return Err(error(format!(
                "expected 'lat,lon' or 'lat,lon,unix_ms', got {} fields",
                fields.len()
            )));
        }

        let latitude: f64 = fields[0]
            .parse()
            .map_err(|_| error(format!("invalid latitude '{}'", fields[0])))?;
        let longitude: f64 = fields[1]
            .parse()
            .map_err(|_| error(format!("invalid longitude '{}'", fields[1])))?;
        let coordinate = Coordinate::new(latitude, longitude).map_err(|e| error(e.to_string()))?;

        let timestamp = match fields.get(2) {
            Some(ms) => from_millis(
                ms.parse()
                    .map_err(|_| error(format!("invalid timestamp '{}'", ms)))?,
            ),
            None => previous.map_or(start, |t| t + step),
        };
        previous = Some(timestamp);
        fixes.push(Fix::at(coordinate, timestamp));
    }

    Ok(fixes)
}

/// Read and parse a track file from disk.
pub fn load_track(path: &Path, step: Duration) -> Result<Vec<Fix>, CliError> {
    let text = std::fs::read_to_string(path).map_err(|source| CliError::TrackRead {
        path: path.to_path_buf(),
        source,
    })?;
    parse_track(&text, Utc::now(), step).map_err(|e| CliError::TrackParse {
        path: path.to_path_buf(),
        line: e.line,
        reason: e.reason,
    })
}
