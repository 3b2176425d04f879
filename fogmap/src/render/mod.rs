//! Render surfaces for the fog overlay.
//!
//! The tracker only knows the [`Renderer`] capability: push a [`Snapshot`].
//! Two interchangeable variants exist:
//!
//! ```text
//!                          ┌──► OverlayRenderer   (native vector overlay)
//! ExplorationTracker ──► Renderer
//!                          └──► WebBridgeRenderer (JSON messages to a web map)
//! ```

mod overlay;
mod web_bridge;

pub use overlay::{
    FogOverlay, OverlayConfig, OverlayRenderer, DEFAULT_CIRCLE_SEGMENTS, DEFAULT_REVEAL_RADIUS_M,
    WORLD_MAX_LAT,
};
pub use web_bridge::{BridgeMessage, BridgePoint, WebBridgeRenderer};

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::model::Snapshot;

/// Errors a renderer may report when handed a snapshot.
///
/// Render failures never undo tracker state; the tracker logs and moves on.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Failed to encode snapshot: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Web bridge receiver has been dropped")]
    BridgeClosed,
}

/// A surface that presents snapshots of the explored state.
pub trait Renderer: Send + Sync {
    /// Present a new snapshot.
    fn push(&self, snapshot: &Snapshot) -> Result<(), RenderError>;

    /// Renderer name for logging.
    fn name(&self) -> &str;
}

/// Renderer that discards every snapshot, for headless use.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullRenderer;

impl Renderer for NullRenderer {
    fn push(&self, _snapshot: &Snapshot) -> Result<(), RenderError> {
        Ok(())
    }

    fn name(&self) -> &str {
        "null"
    }
}

/// Renderer selection, as used by configuration and the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderMode {
    #[default]
    Overlay,
    Web,
}

impl RenderMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RenderMode::Overlay => "overlay",
            RenderMode::Web => "web",
        }
    }
}

impl fmt::Display for RenderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RenderMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "overlay" | "native" => Ok(RenderMode::Overlay),
            "web" | "webview" => Ok(RenderMode::Web),
            other => Err(format!(
                "unknown render mode '{}' (expected 'overlay' or 'web')",
                other
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_mode_parse() {
        assert_eq!("overlay".parse::<RenderMode>(), Ok(RenderMode::Overlay));
        assert_eq!(" Web ".parse::<RenderMode>(), Ok(RenderMode::Web));
        assert!("canvas".parse::<RenderMode>().is_err());
    }

    #[test]
    fn test_render_mode_display_roundtrip() {
        for mode in [RenderMode::Overlay, RenderMode::Web] {
            assert_eq!(mode.to_string().parse::<RenderMode>(), Ok(mode));
        }
    }
}
