//! Position Stream Adapter
//!
//! Wraps a continuous location-fix source behind a permission check and
//! forwards thinned-out fixes to a single consumer.
//!
//! ```text
//! FixSource ──raw fixes──► forwarder task ──filtered fixes──► FixStream
//!    ▲                      (FixFilter)                           │
//!    └───── released when the forwarder exits ◄── stop() / drop ──┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use fogmap::position::{PositionStream, PositionStreamConfig, ReplaySource, StaticPermission};
//!
//! let mut adapter = PositionStream::new(source, Arc::new(StaticPermission::granted()),
//!     PositionStreamConfig::default());
//! let mut fixes = adapter.start().await?;
//! while let Some(fix) = fixes.recv().await {
//!     tracker.on_fix(fix.coordinate).await?;
//! }
//! adapter.stop().await;
//! ```

mod filter;
mod permission;
mod source;
mod stream;

pub use filter::FixFilter;
pub use permission::{PermissionGate, StaticPermission};
pub use source::{FixSource, ReplaySource};
pub use stream::{FixStream, PositionStream};

use std::time::Duration;

use thiserror::Error;

/// Default minimum time between forwarded fixes.
pub const DEFAULT_MIN_INTERVAL: Duration = Duration::from_secs(2);

/// Default minimum displacement between forwarded fixes in meters.
pub const DEFAULT_MIN_DISPLACEMENT_M: f64 = 10.0;

/// Default capacity of the fix channel.
pub const DEFAULT_BUFFER: usize = 64;

/// Errors raised while activating the adapter.
#[derive(Debug, Error)]
pub enum PositionError {
    /// The permission capability refused access.
    #[error("Location permission denied")]
    PermissionDenied,

    /// The fix source could not open a subscription.
    #[error("Location source '{source_name}' unavailable: {reason}")]
    SourceUnavailable { source_name: String, reason: String },
}

/// Thresholds applied between successive forwarded fixes.
#[derive(Debug, Clone)]
pub struct PositionStreamConfig {
    /// Minimum time since the last forwarded fix.
    pub min_interval: Duration,
    /// Minimum great-circle distance from the last forwarded fix in meters.
    pub min_displacement_m: f64,
    /// Channel capacity between the forwarder and the consumer.
    pub buffer: usize,
}

impl Default for PositionStreamConfig {
    fn default() -> Self {
        Self {
            min_interval: DEFAULT_MIN_INTERVAL,
            min_displacement_m: DEFAULT_MIN_DISPLACEMENT_M,
            buffer: DEFAULT_BUFFER,
        }
    }
}

impl PositionStreamConfig {
    /// Set the minimum interval.
    pub fn with_min_interval(mut self, interval: Duration) -> Self {
        self.min_interval = interval;
        self
    }

    /// Set the minimum displacement.
    pub fn with_min_displacement(mut self, meters: f64) -> Self {
        self.min_displacement_m = meters;
        self
    }
}
