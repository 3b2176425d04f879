//! Interval and displacement thinning of raw fixes.

use crate::coord::haversine_distance;
use crate::model::Fix;

use super::PositionStreamConfig;

/// Decides which raw fixes are forwarded.
///
/// The first fix is always accepted. Later fixes are accepted only when both
/// the time since and the distance from the last accepted fix reach their
/// thresholds. Fixes stamped earlier than the last accepted one are dropped.
#[derive(Debug, Clone)]
pub struct FixFilter {
    config: PositionStreamConfig,
    last: Option<Fix>,
}

impl FixFilter {
    pub fn new(config: PositionStreamConfig) -> Self {
        Self { config, last: None }
    }

    /// Returns true if `fix` should be forwarded, remembering it if so.
    pub fn accept(&mut self, fix: &Fix) -> bool {
        let Some(last) = self.last else {
            self.last = Some(*fix);
            return true;
        };

        let elapsed = match (fix.timestamp - last.timestamp).to_std() {
            Ok(elapsed) => elapsed,
            Err(_) => return false,
        };
        if elapsed < self.config.min_interval {
            return false;
        }
        if haversine_distance(&last.coordinate, &fix.coordinate) < self.config.min_displacement_m {
            return false;
        }

        self.last = Some(*fix);
        true
    }
}
