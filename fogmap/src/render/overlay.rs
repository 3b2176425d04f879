//! Native vector overlay renderer.
//!
//! Builds the fog as one polygon covering the mapped world with a circular
//! hole punched around every explored point. The host UI reads the latest
//! [`FogOverlay`] and draws it on top of its map.

use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use tracing::trace;

use super::{RenderError, Renderer};
use crate::coord::{destination_point, Coordinate};
use crate::model::Snapshot;

/// Latitude limit of Web Mercator maps; the fog ring stops here.
pub const WORLD_MAX_LAT: f64 = 85.051_128_78;

/// Default radius revealed around each explored point, in meters.
pub const DEFAULT_REVEAL_RADIUS_M: f64 = 30.0;

/// Default number of vertices per reveal circle.
pub const DEFAULT_CIRCLE_SEGMENTS: usize = 32;

/// Geometry settings for the overlay.
#[derive(Debug, Clone)]
pub struct OverlayConfig {
    /// Radius revealed around each explored point in meters.
    pub reveal_radius_m: f64,
    /// Vertices per reveal circle (minimum 3).
    pub circle_segments: usize,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            reveal_radius_m: DEFAULT_REVEAL_RADIUS_M,
            circle_segments: DEFAULT_CIRCLE_SEGMENTS,
        }
    }
}

impl OverlayConfig {
    /// Set the reveal radius.
    pub fn with_reveal_radius(mut self, meters: f64) -> Self {
        self.reveal_radius_m = meters;
        self
    }

    /// Set the circle resolution.
    pub fn with_circle_segments(mut self, segments: usize) -> Self {
        self.circle_segments = segments;
        self
    }
}

/// One frame of fog geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct FogOverlay {
    /// Closed outer ring covering the world (counter-clockwise).
    pub fog: Vec<Coordinate>,
    /// Closed rings, one per explored point, in explored-set order.
    pub holes: Vec<Vec<Coordinate>>,
    /// Position marker.
    pub marker: Option<Coordinate>,
    /// Set when the camera should move to the marker.
    pub center_on: Option<Coordinate>,
    /// Monotonic frame counter.
    pub revision: u64,
}

/// Renderer that keeps the latest fog geometry for the host UI.
#[derive(Debug, Default)]
pub struct OverlayRenderer {
    config: OverlayConfig,
    latest: RwLock<Option<FogOverlay>>,
    revision: AtomicU64,
}

impl OverlayRenderer {
    /// Create a renderer with the given geometry settings.
    pub fn new(config: OverlayConfig) -> Self {
        Self {
            config,
            latest: RwLock::new(None),
            revision: AtomicU64::new(0),
        }
    }

    /// The most recent frame, if any snapshot has been pushed.
    pub fn latest(&self) -> Option<FogOverlay> {
        self.latest.read().clone()
    }

    /// Number of frames built so far.
    pub fn frames(&self) -> u64 {
        self.revision.load(Ordering::SeqCst)
    }

    /// Build the fog geometry for a snapshot.
    pub fn build(&self, snapshot: &Snapshot, revision: u64) -> FogOverlay {
        let holes = snapshot
            .explored
            .iter()
            .map(|p| reveal_ring(&p.coordinate, &self.config))
            .collect();

        FogOverlay {
            fog: world_ring(),
            holes,
            marker: snapshot.current,
            center_on: if snapshot.recenter {
                snapshot.current
            } else {
                None
            },
            revision,
        }
    }
}

impl Renderer for OverlayRenderer {
    fn push(&self, snapshot: &Snapshot) -> Result<(), RenderError> {
        let revision = self.revision.fetch_add(1, Ordering::SeqCst) + 1;
        let overlay = self.build(snapshot, revision);
        trace!(
            revision,
            holes = overlay.holes.len(),
            "Built fog overlay frame"
        );
        *self.latest.write() = Some(overlay);
        Ok(())
    }

    fn name(&self) -> &str {
        "overlay"
    }
}

/// Outer fog ring spanning the mapped world.
fn world_ring() -> Vec<Coordinate> {
    vec![
        Coordinate::new_unchecked(-WORLD_MAX_LAT, -180.0),
        Coordinate::new_unchecked(-WORLD_MAX_LAT, 180.0),
        Coordinate::new_unchecked(WORLD_MAX_LAT, 180.0),
        Coordinate::new_unchecked(WORLD_MAX_LAT, -180.0),
        Coordinate::new_unchecked(-WORLD_MAX_LAT, -180.0),
    ]
}

/// Closed circle of `circle_segments` vertices around `center`.
fn reveal_ring(center: &Coordinate, config: &OverlayConfig) -> Vec<Coordinate> {
    let segments = config.circle_segments.max(3);
    let step = 360.0 / segments as f64;
    let mut ring: Vec<Coordinate> = (0..segments)
        .map(|i| destination_point(center, i as f64 * step, config.reveal_radius_m))
        .collect();
    ring.push(ring[0]);
    ring
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::haversine_distance;
    use crate::model::ExploredPoint;
    use chrono::Utc;

    fn point(id: i64, lat: f64, lon: f64) -> ExploredPoint {
        ExploredPoint {
            id,
            coordinate: Coordinate::new_unchecked(lat, lon),
            recorded_at: Utc::now(),
        }
    }

    #[test]
    fn test_no_frame_before_first_push() {
        let renderer = OverlayRenderer::default();
        assert!(renderer.latest().is_none());
        assert_eq!(renderer.frames(), 0);
    }

    #[test]
    fn test_one_hole_per_explored_point() {
        let renderer = OverlayRenderer::new(OverlayConfig::default());
        let snapshot = Snapshot {
            current: Some(Coordinate::new_unchecked(22.3149, 87.3105)),
            explored: vec![point(1, 22.3149, 87.3105), point(2, 22.3200, 87.3105)],
            recenter: false,
        };
        renderer.push(&snapshot).unwrap();

        let frame = renderer.latest().unwrap();
        assert_eq!(frame.holes.len(), 2);
        assert_eq!(frame.fog.len(), 5);
        assert_eq!(frame.fog.first(), frame.fog.last());
        assert_eq!(frame.marker, snapshot.current);
        assert!(frame.center_on.is_none());
        assert_eq!(frame.revision, 1);
    }

    #[test]
    fn test_hole_vertices_lie_on_reveal_radius() {
        let config = OverlayConfig::default()
            .with_reveal_radius(50.0)
            .with_circle_segments(16);
        let renderer = OverlayRenderer::new(config);
        let center = point(1, 48.0, 11.0);
        let frame = renderer.build(
            &Snapshot {
                current: None,
                explored: vec![center],
                recenter: false,
            },
            1,
        );

        let ring = &frame.holes[0];
        assert_eq!(ring.len(), 17, "16 vertices plus closing vertex");
        assert_eq!(ring.first(), ring.last());
        for vertex in ring {
            let d = haversine_distance(&center.coordinate, vertex);
            assert!((d - 50.0).abs() < 0.01, "vertex at {} m", d);
        }
    }

    #[test]
    fn test_recenter_sets_camera_target() {
        let renderer = OverlayRenderer::default();
        let here = Coordinate::new_unchecked(1.0, 2.0);
        renderer
            .push(&Snapshot {
                current: Some(here),
                explored: Vec::new(),
                recenter: true,
            })
            .unwrap();
        assert_eq!(renderer.latest().unwrap().center_on, Some(here));
    }

    #[test]
    fn test_degenerate_segment_count_is_clamped() {
        let renderer = OverlayRenderer::new(OverlayConfig::default().with_circle_segments(0));
        let frame = renderer.build(
            &Snapshot {
                current: None,
                explored: vec![point(1, 0.0, 0.0)],
                recenter: false,
            },
            1,
        );
        assert_eq!(frame.holes[0].len(), 4);
    }

    #[test]
    fn test_revision_increments_per_push() {
        let renderer = OverlayRenderer::default();
        let snapshot = Snapshot::default();
        renderer.push(&snapshot).unwrap();
        renderer.push(&snapshot).unwrap();
        assert_eq!(renderer.frames(), 2);
        assert_eq!(renderer.latest().unwrap().revision, 2);
    }
}
