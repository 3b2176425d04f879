//! The exploration tracker.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::stats::{TrackerMetrics, TrackerStats};
use super::{Classification, TrackerConfig};
use crate::coord::{nearest_distance, Coordinate};
use crate::error::{FogError, FogResult};
use crate::model::{ExploredPoint, NewPoint, Snapshot};
use crate::render::Renderer;
use crate::store::ExploredStore;

#[derive(Debug)]
struct TrackerState {
    explored: Vec<ExploredPoint>,
    current: Option<Coordinate>,
    /// Next snapshot with a position should ask the view to re-center.
    recenter_pending: bool,
}

impl TrackerState {
    fn snapshot(&self) -> Snapshot {
        Snapshot {
            current: self.current,
            explored: self.explored.clone(),
            recenter: self.recenter_pending && self.current.is_some(),
        }
    }
}

/// Owns the explored set, the deduplication test and the persistence boundary.
///
/// Every operation takes the state lock for its whole duration, including the
/// store round-trip, so overlapping calls run one after another. In-memory
/// state only changes after the store confirms.
pub struct ExplorationTracker {
    store: Arc<dyn ExploredStore>,
    renderer: Arc<dyn Renderer>,
    config: TrackerConfig,
    state: Mutex<TrackerState>,
    metrics: TrackerMetrics,
}

impl ExplorationTracker {
    /// Create a tracker with an empty explored set.
    ///
    /// Call [`load`](Self::load) to pull in previously persisted points.
    pub fn new(
        store: Arc<dyn ExploredStore>,
        renderer: Arc<dyn Renderer>,
        config: TrackerConfig,
    ) -> Self {
        Self {
            store,
            renderer,
            config,
            state: Mutex::new(TrackerState {
                explored: Vec::new(),
                current: None,
                recenter_pending: true,
            }),
            metrics: TrackerMetrics::default(),
        }
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Initial bulk load from the store.
    ///
    /// On failure the explored set is left as it was (empty on a fresh
    /// tracker) and the error is returned so the caller can notify. Tracking
    /// can proceed regardless.
    pub async fn load(&self) -> FogResult<usize> {
        let mut state = self.state.lock().await;
        match self.store.load_all().await {
            Ok(points) => {
                let count = points.len();
                state.explored = points;
                info!(count, store = self.store.name(), "Loaded explored points");
                self.publish(&mut state);
                Ok(count)
            }
            Err(e) => {
                self.metrics.read_failed();
                warn!(
                    error = %e,
                    kept = state.explored.len(),
                    "Load failed, keeping explored points"
                );
                Err(FogError::PersistenceReadFailed(e))
            }
        }
    }

    /// Classify and record a position fix.
    ///
    /// The last-known position is updated whatever the outcome. A NEW fix is
    /// appended to the explored set only once the store has confirmed it.
    ///
    /// # Errors
    ///
    /// [`FogError::PersistenceWriteFailed`] if the insert did not commit; the
    /// explored set is unchanged.
    pub async fn on_fix(&self, coordinate: Coordinate) -> FogResult<Classification> {
        let mut state = self.state.lock().await;
        self.metrics.fix_processed();

        let position_changed = state.current != Some(coordinate);
        state.current = Some(coordinate);

        let nearest = nearest_distance(&coordinate, state.explored.iter().map(|p| &p.coordinate));
        if let Some(nearest_m) = nearest {
            if nearest_m < self.config.revisit_threshold_m {
                self.metrics.revisit();
                debug!(%coordinate, nearest_m, "Revisited");
                if position_changed {
                    self.publish(&mut state);
                }
                return Ok(Classification::Revisited { nearest_m });
            }
        }

        match self.store.insert(NewPoint::new(coordinate, Utc::now())).await {
            Ok(point) => {
                self.metrics.new_point();
                debug!(
                    id = point.id,
                    %coordinate,
                    nearest_m = ?nearest,
                    "New explored point"
                );
                state.explored.push(point);
                self.publish(&mut state);
                Ok(Classification::New(point))
            }
            Err(e) => {
                self.metrics.write_failed();
                warn!(%coordinate, error = %e, "Failed to persist explored point");
                if position_changed {
                    self.publish(&mut state);
                }
                Err(FogError::PersistenceWriteFailed(e))
            }
        }
    }

    /// Delete every explored point from the store, then from memory.
    ///
    /// Delete-all is sent to the store even if the set is already empty. If
    /// it fails, the in-memory set is kept.
    pub async fn reset(&self) -> FogResult<u64> {
        let mut state = self.state.lock().await;
        match self.store.delete_all().await {
            Ok(removed) => {
                let had_points = !state.explored.is_empty();
                state.explored.clear();
                info!(removed, "Explored points reset");
                if had_points {
                    self.publish(&mut state);
                }
                Ok(removed)
            }
            Err(e) => {
                self.metrics.write_failed();
                warn!(error = %e, "Reset failed, keeping explored points");
                Err(FogError::PersistenceWriteFailed(e))
            }
        }
    }

    /// Replace the in-memory set with the store's contents, in store order.
    ///
    /// On failure the in-memory set is kept.
    pub async fn reload(&self) -> FogResult<usize> {
        let mut state = self.state.lock().await;
        match self.store.load_all().await {
            Ok(points) => {
                let count = points.len();
                if points != state.explored {
                    info!(
                        before = state.explored.len(),
                        after = count,
                        "Reload corrected explored set"
                    );
                    state.explored = points;
                    self.publish(&mut state);
                }
                Ok(count)
            }
            Err(e) => {
                self.metrics.read_failed();
                warn!(error = %e, "Reload failed, keeping explored points");
                Err(FogError::PersistenceReadFailed(e))
            }
        }
    }

    /// Ask the view to re-center on the current position.
    ///
    /// Pushes immediately when a position is known, otherwise on the first fix.
    pub async fn request_recenter(&self) {
        let mut state = self.state.lock().await;
        state.recenter_pending = true;
        if state.current.is_some() {
            self.publish(&mut state);
        }
    }

    /// Current state as a renderer would see it.
    pub async fn snapshot(&self) -> Snapshot {
        self.state.lock().await.snapshot()
    }

    /// Copy of the explored set.
    pub async fn explored(&self) -> Vec<ExploredPoint> {
        self.state.lock().await.explored.clone()
    }

    /// Last known position.
    pub async fn current(&self) -> Option<Coordinate> {
        self.state.lock().await.current
    }

    /// Counter snapshot.
    pub fn stats(&self) -> TrackerStats {
        self.metrics.snapshot()
    }

    /// Push the current state to the renderer.
    ///
    /// A pending re-center is consumed once it has gone out with a position.
    fn publish(&self, state: &mut TrackerState) {
        let snapshot = state.snapshot();
        if snapshot.recenter {
            state.recenter_pending = false;
        }
        if let Err(e) = self.renderer.push(&snapshot) {
            warn!(renderer = self.renderer.name(), error = %e, "Renderer rejected snapshot");
        }
    }
}

impl std::fmt::Debug for ExplorationTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExplorationTracker")
            .field("store", &self.store.name())
            .field("renderer", &self.renderer.name())
            .field("config", &self.config)
            .finish()
    }
}
