//! Exploration Tracker
//!
//! Decides which position fixes are new explored territory, persists them,
//! and keeps the in-memory explored set equal to the store.
//!
//! # Deduplication
//!
//! A fix is **new** when it is at least `revisit_threshold_m` (default 30 m,
//! haversine) from every explored point, or when nothing has been explored
//! yet. Anything closer is a **revisit** and only moves the position marker.
//! The scan is linear; a single user's explored set stays small.
//!
//! # Consistency
//!
//! ```text
//! on_fix(new) ── insert ──► store ── ok ──► append in memory ──► push snapshot
//!                                  └─ err ─► unchanged, PersistenceWriteFailed
//! ```
//!
//! The same store-first rule applies to `reset` and `reload`.

mod exploration;
mod stats;

pub use exploration::ExplorationTracker;
pub use stats::TrackerStats;

use crate::model::ExploredPoint;

/// Default distance below which a fix counts as a revisit, in meters.
pub const DEFAULT_REVISIT_THRESHOLD_M: f64 = 30.0;

/// Tracker settings.
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    /// Fixes closer than this to any explored point are revisits.
    pub revisit_threshold_m: f64,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            revisit_threshold_m: DEFAULT_REVISIT_THRESHOLD_M,
        }
    }
}

impl TrackerConfig {
    pub fn with_revisit_threshold(mut self, meters: f64) -> Self {
        self.revisit_threshold_m = meters;
        self
    }
}

/// Outcome of classifying one fix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Classification {
    /// Persisted as a new explored point.
    New(ExploredPoint),
    /// Within the threshold of an existing point and discarded.
    Revisited {
        /// Distance to the closest explored point in meters.
        nearest_m: f64,
    },
}

impl Classification {
    pub fn is_new(&self) -> bool {
        matches!(self, Classification::New(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use parking_lot::Mutex;

    use crate::coord::{haversine_distance, Coordinate};
    use crate::error::FogError;
    use crate::model::{NewPoint, Snapshot};
    use crate::render::{RenderError, Renderer};
    use crate::store::{BoxFuture, ExploredStore, MemoryStore, StoreError};

    /// Renderer that records every snapshot it receives.
    #[derive(Default)]
    struct RecordingRenderer {
        frames: Mutex<Vec<Snapshot>>,
    }

    impl RecordingRenderer {
        fn frames(&self) -> Vec<Snapshot> {
            self.frames.lock().clone()
        }

        fn count(&self) -> usize {
            self.frames.lock().len()
        }
    }

    impl Renderer for RecordingRenderer {
        fn push(&self, snapshot: &Snapshot) -> Result<(), RenderError> {
            self.frames.lock().push(snapshot.clone());
            Ok(())
        }

        fn name(&self) -> &str {
            "recording"
        }
    }

    /// Renderer whose consumer has gone away.
    #[derive(Default)]
    struct RejectingRenderer {
        attempts: AtomicUsize,
    }

    impl Renderer for RejectingRenderer {
        fn push(&self, _snapshot: &Snapshot) -> Result<(), RenderError> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            Err(RenderError::BridgeClosed)
        }

        fn name(&self) -> &str {
            "rejecting"
        }
    }

    /// Store that yields before every insert so concurrent callers overlap.
    struct SlowStore {
        inner: MemoryStore,
        delay: Duration,
    }

    impl ExploredStore for SlowStore {
        fn insert(&self, point: NewPoint) -> BoxFuture<'_, Result<ExploredPoint, StoreError>> {
            Box::pin(async move {
                tokio::time::sleep(self.delay).await;
                self.inner.insert(point).await
            })
        }

        fn load_all(&self) -> BoxFuture<'_, Result<Vec<ExploredPoint>, StoreError>> {
            self.inner.load_all()
        }

        fn delete_all(&self) -> BoxFuture<'_, Result<u64, StoreError>> {
            self.inner.delete_all()
        }

        fn name(&self) -> &str {
            "slow"
        }
    }

    fn c(lat: f64, lon: f64) -> Coordinate {
        Coordinate::new_unchecked(lat, lon)
    }

    fn setup() -> (ExplorationTracker, Arc<MemoryStore>, Arc<RecordingRenderer>) {
        let store = Arc::new(MemoryStore::new());
        let renderer = Arc::new(RecordingRenderer::default());
        let tracker = ExplorationTracker::new(
            Arc::clone(&store) as Arc<dyn ExploredStore>,
            Arc::clone(&renderer) as Arc<dyn Renderer>,
            TrackerConfig::default(),
        );
        (tracker, store, renderer)
    }

    #[tokio::test]
    async fn test_first_fix_is_new() {
        let (tracker, store, _) = setup();
        let outcome = tracker.on_fix(c(22.3149, 87.3105)).await.unwrap();
        assert!(outcome.is_new());
        assert_eq!(tracker.explored().await.len(), 1);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_identical_fix_twice_stores_one_point() {
        let (tracker, store, _) = setup();
        tracker.on_fix(c(22.3149, 87.3105)).await.unwrap();
        let second = tracker.on_fix(c(22.3149, 87.3105)).await.unwrap();

        assert_eq!(second, Classification::Revisited { nearest_m: 0.0 });
        assert_eq!(tracker.explored().await.len(), 1);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_diagonal_fix_just_over_threshold_is_new() {
        let (tracker, _, _) = setup();
        let a = c(22.3149, 87.3105);
        let b = c(22.3151, 87.3107);
        // Haversine puts these ~30.30 m apart, just over the threshold
        assert!(haversine_distance(&a, &b) >= DEFAULT_REVISIT_THRESHOLD_M);

        tracker.on_fix(a).await.unwrap();
        assert!(tracker.on_fix(b).await.unwrap().is_new());
        assert_eq!(tracker.explored().await.len(), 2);
    }

    #[tokio::test]
    async fn test_fix_within_threshold_is_revisit() {
        let (tracker, _, _) = setup();
        tracker.on_fix(c(22.3149, 87.3105)).await.unwrap();
        // 0.0002° of latitude ≈ 22 m
        let outcome = tracker.on_fix(c(22.3151, 87.3105)).await.unwrap();
        match outcome {
            Classification::Revisited { nearest_m } => {
                assert!((nearest_m - 22.24).abs() < 0.1, "got {}", nearest_m)
            }
            other => panic!("expected revisit, got {:?}", other),
        }
        assert_eq!(tracker.explored().await.len(), 1);
    }

    #[tokio::test]
    async fn test_distant_fix_is_new() {
        let (tracker, store, _) = setup();
        tracker.on_fix(c(22.3149, 87.3105)).await.unwrap();
        tracker.on_fix(c(22.3200, 87.3105)).await.unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(tracker.explored().await, store.load_all().await.unwrap());
    }

    #[tokio::test]
    async fn test_custom_threshold() {
        let store: Arc<dyn ExploredStore> = Arc::new(MemoryStore::new());
        let renderer: Arc<dyn Renderer> = Arc::new(RecordingRenderer::default());
        let tracker = ExplorationTracker::new(
            store,
            renderer,
            TrackerConfig::default().with_revisit_threshold(1000.0),
        );
        tracker.on_fix(c(22.3149, 87.3105)).await.unwrap();
        let outcome = tracker.on_fix(c(22.3200, 87.3105)).await.unwrap();
        assert!(!outcome.is_new());
    }

    #[tokio::test]
    async fn test_revisit_still_moves_position() {
        let (tracker, _, renderer) = setup();
        tracker.on_fix(c(22.3149, 87.3105)).await.unwrap();
        tracker.on_fix(c(22.3150, 87.3105)).await.unwrap();

        assert_eq!(tracker.current().await, Some(c(22.3150, 87.3105)));
        let last = renderer.frames().pop().unwrap();
        assert_eq!(last.current, Some(c(22.3150, 87.3105)));
        assert_eq!(last.explored.len(), 1);
    }

    #[tokio::test]
    async fn test_unchanged_revisit_pushes_nothing() {
        let (tracker, _, renderer) = setup();
        tracker.on_fix(c(22.3149, 87.3105)).await.unwrap();
        let before = renderer.count();
        tracker.on_fix(c(22.3149, 87.3105)).await.unwrap();
        assert_eq!(renderer.count(), before);
    }

    #[tokio::test]
    async fn test_failed_insert_leaves_no_orphan() {
        let (tracker, store, _) = setup();
        tracker.on_fix(c(22.3149, 87.3105)).await.unwrap();

        store.set_fail_writes(true);
        let err = tracker.on_fix(c(22.3200, 87.3105)).await.unwrap_err();
        assert!(matches!(err, FogError::PersistenceWriteFailed(_)));

        assert_eq!(tracker.explored().await.len(), 1);
        assert_eq!(store.len(), 1);
        // Position still follows the user
        assert_eq!(tracker.current().await, Some(c(22.3200, 87.3105)));
        assert_eq!(tracker.stats().write_failures, 1);

        // The same spot is classified new again once writes recover
        store.set_fail_writes(false);
        assert!(tracker.on_fix(c(22.3200, 87.3105)).await.unwrap().is_new());
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn test_reset_clears_both_sides() {
        let (tracker, store, _) = setup();
        tracker.on_fix(c(22.3149, 87.3105)).await.unwrap();
        tracker.on_fix(c(22.3200, 87.3105)).await.unwrap();

        assert_eq!(tracker.reset().await.unwrap(), 2);
        assert!(tracker.explored().await.is_empty());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_reset_twice_is_idempotent() {
        let (tracker, store, _) = setup();
        tracker.on_fix(c(22.3149, 87.3105)).await.unwrap();

        tracker.reset().await.unwrap();
        assert!(tracker.explored().await.is_empty());
        assert_eq!(tracker.reset().await.unwrap(), 0);
        assert!(tracker.explored().await.is_empty());
        assert_eq!(store.delete_all_calls(), 2);
    }

    #[tokio::test]
    async fn test_reset_on_empty_still_deletes() {
        let (tracker, store, _) = setup();
        assert_eq!(tracker.reset().await.unwrap(), 0);
        assert!(tracker.explored().await.is_empty());
        assert_eq!(store.delete_all_calls(), 1);
    }

    #[tokio::test]
    async fn test_failed_reset_keeps_points() {
        let (tracker, store, _) = setup();
        tracker.on_fix(c(22.3149, 87.3105)).await.unwrap();
        store.set_fail_writes(true);

        let err = tracker.reset().await.unwrap_err();
        assert!(matches!(err, FogError::PersistenceWriteFailed(_)));
        assert_eq!(tracker.explored().await.len(), 1);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_reload_roundtrip() {
        let (tracker, _, _) = setup();
        for lat in [22.3149, 22.3200, 22.3300, 22.3400] {
            tracker.on_fix(c(lat, 87.3105)).await.unwrap();
        }
        let before = tracker.explored().await;

        assert_eq!(tracker.reload().await.unwrap(), before.len());
        assert_eq!(tracker.explored().await, before);
    }

    #[tokio::test]
    async fn test_reload_recovers_drift() {
        let (tracker, store, renderer) = setup();
        tracker.on_fix(c(22.3149, 87.3105)).await.unwrap();
        // Someone else wrote to the store behind the tracker's back
        store
            .insert(NewPoint::new(c(10.0, 10.0), chrono::Utc::now()))
            .await
            .unwrap();

        let frames_before = renderer.count();
        assert_eq!(tracker.reload().await.unwrap(), 2);
        assert_eq!(tracker.explored().await.len(), 2);
        assert_eq!(renderer.count(), frames_before + 1);
    }

    #[tokio::test]
    async fn test_failed_reload_keeps_points() {
        let (tracker, store, _) = setup();
        tracker.on_fix(c(22.3149, 87.3105)).await.unwrap();
        store.set_fail_reads(true);

        let err = tracker.reload().await.unwrap_err();
        assert!(matches!(err, FogError::PersistenceReadFailed(_)));
        assert_eq!(tracker.explored().await.len(), 1);
    }

    #[tokio::test]
    async fn test_load_reads_persisted_points() {
        let (tracker, store, _) = setup();
        store
            .insert(NewPoint::new(c(1.0, 1.0), chrono::Utc::now()))
            .await
            .unwrap();
        assert_eq!(tracker.load().await.unwrap(), 1);
        // The loaded point participates in deduplication
        assert!(!tracker.on_fix(c(1.0, 1.0)).await.unwrap().is_new());
    }

    #[tokio::test]
    async fn test_failed_load_degrades_to_empty() {
        let (tracker, store, _) = setup();
        store.set_fail_reads(true);

        let err = tracker.load().await.unwrap_err();
        assert!(matches!(err, FogError::PersistenceReadFailed(_)));
        assert!(tracker.explored().await.is_empty());
        assert_eq!(tracker.stats().read_failures, 1);

        // Tracking still works
        assert!(tracker.on_fix(c(1.0, 1.0)).await.unwrap().is_new());
    }

    #[tokio::test]
    async fn test_failed_load_after_load_keeps_points() {
        let (tracker, store, renderer) = setup();
        tracker.on_fix(c(22.3149, 87.3105)).await.unwrap();
        tracker.on_fix(c(22.3200, 87.3105)).await.unwrap();
        assert_eq!(tracker.load().await.unwrap(), 2);
        let frames_before = renderer.count();

        store.set_fail_reads(true);
        let err = tracker.load().await.unwrap_err();
        assert!(matches!(err, FogError::PersistenceReadFailed(_)));

        assert_eq!(renderer.count(), frames_before);
        store.set_fail_reads(false);
        assert_eq!(tracker.explored().await, store.load_all().await.unwrap());
        // Kept points still deduplicate
        assert!(!tracker.on_fix(c(22.3149, 87.3105)).await.unwrap().is_new());
    }

    #[tokio::test]
    async fn test_renderer_failure_never_fails_operations() {
        let store = Arc::new(MemoryStore::new());
        let renderer = Arc::new(RejectingRenderer::default());
        let tracker = ExplorationTracker::new(
            Arc::clone(&store) as Arc<dyn ExploredStore>,
            Arc::clone(&renderer) as Arc<dyn Renderer>,
            TrackerConfig::default(),
        );

        assert!(tracker.on_fix(c(22.3149, 87.3105)).await.unwrap().is_new());
        assert!(tracker.on_fix(c(22.3200, 87.3105)).await.unwrap().is_new());
        assert!(!tracker.on_fix(c(22.3149, 87.3105)).await.unwrap().is_new());
        assert_eq!(tracker.explored().await, store.load_all().await.unwrap());

        store
            .insert(NewPoint::new(c(10.0, 10.0), chrono::Utc::now()))
            .await
            .unwrap();
        assert_eq!(tracker.reload().await.unwrap(), 3);
        assert_eq!(tracker.explored().await, store.load_all().await.unwrap());

        assert_eq!(tracker.reset().await.unwrap(), 3);
        assert!(tracker.explored().await.is_empty());
        assert!(store.is_empty());
        assert_eq!(tracker.stats().write_failures, 0);
        assert!(renderer.attempts.load(Ordering::SeqCst) >= 4);
    }

    #[tokio::test]
    async fn test_first_position_snapshot_recenters_once() {
        let (tracker, _, renderer) = setup();
        tracker.on_fix(c(22.3149, 87.3105)).await.unwrap();
        tracker.on_fix(c(22.3200, 87.3105)).await.unwrap();

        let frames = renderer.frames();
        assert_eq!(frames.len(), 2);
        assert!(frames[0].recenter);
        assert!(!frames[1].recenter);
    }

    #[tokio::test]
    async fn test_request_recenter_pushes_immediately() {
        let (tracker, _, renderer) = setup();
        tracker.request_recenter().await;
        assert_eq!(renderer.count(), 0, "nothing to center on yet");

        tracker.on_fix(c(22.3149, 87.3105)).await.unwrap();
        tracker.request_recenter().await;
        let frames = renderer.frames();
        assert_eq!(frames.len(), 2);
        assert!(frames[1].recenter);
        assert!(!tracker.snapshot().await.recenter);
    }

    #[tokio::test]
    async fn test_concurrent_identical_fixes_insert_once() {
        let store = Arc::new(SlowStore {
            inner: MemoryStore::new(),
            delay: Duration::from_millis(10),
        });
        let tracker = Arc::new(ExplorationTracker::new(
            Arc::clone(&store) as Arc<dyn ExploredStore>,
            Arc::new(RecordingRenderer::default()),
            TrackerConfig::default(),
        ));

        let calls = (0..8).map(|_| {
            let tracker = Arc::clone(&tracker);
            tokio::spawn(async move { tracker.on_fix(c(22.3149, 87.3105)).await })
        });
        let outcomes = futures::future::join_all(calls).await;

        let new_count = outcomes
            .into_iter()
            .map(|r| r.unwrap().unwrap())
            .filter(Classification::is_new)
            .count();
        assert_eq!(new_count, 1);
        assert_eq!(store.inner.len(), 1);
        assert_eq!(tracker.stats().revisits, 7);
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        fn run_sequence(coords: &[(f64, f64)]) -> Vec<ExploredPoint> {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();
            runtime.block_on(async {
                let (tracker, store, _) = setup();
                for (lat, lon) in coords {
                    tracker.on_fix(c(*lat, *lon)).await.unwrap();
                }
                let explored = tracker.explored().await;
                assert_eq!(explored, store.load_all().await.unwrap());
                explored
            })
        }

        proptest! {
            #[test]
            fn test_explored_points_pairwise_apart(
                coords in prop::collection::vec(
                    (22.3140..22.3160_f64, 87.3100..87.3120_f64),
                    1..60,
                )
            ) {
                let explored = run_sequence(&coords);
                for (i, a) in explored.iter().enumerate() {
                    for b in &explored[i + 1..] {
                        let d = haversine_distance(&a.coordinate, &b.coordinate);
                        prop_assert!(
                            d >= DEFAULT_REVISIT_THRESHOLD_M,
                            "points {} and {} only {} m apart", a.id, b.id, d
                        );
                    }
                }
            }

            #[test]
            fn test_repeating_a_sequence_adds_nothing(
                coords in prop::collection::vec(
                    (22.3140..22.3160_f64, 87.3100..87.3120_f64),
                    1..30,
                )
            ) {
                let mut doubled = coords.clone();
                doubled.extend_from_slice(&coords);
                prop_assert_eq!(run_sequence(&coords).len(), run_sequence(&doubled).len());
            }
        }
    }
}
