//! Tracker counters.
//!
//! Lock-free atomics updated on the hot path, read as a point-in-time copy.

use std::sync::atomic::{AtomicU64, Ordering};

/// Live counters owned by the tracker.
#[derive(Debug, Default)]
pub(crate) struct TrackerMetrics {
    fixes_processed: AtomicU64,
    new_points: AtomicU64,
    revisits: AtomicU64,
    write_failures: AtomicU64,
    read_failures: AtomicU64,
}

impl TrackerMetrics {
    pub(crate) fn fix_processed(&self) {
        self.fixes_processed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn new_point(&self) {
        self.new_points.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn revisit(&self) {
        self.revisits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn write_failed(&self) {
        self.write_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn read_failed(&self) {
        self.read_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> TrackerStats {
        TrackerStats {
            fixes_processed: self.fixes_processed.load(Ordering::Relaxed),
            new_points: self.new_points.load(Ordering::Relaxed),
            revisits: self.revisits.load(Ordering::Relaxed),
            write_failures: self.write_failures.load(Ordering::Relaxed),
            read_failures: self.read_failures.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of the tracker counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrackerStats {
    /// Fixes handed to `on_fix`.
    pub fixes_processed: u64,
    /// Fixes persisted as new explored points.
    pub new_points: u64,
    /// Fixes discarded as revisits.
    pub revisits: u64,
    /// Inserts or deletes the store did not confirm.
    pub write_failures: u64,
    /// Loads or reloads the store did not answer.
    pub read_failures: u64,
}

impl TrackerStats {
    /// Share of processed fixes that were revisits (0.0 when idle).
    pub fn revisit_ratio(&self) -> f64 {
        if self.fixes_processed == 0 {
            0.0
        } else {
            self.revisits as f64 / self.fixes_processed as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_reflects_counters() {
        let metrics = TrackerMetrics::default();
        metrics.fix_processed();
        metrics.fix_processed();
        metrics.new_point();
        metrics.revisit();
        metrics.write_failed();

        let stats = metrics.snapshot();
        assert_eq!(stats.fixes_processed, 2);
        assert_eq!(stats.new_points, 1);
        assert_eq!(stats.revisits, 1);
        assert_eq!(stats.write_failures, 1);
        assert_eq!(stats.read_failures, 0);
        assert_eq!(stats.revisit_ratio(), 0.5);
    }

    #[test]
    fn test_revisit_ratio_idle() {
        assert_eq!(TrackerStats::default().revisit_ratio(), 0.0);
    }
}
