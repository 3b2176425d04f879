//! Raw fix sources.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::debug;

use super::{PositionError, PositionStreamConfig};
use crate::model::Fix;

/// A location sensor that can be subscribed to.
///
/// `open` returns the receiving end of a sensor subscription. The sensor is
/// released when that receiver is dropped; the adapter guarantees it keeps
/// at most one open at a time.
pub trait FixSource: Send + Sync {
    /// Open a sensor subscription. Must be called within a tokio runtime.
    ///
    /// The request carries the adapter's thresholds so platform sources can
    /// pass them on as hints.
    fn open(&self, request: &PositionStreamConfig) -> Result<mpsc::Receiver<Fix>, PositionError>;

    /// Source name for logging.
    fn name(&self) -> &str;
}

/// Decrements the live-subscription count when the feeder task ends.
struct LiveGuard(Arc<AtomicUsize>);

impl LiveGuard {
    fn acquire(count: &Arc<AtomicUsize>) -> Self {
        count.fetch_add(1, Ordering::SeqCst);
        Self(Arc::clone(count))
    }
}

impl Drop for LiveGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// A source that replays a recorded list of fixes.
///
/// Every subscription replays the list from the start, optionally pausing
/// `pace` between fixes, then ends. The feeder stops as soon as the
/// subscriber drops its receiver.
#[derive(Debug)]
pub struct ReplaySource {
    fixes: Arc<Vec<Fix>>,
    pace: Duration,
    live: Arc<AtomicUsize>,
    opened: AtomicUsize,
}

impl ReplaySource {
    /// Replay `fixes` back to back.
    pub fn new(fixes: Vec<Fix>) -> Self {
        Self {
            fixes: Arc::new(fixes),
            pace: Duration::ZERO,
            live: Arc::new(AtomicUsize::new(0)),
            opened: AtomicUsize::new(0),
        }
    }

    /// Pause this long before each fix.
    pub fn with_pace(mut self, pace: Duration) -> Self {
        self.pace = pace;
        self
    }

    /// Number of fixes in one replay.
    pub fn len(&self) -> usize {
        self.fixes.len()
    }

    /// Whether the replay is empty.
    pub fn is_empty(&self) -> bool {
        self.fixes.is_empty()
    }

    /// Subscriptions whose feeder is still running.
    pub fn live_subscriptions(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    /// Total subscriptions ever opened.
    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }
}

impl FixSource for ReplaySource {
    fn open(&self, request: &PositionStreamConfig) -> Result<mpsc::Receiver<Fix>, PositionError> {
        let (tx, rx) = mpsc::channel(request.buffer.max(1));
        let fixes = Arc::clone(&self.fixes);
        let pace = self.pace;
        let guard = LiveGuard::acquire(&self.live);
        let subscription = self.opened.fetch_add(1, Ordering::SeqCst) + 1;

        tokio::spawn(async move {
            let _guard = guard;
            for fix in fixes.iter() {
                if !pace.is_zero() {
                    tokio::select! {
                        _ = tx.closed() => break,
                        _ = tokio::time::sleep(pace) => {}
                    }
                }
                if tx.send(*fix).await.is_err() {
                    break;
                }
            }
            debug!(subscription, "Replay feeder finished");
        });

        Ok(rx)
    }

    fn name(&self) -> &str {
        "replay"
    }
}
