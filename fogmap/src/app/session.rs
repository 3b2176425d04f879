//! Exploration session: the running pipeline from fixes to renderer.

use std::fmt;
use std::sync::Arc;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use super::AppError;
use crate::error::{FogError, FogResult};
use crate::position::{FixStream, PositionStream};
use crate::tracker::{ExplorationTracker, TrackerStats};

/// Capacity of the notice broadcast channel.
const NOTICE_CAPACITY: usize = 32;

/// Category of a user-facing notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    PermissionDenied,
    WriteFailed,
    ReadFailed,
}

/// A non-fatal problem the user should be told about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl From<&FogError> for Notice {
    fn from(error: &FogError) -> Self {
        let kind = match error {
            FogError::PermissionDenied => NoticeKind::PermissionDenied,
            FogError::PersistenceWriteFailed(_) => NoticeKind::WriteFailed,
            FogError::PersistenceReadFailed(_) => NoticeKind::ReadFailed,
        };
        Self {
            kind,
            message: error.to_string(),
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Wires a position stream into a tracker and reports failures as notices.
///
/// # Lifecycle
///
/// ```text
/// new ──► subscribe ──► start ──► (fixes flow) ──► stop / shutdown
///                        │
///                        ├─ load explored points (failure → notice, empty set)
///                        └─ activate position stream (denied → notice + error)
/// ```
pub struct ExplorationSession {
    tracker: Arc<ExplorationTracker>,
    position: PositionStream,
    notices: broadcast::Sender<Notice>,
    pump: Option<JoinHandle<()>>,
}

impl ExplorationSession {
    pub fn new(tracker: Arc<ExplorationTracker>, position: PositionStream) -> Self {
        let (notices, _) = broadcast::channel(NOTICE_CAPACITY);
        Self {
            tracker,
            position,
            notices,
            pump: None,
        }
    }

    /// Receive notices published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Notice> {
        self.notices.subscribe()
    }

    pub fn tracker(&self) -> &Arc<ExplorationTracker> {
        &self.tracker
    }

    /// Whether fixes are currently being consumed.
    pub fn is_tracking(&self) -> bool {
        self.position.is_active()
    }

    /// Load persisted points, then activate the position stream.
    ///
    /// A failed load only produces a notice. Permission denial produces a
    /// notice and is returned as [`FogError::PermissionDenied`].
    pub async fn start(&mut self) -> Result<(), AppError> {
        if let Err(e) = self.tracker.load().await {
            self.notify(&e);
        }
        self.activate().await
    }

    /// Activate (or restart) the position stream and the fix pump.
    pub async fn activate(&mut self) -> Result<(), AppError> {
        self.stop().await;

        let fixes = match self.position.start().await {
            Ok(fixes) => fixes,
            Err(e) => {
                let err = AppError::from(e);
                if let AppError::Exploration(ref fog) = err {
                    self.notify(fog);
                }
                return Err(err);
            }
        };

        let tracker = Arc::clone(&self.tracker);
        let notices = self.notices.clone();
        self.pump = Some(tokio::spawn(pump(tracker, fixes, notices)));
        info!("Exploration tracking active");
        Ok(())
    }

    /// Stop fix delivery and wait for the fix in progress, if any, to finish.
    pub async fn stop(&mut self) {
        self.position.stop().await;
        if let Some(pump) = self.pump.take() {
            if let Err(e) = pump.await {
                warn!(error = %e, "Fix pump ended abnormally");
            }
        }
    }

    /// Wait until the source runs out of fixes.
    ///
    /// Cancel-safe: if this future is dropped early, a later
    /// [`stop`](Self::stop) still waits for the pump.
    pub async fn wait(&mut self) {
        if let Some(pump) = self.pump.as_mut() {
            if let Err(e) = pump.await {
                warn!(error = %e, "Fix pump ended abnormally");
            }
            self.pump = None;
        }
        self.position.stop().await;
    }

    /// Clear all explored points, notifying on failure.
    pub async fn reset(&self) -> FogResult<u64> {
        self.tracker.reset().await.inspect_err(|e| self.notify(e))
    }

    /// Re-sync the explored set from the store, notifying on failure.
    pub async fn reload(&self) -> FogResult<usize> {
        self.tracker.reload().await.inspect_err(|e| self.notify(e))
    }

    /// Stop tracking and return the final counters.
    pub async fn shutdown(mut self) -> TrackerStats {
        self.stop().await;
        let stats = self.tracker.stats();
        info!(
            fixes = stats.fixes_processed,
            new_points = stats.new_points,
            revisits = stats.revisits,
            "Exploration session closed"
        );
        stats
    }

    fn notify(&self, error: &FogError) {
        publish(&self.notices, error);
    }
}

impl fmt::Debug for ExplorationSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExplorationSession")
            .field("tracker", &self.tracker)
            .field("position", &self.position)
            .field("pumping", &self.pump.is_some())
            .finish()
    }
}

fn publish(notices: &broadcast::Sender<Notice>, error: &FogError) {
    warn!(error = %error, "Exploration notice");
    // No subscribers is fine; the warning above is still logged
    let _ = notices.send(Notice::from(error));
}

/// Feed fixes to the tracker one at a time until the stream ends.
async fn pump(
    tracker: Arc<ExplorationTracker>,
    mut fixes: FixStream,
    notices: broadcast::Sender<Notice>,
) {
    while let Some(fix) = fixes.recv().await {
        if let Err(e) = tracker.on_fix(fix.coordinate).await {
            publish(&notices, &e);
        }
    }
}
