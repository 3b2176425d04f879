//! The activatable fix stream.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use super::{FixFilter, FixSource, PermissionGate, PositionError, PositionStreamConfig};
use crate::model::Fix;

/// Consumer side of an active subscription.
///
/// Yields `None` once the subscription is stopped or restarted, even if
/// fixes are still buffered, or when the underlying source ends.
#[derive(Debug)]
pub struct FixStream {
    rx: mpsc::Receiver<Fix>,
    cancel: CancellationToken,
}

impl FixStream {
    /// Wait for the next fix.
    pub async fn recv(&mut self) -> Option<Fix> {
        if self.cancel.is_cancelled() {
            return None;
        }
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => None,
            fix = self.rx.recv() => fix,
        }
    }

    /// Whether the owning subscription has been stopped.
    pub fn is_stopped(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

struct ActiveSubscription {
    cancel: CancellationToken,
    forwarder: JoinHandle<()>,
}

/// Position Stream Adapter.
///
/// Holds at most one sensor subscription. `start` checks permission, opens
/// the source and spawns a forwarder applying the [`FixFilter`]. `stop`
/// cancels the forwarder and waits for it to drop the source subscription.
pub struct PositionStream {
    source: Arc<dyn FixSource>,
    permission: Arc<dyn PermissionGate>,
    config: PositionStreamConfig,
    active: Option<ActiveSubscription>,
}

impl PositionStream {
    pub fn new(
        source: Arc<dyn FixSource>,
        permission: Arc<dyn PermissionGate>,
        config: PositionStreamConfig,
    ) -> Self {
        Self {
            source,
            permission,
            config,
            active: None,
        }
    }

    /// Whether a subscription is currently open.
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// The thresholds in use.
    pub fn config(&self) -> &PositionStreamConfig {
        &self.config
    }

    /// Activate the adapter.
    ///
    /// Starting while active restarts the subscription: the previous
    /// [`FixStream`] ends and a fresh one is returned.
    ///
    /// # Errors
    ///
    /// - [`PositionError::PermissionDenied`] if the gate refuses; nothing is opened
    /// - [`PositionError::SourceUnavailable`] if the source cannot subscribe
    pub async fn start(&mut self) -> Result<FixStream, PositionError> {
        if self.active.is_some() {
            debug!(source = self.source.name(), "Restarting position subscription");
            self.stop().await;
        }

        if !self.permission.request().await {
            warn!("Location permission denied");
            return Err(PositionError::PermissionDenied);
        }

        let raw = self.source.open(&self.config)?;
        let (tx, rx) = mpsc::channel(self.config.buffer.max(1));
        let cancel = CancellationToken::new();
        let filter = FixFilter::new(self.config.clone());

        let forwarder = tokio::spawn(forward(raw, tx, cancel.clone(), filter));
        self.active = Some(ActiveSubscription {
            cancel: cancel.clone(),
            forwarder,
        });

        info!(
            source = self.source.name(),
            min_interval_ms = self.config.min_interval.as_millis() as u64,
            min_displacement_m = self.config.min_displacement_m,
            "Position stream started"
        );

        Ok(FixStream { rx, cancel })
    }

    /// Deactivate the adapter.
    ///
    /// Delivery stops immediately and the sensor subscription is released
    /// before this returns. Stopping while inactive is a no-op.
    pub async fn stop(&mut self) {
        let Some(active) = self.active.take() else {
            return;
        };
        active.cancel.cancel();
        if let Err(e) = active.forwarder.await {
            warn!(error = %e, "Position forwarder ended abnormally");
        }
        info!(source = self.source.name(), "Position stream stopped");
    }
}

impl Drop for PositionStream {
    fn drop(&mut self) {
        if let Some(active) = self.active.take() {
            active.cancel.cancel();
        }
    }
}

impl std::fmt::Debug for PositionStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PositionStream")
            .field("source", &self.source.name())
            .field("config", &self.config)
            .field("active", &self.active.is_some())
            .finish()
    }
}

/// Pump raw fixes through the filter until cancelled or either side closes.
async fn forward(
    mut raw: mpsc::Receiver<Fix>,
    tx: mpsc::Sender<Fix>,
    cancel: CancellationToken,
    mut filter: FixFilter,
) {
    loop {
        let fix = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            fix = raw.recv() => match fix {
                Some(fix) => fix,
                None => break,
            },
        };

        if !filter.accept(&fix) {
            trace!(coordinate = %fix.coordinate, "Fix below thresholds, skipped");
            continue;
        }

        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            sent = tx.send(fix) => {
                if sent.is_err() {
                    break;
                }
            }
        }
    }
    // `raw` drops here, releasing the sensor subscription
}
