//! Message-passing bridge to an embedded web map.
//!
//! Each snapshot becomes one JSON message posted to the web view:
//!
//! ```json
//! {"type":"update","current":{"latitude":22.3149,"longitude":87.3105},
//!  "explored":[{"id":1,"latitude":22.3149,"longitude":87.3105,"timestamp":1700000000000}],
//!  "recenter":true}
//! ```

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::trace;

use super::{RenderError, Renderer};
use crate::coord::Coordinate;
use crate::model::{ExploredPoint, Snapshot};

/// Explored point as the web map sees it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BridgePoint {
    pub id: i64,
    pub latitude: f64,
    pub longitude: f64,
    /// Creation time in milliseconds since the epoch.
    pub timestamp: i64,
}

impl From<&ExploredPoint> for BridgePoint {
    fn from(point: &ExploredPoint) -> Self {
        Self {
            id: point.id,
            latitude: point.coordinate.latitude(),
            longitude: point.coordinate.longitude(),
            timestamp: point.timestamp_ms(),
        }
    }
}

/// Messages posted to the web map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BridgeMessage {
    Update {
        current: Option<Coordinate>,
        explored: Vec<BridgePoint>,
        recenter: bool,
    },
}

impl From<&Snapshot> for BridgeMessage {
    fn from(snapshot: &Snapshot) -> Self {
        BridgeMessage::Update {
            current: snapshot.current,
            explored: snapshot.explored.iter().map(BridgePoint::from).collect(),
            recenter: snapshot.recenter,
        }
    }
}

/// Renderer that serializes snapshots for a web view.
#[derive(Debug, Clone)]
pub struct WebBridgeRenderer {
    tx: mpsc::UnboundedSender<String>,
}

impl WebBridgeRenderer {
    /// Create a bridge and the receiving end the web view host drains.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Renderer for WebBridgeRenderer {
    fn push(&self, snapshot: &Snapshot) -> Result<(), RenderError> {
        let message = serde_json::to_string(&BridgeMessage::from(snapshot))?;
        trace!(bytes = message.len(), "Posting snapshot to web bridge");
        self.tx
            .send(message)
            .map_err(|_| RenderError::BridgeClosed)
    }

    fn name(&self) -> &str {
        "web"
    }
}
