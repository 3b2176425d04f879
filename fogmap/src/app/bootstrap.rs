//! Application bootstrap implementation.
//!
//! `FogMapApp` assembles the store, renderer, tracker and position stream
//! from a [`ConfigFile`] in the right order and hands back a ready session.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::info;

use super::error::AppError;
use super::session::ExplorationSession;
use crate::config::ConfigFile;
use crate::position::{FixSource, PermissionGate, PositionStream};
use crate::render::{OverlayRenderer, RenderMode, Renderer, WebBridgeRenderer};
use crate::store::{ExploredStore, SqliteStore};
use crate::tracker::{ExplorationTracker, TrackerStats};

/// The consumer side of whichever renderer was configured.
#[derive(Debug)]
pub enum RendererHandle {
    /// Native overlay; read the latest geometry from the renderer.
    Overlay(Arc<OverlayRenderer>),

    /// Web bridge; JSON messages destined for the embedded page.
    Web(mpsc::UnboundedReceiver<String>),
}

impl RendererHandle {
    pub fn mode(&self) -> RenderMode {
        match self {
            RendererHandle::Overlay(_) => RenderMode::Overlay,
            RendererHandle::Web(_) => RenderMode::Web,
        }
    }
}

/// Open the configured explored point database.
pub fn open_store(config: &ConfigFile) -> Result<SqliteStore, AppError> {
    SqliteStore::open(&config.storage.database).map_err(AppError::StoreOpen)
}

/// Create the renderer selected by `mode`.
pub fn create_renderer(
    config: &ConfigFile,
    mode: RenderMode,
) -> (Arc<dyn Renderer>, RendererHandle) {
    match mode {
        RenderMode::Overlay => {
            let overlay = Arc::new(OverlayRenderer::new(config.overlay_config()));
            (
                Arc::clone(&overlay) as Arc<dyn Renderer>,
                RendererHandle::Overlay(overlay),
            )
        }
        RenderMode::Web => {
            let (bridge, rx) = WebBridgeRenderer::new();
            (Arc::new(bridge), RendererHandle::Web(rx))
        }
    }
}

/// A wired exploration session plus its renderer output.
///
/// # Example
///
/// ```ignore
/// use fogmap::app::FogMapApp;
///
/// let mut app = FogMapApp::build(&config, source, permission)?;
/// app.session_mut().start().await?;
/// app.session_mut().wait().await;
/// let stats = app.shutdown().await;
/// ```
#[derive(Debug)]
pub struct FogMapApp {
    session: ExplorationSession,
    renderer: RendererHandle,
}

impl FogMapApp {
    /// Build against the configured SQLite database and render mode.
    pub fn build(
        config: &ConfigFile,
        source: Arc<dyn FixSource>,
        permission: Arc<dyn PermissionGate>,
    ) -> Result<Self, AppError> {
        let store = open_store(config)?;
        info!(database = store.location(), "Explored point database opened");
        Ok(Self::with_store(
            config,
            config.render.mode,
            Arc::new(store),
            source,
            permission,
        ))
    }

    /// Build against an explicit store and render mode.
    pub fn with_store(
        config: &ConfigFile,
        mode: RenderMode,
        store: Arc<dyn ExploredStore>,
        source: Arc<dyn FixSource>,
        permission: Arc<dyn PermissionGate>,
    ) -> Self {
        let (renderer, handle) = create_renderer(config, mode);
        let tracker = Arc::new(ExplorationTracker::new(
            store,
            renderer,
            config.tracker_config(),
        ));
        let position = PositionStream::new(source, permission, config.position_config());

        info!(
            render_mode = %mode,
            revisit_threshold_m = config.tracking.revisit_threshold_m,
            "Exploration session assembled"
        );

        Self {
            session: ExplorationSession::new(tracker, position),
            renderer: handle,
        }
    }

    pub fn session(&self) -> &ExplorationSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut ExplorationSession {
        &mut self.session
    }

    pub fn renderer(&self) -> &RendererHandle {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut RendererHandle {
        &mut self.renderer
    }

    /// Stop tracking and return the session's final counters.
    pub async fn shutdown(self) -> TrackerStats {
        self.session.shutdown().await
    }

    /// Split into the session and renderer handle.
    pub fn into_parts(self) -> (ExplorationSession, RendererHandle) {
        (self.session, self.renderer)
    }
}
