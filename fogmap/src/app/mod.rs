//! Application wiring and lifecycle.
//!
//! This module turns configuration into a running [`ExplorationSession`]:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        FogMapApp                             │
//! │                                                              │
//! │  PositionStream ──► pump task ──► ExplorationTracker         │
//! │   (permission,       (one fix     ├── ExploredStore (SQLite) │
//! │    filter)            at a time)  └── Renderer               │
//! │                          │              (overlay | web)      │
//! │                          └──► Notice broadcast               │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Failures the user should see (permission denied, a point that could not
//! be saved, a load that came back empty-handed) are published as
//! [`Notice`]s; they never stop tracking.

mod bootstrap;
mod error;
mod session;

pub use bootstrap::{create_renderer, open_store, FogMapApp, RendererHandle};
pub use error::AppError;
pub use session::{ExplorationSession, Notice, NoticeKind};
