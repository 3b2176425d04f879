//! FogMap - fog-of-war exploration tracking
//!
//! This library turns a stream of location fixes into a persistent set of
//! explored points, deduplicated at a 30 m radius, and pushes the result to
//! a renderer that clears fog around each point.
//!
//! # Layout
//!
//! - [`position`]: permission-gated, throttled fix stream
//! - [`tracker`]: classification, persistence boundary, snapshots
//! - [`store`]: explored point storage (SQLite and in-memory)
//! - [`render`]: native overlay and web bridge renderers
//! - [`app`]: session wiring and user notices
//! - [`config`], [`logging`]: ambient setup shared with the CLI

use std::future::Future;
use std::pin::Pin;

pub mod app;
pub mod config;
pub mod coord;
pub mod error;
pub mod logging;
pub mod model;
pub mod position;
pub mod render;
pub mod store;
pub mod tracker;

pub use coord::Coordinate;
pub use error::{FogError, FogResult};
pub use model::{ExploredPoint, Fix, Snapshot};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Boxed future used by the object-safe async traits.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;
