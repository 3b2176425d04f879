//! Persistence for explored points.
//!
//! The [`ExploredStore`] trait is the only persistence boundary the tracker
//! sees. Two providers are available:
//!
//! - [`SqliteStore`]: durable table in a SQLite database file
//! - [`MemoryStore`]: volatile store for tests and dry runs
//!
//! # Table Layout
//!
//! ```text
//! explored_points
//! ┌────┬──────────┬───────────┬───────────────┐
//! │ id │ latitude │ longitude │ timestamp(ms) │
//! └────┴──────────┴───────────┴───────────────┘
//!   ^ INTEGER PRIMARY KEY AUTOINCREMENT
//! ```
//!
//! # Example
//!
//! ```ignore
//! use fogmap::store::{ExploredStore, SqliteStore};
//!
//! let store = SqliteStore::open("explored.db")?;
//! let point = store.insert(NewPoint::new(coord, Utc::now())).await?;
//! let all = store.load_all().await?;
//! ```

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use crate::BoxFuture;

use thiserror::Error;

use crate::model::{ExploredPoint, NewPoint};

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// SQLite reported an error.
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// I/O error preparing the database location.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The blocking database task panicked or was cancelled.
    #[error("Store task failed: {0}")]
    Task(String),

    /// A stored row could not be interpreted.
    #[error("Corrupt row {id}: {reason}")]
    CorruptRow { id: i64, reason: String },

    /// Provider-specific failure.
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Durable, key-ordered collection of explored points.
///
/// Implementations must serialize their own mutations and reads: an insert,
/// a delete-all and a bulk read never interleave.
///
/// Uses `Pin<Box<dyn Future>>` so the tracker can hold an
/// `Arc<dyn ExploredStore>`.
pub trait ExploredStore: Send + Sync {
    /// Persist a point and return it with its assigned id.
    ///
    /// Ids are monotonic: a later insert always receives a larger id.
    fn insert(&self, point: NewPoint) -> BoxFuture<'_, Result<ExploredPoint, StoreError>>;

    /// Read every stored point ordered by id.
    fn load_all(&self) -> BoxFuture<'_, Result<Vec<ExploredPoint>, StoreError>>;

    /// Delete every stored point, returning how many rows were removed.
    fn delete_all(&self) -> BoxFuture<'_, Result<u64, StoreError>>;

    /// Provider name for logging.
    fn name(&self) -> &str;
}
