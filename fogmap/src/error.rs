//! User-facing error taxonomy.
//!
//! Every variant is recoverable: the session turns them into
//! [`Notice`](crate::app::Notice) values and keeps running.

use thiserror::Error;

use crate::store::StoreError;

/// Errors surfaced by exploration operations.
#[derive(Debug, Error)]
pub enum FogError {
    /// Location permission was refused; no fixes will be delivered.
    #[error("Location permission denied")]
    PermissionDenied,

    /// An insert or delete-all did not commit.
    #[error("Failed to write explored points: {0}")]
    PersistenceWriteFailed(#[source] StoreError),

    /// The initial load or a reload did not return data.
    #[error("Failed to read explored points: {0}")]
    PersistenceReadFailed(#[source] StoreError),
}

/// Result type for exploration operations.
pub type FogResult<T> = Result<T, FogError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_cause() {
        let err = FogError::PersistenceWriteFailed(StoreError::Unavailable("disk full".into()));
        let msg = err.to_string();
        assert!(msg.contains("Failed to write"));
        assert!(msg.contains("disk full"));
    }

    #[test]
    fn test_source_is_store_error() {
        use std::error::Error;
        let err = FogError::PersistenceReadFailed(StoreError::Task("join".into()));
        assert!(err.source().is_some());
        assert!(FogError::PermissionDenied.source().is_none());
    }
}
