//! Application error types.

use std::fmt;

use crate::error::FogError;
use crate::position::PositionError;
use crate::store::StoreError;

/// Errors that can occur during application lifecycle.
#[derive(Debug)]
pub enum AppError {
    /// Failed to open the explored point database.
    StoreOpen(StoreError),

    /// The location source could not be activated.
    PositionStart(PositionError),

    /// A recoverable exploration error that prevented startup.
    Exploration(FogError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::StoreOpen(e) => {
                write!(f, "Failed to open explored point database: {}", e)
            }
            AppError::PositionStart(e) => {
                write!(f, "Failed to start position stream: {}", e)
            }
            AppError::Exploration(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::StoreOpen(e) => Some(e),
            AppError::PositionStart(e) => Some(e),
            AppError::Exploration(e) => Some(e),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        AppError::StoreOpen(e)
    }
}

impl From<FogError> for AppError {
    fn from(e: FogError) -> Self {
        AppError::Exploration(e)
    }
}

impl From<PositionError> for AppError {
    fn from(e: PositionError) -> Self {
        match e {
            PositionError::PermissionDenied => AppError::Exploration(FogError::PermissionDenied),
            other => AppError::PositionStart(other),
        }
    }
}
