//! # Store Errors

use thiserror::Error;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Backing-store failures.
///
/// The engine never retries these; they propagate to the caller unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Store lock poisoned")]
    Poisoned,

    #[error("Invalid pipeline: {0}")]
    InvalidPipeline(String),

    #[error("Store backend error: {0}")]
    Backend(String),
}
