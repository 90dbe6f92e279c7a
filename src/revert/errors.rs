//! Revert errors
//!
//! Precondition failures (`NotRevertible`, `InvalidTarget`,
//! `UnmappedFileStatus`) are raised before any mutation. `Store` failures
//! are propagated unchanged; nothing here retries.

use thiserror::Error;

use crate::address::{AddressError, FileId};
use crate::filter::FilterError;
use crate::status::RecordStatus;
use crate::store::StoreError;

/// Result type for revert and reconcile operations
pub type RevertResult<T> = Result<T, RevertError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RevertError {
    /// Current status missing or not one of the revertible error statuses
    #[error("{}", not_revertible_message(.status))]
    NotRevertible { status: Option<RecordStatus> },

    /// Target is not an earlier stage the current status may return to
    #[error("cannot revert to {target}: {reason}")]
    InvalidTarget { target: String, reason: String },

    /// Target has no file-level counterpart
    #[error("no file status is mapped for record status {0}")]
    UnmappedFileStatus(RecordStatus),

    #[error("file {0} not found")]
    FileNotFound(FileId),

    #[error(transparent)]
    Filter(#[from] FilterError),

    #[error(transparent)]
    Address(#[from] AddressError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

fn not_revertible_message(status: &Option<RecordStatus>) -> String {
    match status {
        Some(status) => format!("records in status {} cannot be reverted", status),
        None => "a revert requires a single status filter".to_string(),
    }
}

impl RevertError {
    /// True for failures raised before any mutation was attempted
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            RevertError::NotRevertible { .. }
                | RevertError::InvalidTarget { .. }
                | RevertError::UnmappedFileStatus(_)
                | RevertError::Filter(_)
        )
    }
}
