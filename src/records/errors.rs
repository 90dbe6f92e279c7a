//! Service errors
//!
//! Every failure a caller of `RecordsService` can see, with the HTTP status
//! a route layer should answer with.

use thiserror::Error;

use crate::address::{AddressError, FileId};
use crate::filter::FilterError;
use crate::revert::RevertError;
use crate::status::FileStatus;
use crate::store::StoreError;

/// Result type for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// Malformed filter or paging
    #[error("invalid filter: {0}")]
    Filter(#[from] FilterError),

    #[error(transparent)]
    Revert(#[from] RevertError),

    #[error("file {file_id} is not awaiting upload approval (status {status})")]
    NotAwaitingApproval { file_id: FileId, status: FileStatus },

    #[error("file {0} not found")]
    FileNotFound(FileId),

    #[error("internal error: {0}")]
    Address(#[from] AddressError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl ServiceError {
    /// HTTP-equivalent status code
    pub fn status_code(&self) -> u16 {
        match self {
            ServiceError::Filter(_) => 400,
            ServiceError::Revert(e) => match e {
                RevertError::NotRevertible { .. }
                | RevertError::InvalidTarget { .. }
                | RevertError::Filter(_) => 400,
                RevertError::FileNotFound(_) => 404,
                RevertError::UnmappedFileStatus(_)
                | RevertError::Address(_)
                | RevertError::Store(_) => 500,
            },
            ServiceError::NotAwaitingApproval { .. } => 409,
            ServiceError::FileNotFound(_) => 404,
            ServiceError::Address(_) | ServiceError::Store(_) => 500,
        }
    }

    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            ServiceError::Filter(e) => e.code().code(),
            ServiceError::Revert(e) => match e {
                RevertError::NotRevertible { .. } => "RECORDS_NOT_REVERTIBLE",
                RevertError::InvalidTarget { .. } => "RECORDS_INVALID_TARGET",
                RevertError::UnmappedFileStatus(_) => "RECORDS_UNMAPPED_FILE_STATUS",
                RevertError::FileNotFound(_) => "RECORDS_FILE_NOT_FOUND",
                RevertError::Filter(f) => f.code().code(),
                RevertError::Address(a) => a.code().code(),
                RevertError::Store(_) => "RECORDS_STORE_ERROR",
            },
            ServiceError::NotAwaitingApproval { .. } => "RECORDS_NOT_AWAITING_APPROVAL",
            ServiceError::FileNotFound(_) => "RECORDS_FILE_NOT_FOUND",
            ServiceError::Address(e) => e.code().code(),
            ServiceError::Store(_) => "RECORDS_STORE_ERROR",
        }
    }
}
