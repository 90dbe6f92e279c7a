//! # Status Errors

use thiserror::Error;

/// Result type for status lookups
pub type StatusResult<T> = Result<T, StatusError>;

/// Status code errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StatusError {
    #[error("Unknown record status code: {0}")]
    UnknownRecordStatus(i32),

    #[error("Unknown file status code: {0}")]
    UnknownFileStatus(i32),

    #[error("Status code is not an integer: '{0}'")]
    NotAnInteger(String),
}
