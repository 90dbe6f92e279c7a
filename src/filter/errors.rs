//! Filter error types
//!
//! Error codes:
//! - RECORDS_FILTER_INVALID_STATUS (REJECT)
//! - RECORDS_FILTER_INVALID_FUNCTION_ID (REJECT)
//! - RECORDS_FILTER_INVALID_PAGING (REJECT)
//!
//! All filter errors are caller-visible and reject the request before any
//! query is compiled.

use std::fmt;

/// Severity levels for filter errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Client request rejected
    Reject,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Reject => write!(f, "REJECT"),
        }
    }
}

/// Filter error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterErrorCode {
    /// Status code not accepted by the registry
    RecordsFilterInvalidStatus,
    /// Recent-error function id is not an object id
    RecordsFilterInvalidFunctionId,
    /// Malformed start or length
    RecordsFilterInvalidPaging,
}

impl FilterErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            FilterErrorCode::RecordsFilterInvalidStatus => "RECORDS_FILTER_INVALID_STATUS",
            FilterErrorCode::RecordsFilterInvalidFunctionId => {
                "RECORDS_FILTER_INVALID_FUNCTION_ID"
            }
            FilterErrorCode::RecordsFilterInvalidPaging => "RECORDS_FILTER_INVALID_PAGING",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        Severity::Reject
    }
}

impl fmt::Display for FilterErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Invalid filter error with full context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterError {
    code: FilterErrorCode,
    message: String,
    param: &'static str,
}

impl FilterError {
    /// Create an invalid status error
    pub fn invalid_status(raw: impl fmt::Display, reason: impl fmt::Display) -> Self {
        Self {
            code: FilterErrorCode::RecordsFilterInvalidStatus,
            message: format!("Invalid status filter '{}': {}", raw, reason),
            param: "status",
        }
    }

    /// Create an invalid function id error
    pub fn invalid_function_id(raw: impl fmt::Display) -> Self {
        Self {
            code: FilterErrorCode::RecordsFilterInvalidFunctionId,
            message: format!(
                "Invalid recent error function id '{}': expected 24 hex characters",
                raw
            ),
            param: "recentErrors",
        }
    }

    /// Create an invalid paging error
    pub fn invalid_paging(param: &'static str, reason: impl Into<String>) -> Self {
        Self {
            code: FilterErrorCode::RecordsFilterInvalidPaging,
            message: format!("Invalid {}: {}", param, reason.into()),
            param,
        }
    }

    /// Returns the error code
    pub fn code(&self) -> FilterErrorCode {
        self.code
    }

    /// Returns the severity level
    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the offending request parameter
    pub fn param(&self) -> &'static str {
        self.param
    }
}

impl fmt::Display for FilterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.code.severity(),
            self.code.code(),
            self.message
        )
    }
}

impl std::error::Error for FilterError {}

/// Result type for filter construction
pub type FilterResult<T> = Result<T, FilterError>;
