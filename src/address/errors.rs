//! Address error types
//!
//! Error codes:
//! - RECORDS_ADDRESS_RANGE (INTERNAL)
//!
//! Address errors are programmer errors: callers build addresses from ids
//! they already validated, so these never reach an end user.

use std::fmt;

/// Severity levels for address errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Caller bug, not user-facing
    Internal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Internal => write!(f, "INTERNAL"),
        }
    }
}

/// Address error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressErrorCode {
    /// File id or row number outside the encodable range
    RecordsAddressRange,
}

impl AddressErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            AddressErrorCode::RecordsAddressRange => "RECORDS_ADDRESS_RANGE",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        Severity::Internal
    }
}

impl fmt::Display for AddressErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Address error with the offending input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressError {
    code: AddressErrorCode,
    message: String,
    value: i128,
}

impl AddressError {
    /// File id is negative or does not fit the high 32 bits
    pub fn file_id_out_of_range(file_id: impl Into<i128>) -> Self {
        let value = file_id.into();
        Self {
            code: AddressErrorCode::RecordsAddressRange,
            message: format!("File id {} is outside 0..={}", value, u32::MAX),
            value,
        }
    }

    /// Row number is zero, negative or does not fit the low 32 bits
    pub fn row_out_of_range(row_number: impl Into<i128>) -> Self {
        let value = row_number.into();
        Self {
            code: AddressErrorCode::RecordsAddressRange,
            message: format!("Row number {} is outside 1..={}", value, u32::MAX),
            value,
        }
    }

    /// The file's address range would overflow 64 bits
    pub fn range_overflow(file_id: u32) -> Self {
        Self {
            code: AddressErrorCode::RecordsAddressRange,
            message: format!("Address range for file id {} overflows 64 bits", file_id),
            value: file_id as i128,
        }
    }

    /// Returns the error code
    pub fn code(&self) -> AddressErrorCode {
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

    /// Returns the rejected input value
    pub fn value(&self) -> i128 {
        self.value
    }
}

impl fmt::Display for AddressError {
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

impl std::error::Error for AddressError {}

/// Result type for address operations
pub type AddressResult<T> = Result<T, AddressError>;
