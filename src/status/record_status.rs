//! Per-record lifecycle statuses

use std::fmt;

use serde::{Deserialize, Serialize};

use super::errors::{StatusError, StatusResult};

/// Status of a single record.
///
/// Codes are ordered by pipeline progress. Each error status sorts directly
/// after the stage that produced it, so `PARSE_ERROR > LOADED` and
/// `UPLOAD_ERROR > VALIDATED`. The derived `Ord` follows the codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum RecordStatus {
    /// Header row, never processed
    Header = 10,
    Loaded = 20,
    LoadError = 29,
    Parsed = 40,
    ParseError = 49,
    Validated = 60,
    ValidationError = 69,
    Uploaded = 80,
    UploadError = 89,
}

impl RecordStatus {
    /// Every record status in code order
    pub const ALL: [RecordStatus; 9] = [
        RecordStatus::Header,
        RecordStatus::Loaded,
        RecordStatus::LoadError,
        RecordStatus::Parsed,
        RecordStatus::ParseError,
        RecordStatus::Validated,
        RecordStatus::ValidationError,
        RecordStatus::Uploaded,
        RecordStatus::UploadError,
    ];

    /// Integer wire code
    pub fn code(&self) -> i32 {
        *self as i32
    }

    /// Looks up a status by its wire code
    pub fn from_code(code: i32) -> StatusResult<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|s| s.code() == code)
            .ok_or(StatusError::UnknownRecordStatus(code))
    }

    /// Parses a decimal wire code such as `"69"`
    pub fn parse_code(raw: &str) -> StatusResult<Self> {
        let code: i32 = raw
            .trim()
            .parse()
            .map_err(|_| StatusError::NotAnInteger(raw.to_string()))?;
        Self::from_code(code)
    }

    /// Returns the status name
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordStatus::Header => "HEADER",
            RecordStatus::Loaded => "LOADED",
            RecordStatus::LoadError => "LOAD_ERROR",
            RecordStatus::Parsed => "PARSED",
            RecordStatus::ParseError => "PARSE_ERROR",
            RecordStatus::Validated => "VALIDATED",
            RecordStatus::ValidationError => "VALIDATION_ERROR",
            RecordStatus::Uploaded => "UPLOADED",
            RecordStatus::UploadError => "UPLOAD_ERROR",
        }
    }

    /// True for the error statuses
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            RecordStatus::LoadError
                | RecordStatus::ParseError
                | RecordStatus::ValidationError
                | RecordStatus::UploadError
        )
    }
}

impl fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<i32> for RecordStatus {
    type Error = StatusError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        Self::from_code(code)
    }
}

impl From<RecordStatus> for i32 {
    fn from(status: RecordStatus) -> Self {
        status.code()
    }
}
