//! Append-only processing log entries
//!
//! The same shape is used for a document's `log`, for a record's
//! `recentErrors`, and for the audit entries written by reverts.

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Log entry level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogLevel {
    Info,
    Warning,
    Error,
}

/// A timestamped log entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub level: LogLevel,
    /// Unix seconds
    pub time: i64,
    pub message: String,
    /// Function that produced the error, for recent errors
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<u32>,
}

impl LogEntry {
    /// INFO entry stamped with the current time
    pub fn info(message: impl Into<String>) -> Self {
        Self::at(LogLevel::Info, Utc::now().timestamp(), message)
    }

    /// ERROR entry stamped with the current time
    pub fn error(message: impl Into<String>) -> Self {
        Self::at(LogLevel::Error, Utc::now().timestamp(), message)
    }

    /// Entry with an explicit timestamp
    pub fn at(level: LogLevel, time: i64, message: impl Into<String>) -> Self {
        Self {
            level,
            time,
            message: message.into(),
            function_id: None,
            error_code: None,
        }
    }

    /// Attaches the id of the function that raised the error
    pub fn with_function(mut self, function_id: impl Into<String>) -> Self {
        self.function_id = Some(function_id.into());
        self
    }

    /// Attaches an error code
    pub fn with_error_code(mut self, code: u32) -> Self {
        self.error_code = Some(code);
        self
    }
}
