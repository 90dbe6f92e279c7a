//! Record documents

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::log::LogEntry;
use crate::address::RecordAddress;
use crate::status::RecordStatus;

/// One row of a file as it moves through the pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub id: RecordAddress,
    pub status: RecordStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record_type: Option<String>,
    #[serde(default)]
    pub raw_columns: Vec<String>,
    #[serde(default)]
    pub parsed_fields: BTreeMap<String, String>,
    #[serde(default)]
    pub validated_fields: BTreeMap<String, String>,
    #[serde(default)]
    pub recent_errors: Vec<LogEntry>,
    #[serde(default)]
    pub log: Vec<LogEntry>,
    /// Incremented only by reverts
    #[serde(default)]
    pub retry_count: u32,
    /// Set by the uploader when the failure may be retried automatically
    #[serde(default)]
    pub auto_retry: bool,
}

impl Record {
    /// Creates an empty record at the given address
    pub fn new(id: RecordAddress, status: RecordStatus) -> Self {
        Self {
            id,
            status,
            record_type: None,
            raw_columns: Vec::new(),
            parsed_fields: BTreeMap::new(),
            validated_fields: BTreeMap::new(),
            recent_errors: Vec::new(),
            log: Vec::new(),
            retry_count: 0,
            auto_retry: false,
        }
    }

    /// Adds a parsed field
    pub fn with_parsed_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.parsed_fields.insert(key.into(), value.into());
        self
    }

    /// Adds a validated field
    pub fn with_validated_field(
        mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.validated_fields.insert(key.into(), value.into());
        self
    }

    /// Adds a recent error
    pub fn with_recent_error(mut self, error: LogEntry) -> Self {
        self.recent_errors.push(error);
        self
    }

    /// Marks the record for automatic retry
    pub fn with_auto_retry(mut self) -> Self {
        self.auto_retry = true;
        self
    }

    /// 1-based row number, for display
    pub fn row_number(&self) -> u32 {
        self.id.row_number()
    }
}
