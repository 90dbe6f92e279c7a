//! File documents

use serde::{Deserialize, Serialize};

use super::log::LogEntry;
use crate::address::FileId;
use crate::status::FileStatus;

/// Success/error counts per pipeline stage
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FileStats {
    pub total_rows: u64,
    pub loaded_records_success: u64,
    pub loaded_records_error: u64,
    pub parsed_records_success: u64,
    pub parsed_records_error: u64,
    pub validated_records_success: u64,
    pub validated_records_error: u64,
    pub uploaded_records_success: u64,
    pub uploaded_records_error: u64,
}

/// A tracked input file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct File {
    pub id: FileId,
    pub status: FileStatus,
    #[serde(default)]
    pub stats: FileStats,
    #[serde(default)]
    pub log: Vec<LogEntry>,
}

impl File {
    /// Creates a file with empty stats and log
    pub fn new(id: FileId, status: FileStatus) -> Self {
        Self {
            id,
            status,
            stats: FileStats::default(),
            log: Vec::new(),
        }
    }
}
