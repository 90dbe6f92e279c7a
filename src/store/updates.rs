//! Mutation descriptions handed to the store

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{json, Value};

use crate::address::FileId;
use crate::model::LogEntry;
use crate::planner::{Pipeline, Stage};
use crate::status::{FileStatus, RecordStatus};

/// Per-status record counts
pub type StatusCounts = BTreeMap<RecordStatus, u64>;

/// Matched and modified document counts reported by an update
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UpdateResult {
    pub matched: u64,
    pub modified: u64,
}

/// Multi-document update over the records selected by a pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordBatchUpdate {
    /// Predicate-only pipeline. A selection with a text match projects
    /// `$addFields`, which an update-many filter cannot express; adapters
    /// resolve such selections to record ids first (see
    /// `needs_id_resolution`).
    pub selection: Pipeline,
    pub set_status: RecordStatus,
    /// Unset `recentErrors`
    pub clear_recent_errors: bool,
    /// Unset `autoRetry`
    pub clear_auto_retry: bool,
    pub append_log: LogEntry,
    pub increment_retry_count: u32,
}

impl RecordBatchUpdate {
    /// True when the selection cannot be used directly as an update filter
    pub fn needs_id_resolution(&self) -> bool {
        self.selection
            .stages()
            .iter()
            .any(|stage| matches!(stage, Stage::ProjectSearchFields | Stage::MatchText { .. }))
    }

    /// Update operators in store document form
    pub fn to_document(&self) -> Value {
        let mut unset = serde_json::Map::new();
        if self.clear_recent_errors {
            unset.insert("recentErrors".to_string(), json!(""));
        }
        if self.clear_auto_retry {
            unset.insert("autoRetry".to_string(), json!(""));
        }

        json!({
            "$set": { "status": self.set_status.code() },
            "$unset": unset,
            "$push": { "log": self.append_log },
            "$inc": { "retryCount": self.increment_retry_count },
        })
    }
}

/// Single-document conditional update of a file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileUpdate {
    pub file_id: FileId,
    /// Only apply when the file currently has this status
    pub expected_status: Option<FileStatus>,
    pub set_status: FileStatus,
    pub append_log: LogEntry,
}

impl FileUpdate {
    /// Match part in store document form
    pub fn filter_document(&self) -> Value {
        match self.expected_status {
            Some(expected) => json!({ "_id": self.file_id, "status": expected.code() }),
            None => json!({ "_id": self.file_id }),
        }
    }

    /// Update operators in store document form
    pub fn update_document(&self) -> Value {
        json!({
            "$set": { "status": self.set_status.code() },
            "$push": { "log": self.append_log },
        })
    }
}
