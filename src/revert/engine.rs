//! Revert engine
//!
//! A revert is two store mutations applied in order:
//! 1. Batch update of the selected records (status, recentErrors,
//!    autoRetry, log, retryCount)
//! 2. Single update of the file (mapped status, summary log entry)
//!
//! They are not one transaction. If (2) does not apply after (1) committed,
//! the outcome is `PartialSuccess` and `Reconciler` can repair the file
//! later. The scheduler is only told about full successes.

use std::sync::Arc;

use serde::Serialize;

use super::errors::{RevertError, RevertResult};
use super::request::RevertRequest;
use crate::model::LogEntry;
use crate::observability::{log_event, Event, MetricsRegistry, ObservationScope};
use crate::planner::QueryPlanner;
use crate::scheduler::{notify_next_step, TaskScheduler};
use crate::status::{FileStatus, RecordStatus, StatusRegistry};
use crate::store::{FileUpdate, RecordBatchUpdate, RecordStore};

/// Result of a revert whose record mutation committed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RevertOutcome {
    /// Records and file both updated
    Success {
        modified: u64,
        new_file_status: FileStatus,
    },
    /// Records updated, file update failed or matched nothing
    PartialSuccess { modified: u64, reason: String },
}

impl RevertOutcome {
    /// Records whose status changed
    pub fn modified(&self) -> u64 {
        match self {
            RevertOutcome::Success { modified, .. } => *modified,
            RevertOutcome::PartialSuccess { modified, .. } => *modified,
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, RevertOutcome::Success { .. })
    }

    pub fn new_file_status(&self) -> Option<FileStatus> {
        match self {
            RevertOutcome::Success {
                new_file_status, ..
            } => Some(*new_file_status),
            RevertOutcome::PartialSuccess { .. } => None,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            RevertOutcome::Success { .. } => "SUCCESS",
            RevertOutcome::PartialSuccess { .. } => "PARTIAL_SUCCESS",
        }
    }
}

/// Validates and applies reverts
#[derive(Debug, Clone)]
pub struct RevertEngine {
    registry: &'static StatusRegistry,
    planner: QueryPlanner,
    metrics: Arc<MetricsRegistry>,
}

impl RevertEngine {
    pub fn new(metrics: Arc<MetricsRegistry>) -> Self {
        Self {
            registry: StatusRegistry::global(),
            planner: QueryPlanner::new(),
            metrics,
        }
    }

    /// Checks a `from -> to` transition and resolves the file status it
    /// implies.
    ///
    /// Checked in order, first failure wins:
    /// 1. `from` present and revertible, else `NotRevertible`
    /// 2. `to` strictly earlier than `from`, else `InvalidTarget`
    /// 3. `to` listed as a target of `from`, else `InvalidTarget`
    /// 4. `to` mapped to a file status, else `UnmappedFileStatus`
    pub fn check(&self, from: Option<RecordStatus>, to: RecordStatus) -> RevertResult<FileStatus> {
        let from = match from {
            Some(status) if self.registry.is_revertible(status) => status,
            status => return Err(RevertError::NotRevertible { status }),
        };

        if to >= from {
            return Err(RevertError::InvalidTarget {
                target: to.to_string(),
                reason: format!("must precede {}", from),
            });
        }

        if !self.registry.revert_targets(from).contains(&to) {
            return Err(RevertError::InvalidTarget {
                target: to.to_string(),
                reason: format!("not a revert target of {}", from),
            });
        }

        self.registry
            .file_status_for(to)
            .ok_or(RevertError::UnmappedFileStatus(to))
    }

    /// Applies a revert.
    ///
    /// Errors mean nothing was mutated (preconditions) or the record
    /// mutation itself failed (`Store`). Once records are updated the result
    /// is always `Ok`.
    pub fn revert<S: RecordStore + ?Sized>(
        &self,
        store: &S,
        scheduler: &dyn TaskScheduler,
        request: &RevertRequest,
    ) -> RevertResult<RevertOutcome> {
        let file = request.file_id.to_string();
        let from = request
            .filter
            .status()
            .map(|s| s.as_str())
            .unwrap_or("NONE");
        let to = request.to_status.as_str();

        log_event(
            Event::RevertRequested,
            &[("file_id", &file), ("from_status", from), ("to_status", to)],
        );

        let file_status = match self.check(request.filter.status(), request.to_status) {
            Ok(file_status) => file_status,
            Err(e) => {
                self.metrics.increment_reverts_rejected();
                log_event(
                    Event::RevertRejected,
                    &[("file_id", &file), ("reason", &e.to_string())],
                );
                return Err(e);
            }
        };

        let scope =
            ObservationScope::with_fields("REVERT", &[("file_id", &file), ("to_status", to)]);
        match self.apply(store, scheduler, request, file_status) {
            Ok(outcome) => {
                scope.complete_with_fields(&[
                    ("outcome", outcome.label()),
                    ("modified", &outcome.modified().to_string()),
                ]);
                Ok(outcome)
            }
            Err(e) => {
                scope.fail(&e.to_string());
                Err(e)
            }
        }
    }

    fn apply<S: RecordStore + ?Sized>(
        &self,
        store: &S,
        scheduler: &dyn TaskScheduler,
        request: &RevertRequest,
        file_status: FileStatus,
    ) -> RevertResult<RevertOutcome> {
        let file = request.file_id.to_string();
        let to = request.to_status;

        let update = RecordBatchUpdate {
            selection: self.planner.selection(request.file_id, &request.filter)?,
            set_status: to,
            clear_recent_errors: true,
            clear_auto_retry: true,
            append_log: LogEntry::info(format!("Reverted status to {}", to)),
            increment_retry_count: 1,
        };
        let modified = store.update_records(&update)?.modified;

        self.metrics.increment_reverts_applied();
        self.metrics.add_records_reverted(modified);
        log_event(
            Event::RecordsReverted,
            &[
                ("file_id", &file),
                ("modified", &modified.to_string()),
                ("to_status", to.as_str()),
            ],
        );

        let file_update = FileUpdate {
            file_id: request.file_id,
            expected_status: None,
            set_status: file_status,
            append_log: LogEntry::info(format!(
                "Reverted record status to {} on {} records",
                to, modified
            )),
        };

        let reason = match store.update_file(&file_update) {
            Ok(result) if result.matched > 0 => {
                log_event(
                    Event::FileStatusUpdated,
                    &[("file_id", &file), ("status", file_status.as_str())],
                );
                notify_next_step(scheduler, &self.metrics, request.file_id);
                return Ok(RevertOutcome::Success {
                    modified,
                    new_file_status: file_status,
                });
            }
            Ok(_) => format!("file {} not found", request.file_id),
            Err(e) => format!("file update failed: {}", e),
        };

        self.metrics.increment_partial_reverts();
        log_event(
            Event::RevertPartial,
            &[
                ("file_id", &file),
                ("modified", &modified.to_string()),
                ("reason", &reason),
            ],
        );
        Ok(RevertOutcome::PartialSuccess { modified, reason })
    }
}
