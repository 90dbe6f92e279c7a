//! File status reconciliation
//!
//! Repairs a file whose status lags its records, e.g. after a crash between
//! a revert's record and file mutations. The file is moved back to the
//! earliest revertible stage that still has records, and only when it
//! currently claims a later stage and is not being worked on.

use std::sync::Arc;

use serde::Serialize;

use super::errors::{RevertError, RevertResult};
use crate::address::FileId;
use crate::filter::{FilterSpec, RawFilterParams};
use crate::model::LogEntry;
use crate::observability::{log_event, Event, MetricsRegistry};
use crate::planner::QueryPlanner;
use crate::scheduler::{notify_next_step, TaskScheduler};
use crate::status::{FileStatus, RecordStatus, StatusRegistry};
use crate::store::{FileUpdate, RecordStore};

/// What reconciliation did
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReconcileOutcome {
    /// File status moved back
    Updated {
        from: FileStatus,
        to: FileStatus,
        record_status: RecordStatus,
        records: u64,
    },
    /// File left as is
    Unchanged { status: FileStatus, reason: String },
}

impl ReconcileOutcome {
    pub fn is_updated(&self) -> bool {
        matches!(self, ReconcileOutcome::Updated { .. })
    }
}

/// Brings file statuses in line with their records
#[derive(Debug, Clone)]
pub struct Reconciler {
    registry: &'static StatusRegistry,
    planner: QueryPlanner,
    metrics: Arc<MetricsRegistry>,
}

impl Reconciler {
    pub fn new(metrics: Arc<MetricsRegistry>) -> Self {
        Self {
            registry: StatusRegistry::global(),
            planner: QueryPlanner::new(),
            metrics,
        }
    }

    pub fn reconcile<S: RecordStore + ?Sized>(
        &self,
        store: &S,
        scheduler: &dyn TaskScheduler,
        file_id: FileId,
    ) -> RevertResult<ReconcileOutcome> {
        let file = store
            .find_file(file_id)?
            .ok_or(RevertError::FileNotFound(file_id))?;

        if file.status.is_working() {
            return Ok(unchanged(file.status, "file is being processed"));
        }

        let plan = self
            .planner
            .plan(file_id, &FilterSpec::parse(&RawFilterParams::default())?)?;
        let counts = store.count_by_status(&plan.status_counts)?;

        let earliest = self
            .registry
            .mapped_targets()
            .find_map(|(record_status, file_status)| {
                counts
                    .get(&record_status)
                    .filter(|n| **n > 0)
                    .map(|n| (record_status, file_status, *n))
            });

        let (record_status, target, records) = match earliest {
            Some(found) => found,
            None => return Ok(unchanged(file.status, "no records awaiting reprocessing")),
        };

        if file.status.stage() <= target.stage() {
            return Ok(unchanged(file.status, "file status already consistent"));
        }

        let update = FileUpdate {
            file_id,
            expected_status: Some(file.status),
            set_status: target,
            append_log: LogEntry::info(format!(
                "Reconciled file status to {} ({} records at {})",
                target, records, record_status
            )),
        };
        if store.update_file(&update)?.modified == 0 {
            return Ok(unchanged(file.status, "file status changed concurrently"));
        }

        self.metrics.increment_reconciliations();
        log_event(
            Event::ReconcileUpdated,
            &[
                ("file_id", &file_id.to_string()),
                ("from_status", file.status.as_str()),
                ("records", &records.to_string()),
                ("to_status", target.as_str()),
            ],
        );
        notify_next_step(scheduler, &self.metrics, file_id);

        Ok(ReconcileOutcome::Updated {
            from: file.status,
            to: target,
            record_status,
            records,
        })
    }
}

fn unchanged(status: FileStatus, reason: &str) -> ReconcileOutcome {
    ReconcileOutcome::Unchanged {
        status,
        reason: reason.to_string(),
    }
}
