//! Records service
//!
//! The surface a route layer calls. Holds its collaborators explicitly:
//! a store, a scheduler, the metrics registry and the engine configuration.

use std::sync::Arc;

use serde::Serialize;

use super::errors::{ServiceError, ServiceResult};
use crate::address::FileId;
use crate::config::EngineConfig;
use crate::filter::{FilterSpec, ParamValue, RawFilterParams};
use crate::model::{LogEntry, Record};
use crate::observability::{log_event, Event, MetricsRegistry, Timer};
use crate::planner::{ExplainPlan, QueryPlanner};
use crate::revert::{
    FileLockTable, ReconcileOutcome, Reconciler, RevertEngine, RevertOutcome, RevertRequest,
};
use crate::scheduler::{notify_next_step, TaskScheduler};
use crate::status::FileStatus;
use crate::store::{FileUpdate, RecordStore, StatusCounts};

/// One page of records plus the counts a listing screen shows beside it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordsPage {
    pub file_id: FileId,
    pub records: Vec<Record>,
    /// Per-status counts over every filter but the status filter
    pub status_counts: StatusCounts,
    /// Size of the filtered subset, ignoring paging
    pub filtered_count: u64,
    pub start: u64,
    pub length: u64,
}

/// List, revert, approve and reconcile the records of tracked files
pub struct RecordsService<S: RecordStore> {
    store: Arc<S>,
    scheduler: Arc<dyn TaskScheduler>,
    metrics: Arc<MetricsRegistry>,
    config: EngineConfig,
    planner: QueryPlanner,
    engine: RevertEngine,
    reconciler: Reconciler,
    locks: FileLockTable,
}

impl<S: RecordStore> RecordsService<S> {
    pub fn new(
        store: Arc<S>,
        scheduler: Arc<dyn TaskScheduler>,
        metrics: Arc<MetricsRegistry>,
        config: EngineConfig,
    ) -> Self {
        Self {
            engine: RevertEngine::new(Arc::clone(&metrics)),
            reconciler: Reconciler::new(Arc::clone(&metrics)),
            planner: QueryPlanner::new(),
            locks: FileLockTable::new(),
            store,
            scheduler,
            metrics,
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn metrics(&self) -> &MetricsRegistry {
        &self.metrics
    }

    /// Validates raw parameters against the configured paging limits
    pub fn filter_spec(&self, raw: &RawFilterParams) -> ServiceResult<FilterSpec> {
        Ok(FilterSpec::from_params(raw, &self.config.filter_limits())?)
    }

    /// Lists one page of a file's records with per-status and filtered
    /// counts.
    pub fn list_records(
        &self,
        file_id: FileId,
        raw: &RawFilterParams,
    ) -> ServiceResult<RecordsPage> {
        let spec = self.filter_spec(raw)?;
        self.list_with_spec(file_id, &spec)
    }

    /// Same as `list_records` for an already validated filter
    pub fn list_with_spec(&self, file_id: FileId, spec: &FilterSpec) -> ServiceResult<RecordsPage> {
        let timer = Timer::new();
        self.metrics.increment_list_requests();

        let plan = self.planner.plan(file_id, spec)?;
        let file = file_id.to_string();
        log_event(
            Event::ListPlanned,
            &[
                ("file_id", &file),
                ("paging_strategy", plan.paging_strategy.as_str()),
            ],
        );

        let records = self.store.find_records(&plan.list)?;
        let status_counts = self.store.count_by_status(&plan.status_counts)?;
        let filtered_count = self.store.count_records(&plan.filtered_count)?;

        log_event(
            Event::ListComplete,
            &[
                ("elapsed_ms", &timer.elapsed_ms()),
                ("file_id", &file),
                ("filtered_count", &filtered_count.to_string()),
                ("returned", &records.len().to_string()),
            ],
        );

        Ok(RecordsPage {
            file_id,
            records,
            status_counts,
            filtered_count,
            start: spec.paging().start(),
            length: spec.paging().length(),
        })
    }

    /// Explains how a list request would be answered, without touching the
    /// store
    pub fn explain(&self, file_id: FileId, raw: &RawFilterParams) -> ServiceResult<ExplainPlan> {
        let spec = self.filter_spec(raw)?;
        let plan = self.planner.plan(file_id, &spec)?;
        Ok(ExplainPlan::from_plan(&plan))
    }

    /// Reverts the records selected by `raw` (which must filter on exactly
    /// one revertible status) to `to_status`.
    pub fn revert_records(
        &self,
        file_id: FileId,
        raw: &RawFilterParams,
        to_status: impl Into<ParamValue>,
    ) -> ServiceResult<RevertOutcome> {
        let request =
            RevertRequest::from_params(file_id, raw, &self.config.filter_limits(), to_status)?;
        self.revert(&request)
    }

    /// Applies a prepared revert request
    pub fn revert(&self, request: &RevertRequest) -> ServiceResult<RevertOutcome> {
        let run = || {
            self.engine
                .revert(self.store.as_ref(), self.scheduler.as_ref(), request)
        };

        let outcome = if self.config.serialize_reverts {
            self.locks.with_file_lock(request.file_id, run)?
        } else {
            run()?
        };
        Ok(outcome)
    }

    /// Moves a file from WAITING_APPROVAL_TO_UPLOAD to APPROVED_TO_UPLOAD
    /// and dispatches its next step.
    pub fn approve_upload(&self, file_id: FileId) -> ServiceResult<FileStatus> {
        let update = FileUpdate {
            file_id,
            expected_status: Some(FileStatus::WaitingApprovalToUpload),
            set_status: FileStatus::ApprovedToUpload,
            append_log: LogEntry::info("Approved for uploading"),
        };

        let file = file_id.to_string();
        if self.store.update_file(&update)?.modified == 1 {
            self.metrics.increment_approvals();
            log_event(Event::UploadApproved, &[("file_id", &file)]);
            notify_next_step(self.scheduler.as_ref(), &self.metrics, file_id);
            return Ok(FileStatus::ApprovedToUpload);
        }

        let current = self
            .store
            .find_file(file_id)?
            .ok_or(ServiceError::FileNotFound(file_id))?;
        log_event(
            Event::UploadApprovalRejected,
            &[("file_id", &file), ("status", current.status.as_str())],
        );
        Err(ServiceError::NotAwaitingApproval {
            file_id,
            status: current.status,
        })
    }

    /// Repairs a file whose status lags its records
    pub fn reconcile_file_status(&self, file_id: FileId) -> ServiceResult<ReconcileOutcome> {
        let run = || {
            self.reconciler
                .reconcile(self.store.as_ref(), self.scheduler.as_ref(), file_id)
        };

        let outcome = if self.config.serialize_reverts {
            self.locks.with_file_lock(file_id, run)?
        } else {
            run()?
        };
        Ok(outcome)
    }
}
