//! Revert Invariant Tests
//!
//! - Only the six legal (from, to) pairs are accepted
//! - Preconditions fail before any mutation
//! - Every reverted record: status set, recentErrors and autoRetry cleared,
//!   one log entry appended, retryCount + 1
//! - File status follows the target; the scheduler hears only about full
//!   successes
//! - A file update that does not apply is reported as PartialSuccess

use std::sync::{Arc, Mutex};
use std::thread;

use rivoli_records::address::{FileId, RecordAddress};
use rivoli_records::config::EngineConfig;
use rivoli_records::filter::RawFilterParams;
use rivoli_records::model::{File, LogEntry, Record};
use rivoli_records::observability::MetricsRegistry;
use rivoli_records::planner::Pipeline;
use rivoli_records::records::{RecordsService, ServiceError};
use rivoli_records::revert::{RevertError, RevertOutcome};
use rivoli_records::scheduler::{SchedulerError, SchedulerResult, TaskScheduler};
use rivoli_records::status::{FileStatus, RecordStatus};
use rivoli_records::store::{
    FileUpdate, MemoryStore, RecordBatchUpdate, RecordStore, StatusCounts, StoreError,
    StoreResult, UpdateResult,
};

// =============================================================================
// Helper Types
// =============================================================================

/// Scheduler that records every dispatch
#[derive(Default)]
struct RecordingScheduler {
    dispatched: Mutex<Vec<FileId>>,
    refuse: bool,
}

impl RecordingScheduler {
    fn refusing() -> Self {
        Self {
            refuse: true,
            ..Self::default()
        }
    }

    fn dispatched(&self) -> Vec<FileId> {
        self.dispatched.lock().unwrap().clone()
    }
}

impl TaskScheduler for RecordingScheduler {
    fn dispatch_next_step(&self, file_id: FileId) -> SchedulerResult<()> {
        self.dispatched.lock().unwrap().push(file_id);
        if self.refuse {
            Err(SchedulerError::Rejected("worker pool saturated".into()))
        } else {
            Ok(())
        }
    }
}

/// Memory store whose record or file updates can be made to fail
#[derive(Default)]
struct FlakyStore {
    inner: MemoryStore,
    fail_record_updates: bool,
    fail_file_updates: bool,
}

impl RecordStore for FlakyStore {
    fn find_records(&self, pipeline: &Pipeline) -> StoreResult<Vec<Record>> {
        self.inner.find_records(pipeline)
    }

    fn count_by_status(&self, pipeline: &Pipeline) -> StoreResult<StatusCounts> {
        self.inner.count_by_status(pipeline)
    }

    fn count_records(&self, pipeline: &Pipeline) -> StoreResult<u64> {
        self.inner.count_records(pipeline)
    }

    fn update_records(&self, update: &RecordBatchUpdate) -> StoreResult<UpdateResult> {
        if self.fail_record_updates {
            return Err(StoreError::Unavailable("primary stepped down".into()));
        }
        self.inner.update_records(update)
    }

    fn update_file(&self, update: &FileUpdate) -> StoreResult<UpdateResult> {
        if self.fail_file_updates {
            return Err(StoreError::Unavailable("connection reset".into()));
        }
        self.inner.update_file(update)
    }

    fn find_file(&self, file_id: FileId) -> StoreResult<Option<File>> {
        self.inner.find_file(file_id)
    }
}

struct Harness {
    store: Arc<FlakyStore>,
    scheduler: Arc<RecordingScheduler>,
    metrics: Arc<MetricsRegistry>,
    service: RecordsService<FlakyStore>,
}

// =============================================================================
// Helper Functions
// =============================================================================

const FILE: u32 = 42;
const ZIP_CHECK: &str = "b921aea76104d6682dc2c636";

fn address(row: i64) -> RecordAddress {
    RecordAddress::encode(FILE as i64, row).unwrap()
}

/// Rows 1-30 of file 42. Every third row failed validation, rows 10 and 20
/// failed upload, the rest validated. The file itself sits in
/// VALIDATE_ERROR.
fn seed(store: &MemoryStore) {
    for row in 1..=30 {
        let record = if row % 10 == 0 {
            Record::new(address(row), RecordStatus::UploadError)
                .with_recent_error(LogEntry::error("HTTP 503 from target"))
                .with_auto_retry()
        } else if row % 3 == 0 {
            Record::new(address(row), RecordStatus::ValidationError)
                .with_parsed_field("zip", if row % 2 == 0 { "00000" } else { "99999" })
                .with_recent_error(LogEntry::error("Zip code not found").with_function(ZIP_CHECK))
        } else {
            Record::new(address(row), RecordStatus::Validated)
        };
        store.insert_record(record).unwrap();
    }
    store
        .insert_file(File::new(FileId::from(FILE), FileStatus::ValidateError))
        .unwrap();
}

fn harness_with(store: FlakyStore, scheduler: RecordingScheduler, config: EngineConfig) -> Harness {
    seed(&store.inner);
    let store = Arc::new(store);
    let scheduler = Arc::new(scheduler);
    let metrics = Arc::new(MetricsRegistry::new());
    let service = RecordsService::new(
        Arc::clone(&store),
        Arc::clone(&scheduler) as Arc<dyn TaskScheduler>,
        Arc::clone(&metrics),
        config,
    );
    Harness {
        store,
        scheduler,
        metrics,
        service,
    }
}

fn harness() -> Harness {
    harness_with(
        FlakyStore::default(),
        RecordingScheduler::default(),
        EngineConfig::default(),
    )
}

fn file() -> FileId {
    FileId::from(FILE)
}

fn validation_errors() -> RawFilterParams {
    RawFilterParams::default().with_status("69")
}

fn record(h: &Harness, row: i64) -> Record {
    h.store.inner.record(address(row)).unwrap().unwrap()
}

fn stored_file(h: &Harness) -> File {
    h.store.inner.find_file(file()).unwrap().unwrap()
}

fn validation_error_rows() -> Vec<i64> {
    (1..=30).filter(|r| r % 3 == 0 && r % 10 != 0).collect()
}

// =============================================================================
// Legality Tests
// =============================================================================

/// Exactly the six downstream-error-to-earlier-stage pairs are accepted.
#[test]
fn test_revert_legality_matrix() {
    let legal = [
        ("49", "20"),
        ("69", "20"),
        ("69", "40"),
        ("89", "20"),
        ("89", "40"),
        ("89", "60"),
    ];

    for from in RecordStatus::ALL {
        for to in RecordStatus::ALL {
            let h = harness();
            let from_code = from.code().to_string();
            let to_code = to.code().to_string();
            let result = h.service.revert_records(
                file(),
                &RawFilterParams::default().with_status(from_code.as_str()),
                to_code.as_str(),
            );
            let expected = legal.contains(&(from_code.as_str(), to_code.as_str()));
            assert_eq!(result.is_ok(), expected, "{} -> {}", from, to);
        }
    }
}

/// VALIDATED is not a revert target of PARSE_ERROR.
#[test]
fn test_parse_error_to_validated_is_invalid_target() {
    let h = harness();
    let err = h
        .service
        .revert_records(file(), &RawFilterParams::default().with_status("49"), 60)
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Revert(RevertError::InvalidTarget { .. })
    ));
    assert_eq!(err.status_code(), 400);
}

#[test]
fn test_missing_status_filter_is_not_revertible() {
    let h = harness();
    let err = h
        .service
        .revert_records(file(), &RawFilterParams::default(), 20)
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Revert(RevertError::NotRevertible { status: None })
    ));
}

/// Rejected requests leave records, file and scheduler untouched.
#[test]
fn test_rejection_mutates_nothing() {
    let h = harness();
    let before: Vec<Record> = (1..=30).map(|r| record(&h, r)).collect();

    assert!(h
        .service
        .revert_records(file(), &validation_errors(), 80)
        .is_err());

    let after: Vec<Record> = (1..=30).map(|r| record(&h, r)).collect();
    assert_eq!(before, after);
    assert_eq!(stored_file(&h).status, FileStatus::ValidateError);
    assert!(h.scheduler.dispatched().is_empty());
    assert_eq!(h.metrics.snapshot().reverts_rejected, 1);
}

// =============================================================================
// Effect Tests
// =============================================================================

/// File 42, VALIDATION_ERROR -> LOADED.
#[test]
fn test_worked_example() {
    let h = harness();
    let outcome = h
        .service
        .revert_records(file(), &validation_errors(), "20")
        .unwrap();

    let expected_rows = validation_error_rows();
    assert_eq!(
        outcome,
        RevertOutcome::Success {
            modified: expected_rows.len() as u64,
            new_file_status: FileStatus::Loaded,
        }
    );

    for row in &expected_rows {
        let r = record(&h, *row);
        assert_eq!(r.status, RecordStatus::Loaded);
        assert_eq!(r.retry_count, 1);
        assert!(r.recent_errors.is_empty());
        assert!(!r.auto_retry);
        assert_eq!(r.log.len(), 1);
        assert_eq!(r.log[0].message, "Reverted status to LOADED");
    }

    let stored = stored_file(&h);
    assert_eq!(stored.status, FileStatus::Loaded);
    assert_eq!(
        stored.log.last().unwrap().message,
        format!("Reverted record status to LOADED on {} records", expected_rows.len())
    );
    assert_eq!(h.scheduler.dispatched(), vec![file()]);
}

/// Records outside the selection are untouched.
#[test]
fn test_unselected_records_untouched() {
    let h = harness();
    h.service
        .revert_records(file(), &validation_errors(), 40)
        .unwrap();

    let upload_error = record(&h, 10);
    assert_eq!(upload_error.status, RecordStatus::UploadError);
    assert_eq!(upload_error.retry_count, 0);
    assert!(upload_error.auto_retry);
    assert_eq!(upload_error.recent_errors.len(), 1);

    assert_eq!(record(&h, 1).status, RecordStatus::Validated);
}

/// Upload errors lose their auto-retry marker.
#[test]
fn test_upload_error_revert_clears_auto_retry() {
    let h = harness();
    let outcome = h
        .service
        .revert_records(file(), &RawFilterParams::default().with_status(89), 60)
        .unwrap();
    assert_eq!(outcome.modified(), 3);
    assert_eq!(outcome.new_file_status(), Some(FileStatus::Validated));

    for row in [10, 20, 30] {
        let r = record(&h, row);
        assert_eq!(r.status, RecordStatus::Validated);
        assert!(!r.auto_retry);
        assert!(r.recent_errors.is_empty());
    }
}

/// Paging never narrows a revert; content filters do.
#[test]
fn test_revert_ignores_paging_but_not_filters() {
    let h = harness();
    let raw = validation_errors().with_search("00000").with_paging(1, 1);
    let outcome = h.service.revert_records(file(), &raw, 20).unwrap();

    let zeros: Vec<i64> = validation_error_rows()
        .into_iter()
        .filter(|r| r % 2 == 0)
        .collect();
    assert_eq!(outcome.modified(), zeros.len() as u64);
    for row in validation_error_rows() {
        let expected = if row % 2 == 0 {
            RecordStatus::Loaded
        } else {
            RecordStatus::ValidationError
        };
        assert_eq!(record(&h, row).status, expected, "row {}", row);
    }
}

/// Each revert adds exactly one to retryCount, however many rows it hits.
#[test]
fn test_retry_count_increments_once_per_revert() {
    let h = harness();
    h.service
        .revert_records(file(), &validation_errors(), 40)
        .unwrap();
    let second = h
        .service
        .revert_records(
            file(),
            &RawFilterParams::default()
                .with_status(89)
                .with_search("HTTP 503"),
            40,
        )
        .unwrap();
    assert_eq!(second.modified(), 3);

    assert_eq!(record(&h, 3).retry_count, 1);
    assert_eq!(record(&h, 10).retry_count, 1);
    assert_eq!(record(&h, 1).retry_count, 0);
}

/// A revert that matches nothing still updates the file once.
#[test]
fn test_empty_selection_still_updates_file() {
    let h = harness();
    let outcome = h
        .service
        .revert_records(file(), &RawFilterParams::default().with_status(49), 20)
        .unwrap();

    assert_eq!(
        outcome,
        RevertOutcome::Success {
            modified: 0,
            new_file_status: FileStatus::Loaded
        }
    );
    assert_eq!(
        stored_file(&h).log.last().unwrap().message,
        "Reverted record status to LOADED on 0 records"
    );
}

// =============================================================================
// Partial Success Tests
// =============================================================================

#[test]
fn test_file_update_failure_is_partial_success() {
    let h = harness_with(
        FlakyStore {
            fail_file_updates: true,
            ..FlakyStore::default()
        },
        RecordingScheduler::default(),
        EngineConfig::default(),
    );

    let outcome = h
        .service
        .revert_records(file(), &validation_errors(), 20)
        .unwrap();

    match &outcome {
        RevertOutcome::PartialSuccess { modified, reason } => {
            assert_eq!(*modified, validation_error_rows().len() as u64);
            assert!(reason.contains("connection reset"));
        }
        other => panic!("expected partial success, got {:?}", other),
    }
    assert!(!outcome.is_complete());

    // Records committed, file lags, nobody was told
    assert_eq!(record(&h, 3).status, RecordStatus::Loaded);
    assert_eq!(stored_file(&h).status, FileStatus::ValidateError);
    assert!(h.scheduler.dispatched().is_empty());
    assert_eq!(h.metrics.snapshot().partial_reverts, 1);
}

#[test]
fn test_missing_file_is_partial_success() {
    let h = harness();
    let other = FileId::from(FILE + 1);
    h.store
        .inner
        .insert_record(
            Record::new(
                RecordAddress::for_row(other, 1).unwrap(),
                RecordStatus::ParseError,
            ),
        )
        .unwrap();

    let outcome = h
        .service
        .revert_records(other, &RawFilterParams::default().with_status(49), 20)
        .unwrap();
    assert!(matches!(
        outcome,
        RevertOutcome::PartialSuccess { modified: 1, .. }
    ));
}

#[test]
fn test_record_update_failure_propagates() {
    let h = harness_with(
        FlakyStore {
            fail_record_updates: true,
            ..FlakyStore::default()
        },
        RecordingScheduler::default(),
        EngineConfig::default(),
    );

    let err = h
        .service
        .revert_records(file(), &validation_errors(), 20)
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Revert(RevertError::Store(StoreError::Unavailable(_)))
    ));
    assert_eq!(err.status_code(), 500);
    assert_eq!(stored_file(&h).status, FileStatus::ValidateError);
    assert!(h.scheduler.dispatched().is_empty());
}

// =============================================================================
// Scheduler Tests
// =============================================================================

/// A refused dispatch never fails a committed revert.
#[test]
fn test_dispatch_failure_does_not_fail_revert() {
    let h = harness_with(
        FlakyStore::default(),
        RecordingScheduler::refusing(),
        EngineConfig::default(),
    );

    let outcome = h
        .service
        .revert_records(file(), &validation_errors(), 20)
        .unwrap();
    assert!(outcome.is_complete());
    assert_eq!(h.scheduler.dispatched(), vec![file()]);

    let snapshot = h.metrics.snapshot();
    assert_eq!(snapshot.dispatch_failures, 1);
    assert_eq!(snapshot.dispatches, 0);
    assert_eq!(snapshot.reverts_applied, 1);
}

// =============================================================================
// Concurrency Tests
// =============================================================================

/// Concurrent identical reverts of one file revert each record once.
#[test]
fn test_serialized_reverts_apply_once() {
    let h = Arc::new(harness());

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let h = Arc::clone(&h);
            thread::spawn(move || {
                h.service
                    .revert_records(file(), &validation_errors(), 20)
                    .unwrap()
                    .modified()
            })
        })
        .collect();

    let total: u64 = handles.into_iter().map(|t| t.join().unwrap()).sum();
    assert_eq!(total, validation_error_rows().len() as u64);
    for row in validation_error_rows() {
        assert_eq!(record(&h, row).retry_count, 1);
    }
}
