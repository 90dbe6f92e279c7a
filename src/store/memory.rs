//! In-memory store
//!
//! Evaluates pipelines stage by stage, in order, exactly as a document
//! store would. Used by tests and by embedders that keep records in
//! process.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, RwLock};

use regex::{Regex, RegexBuilder};

use super::errors::{StoreError, StoreResult};
use super::updates::{FileUpdate, RecordBatchUpdate, StatusCounts, UpdateResult};
use super::RecordStore;
use crate::address::{FileId, RecordAddress};
use crate::model::{File, Record};
use crate::planner::{Pipeline, Stage};

/// Thread-safe in-memory record and file store
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    records: Arc<RwLock<BTreeMap<RecordAddress, Record>>>,
    files: Arc<RwLock<BTreeMap<FileId, File>>>,
}

/// A record moving through the pipeline, with its projected search fields
struct Candidate<'a> {
    record: &'a Record,
    search_fields: Option<Vec<&'a str>>,
}

enum Output<'a> {
    Records(Vec<Candidate<'a>>),
    StatusCounts(StatusCounts),
    Count(u64),
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a record
    pub fn insert_record(&self, record: Record) -> StoreResult<()> {
        let mut records = self.records.write().map_err(|_| StoreError::Poisoned)?;
        records.insert(record.id, record);
        Ok(())
    }

    /// Inserts or replaces many records
    pub fn insert_records(&self, batch: impl IntoIterator<Item = Record>) -> StoreResult<()> {
        let mut records = self.records.write().map_err(|_| StoreError::Poisoned)?;
        for record in batch {
            records.insert(record.id, record);
        }
        Ok(())
    }

    /// Inserts or replaces a file
    pub fn insert_file(&self, file: File) -> StoreResult<()> {
        let mut files = self.files.write().map_err(|_| StoreError::Poisoned)?;
        files.insert(file.id, file);
        Ok(())
    }

    /// Fetches a record by address
    pub fn record(&self, address: RecordAddress) -> StoreResult<Option<Record>> {
        let records = self.records.read().map_err(|_| StoreError::Poisoned)?;
        Ok(records.get(&address).cloned())
    }

    /// Total records held
    pub fn len(&self) -> StoreResult<usize> {
        let records = self.records.read().map_err(|_| StoreError::Poisoned)?;
        Ok(records.len())
    }

    pub fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.len()? == 0)
    }

    fn evaluate<'a>(
        records: &'a BTreeMap<RecordAddress, Record>,
        pipeline: &Pipeline,
    ) -> StoreResult<Output<'a>> {
        let stages = pipeline.stages();

        // The leading address predicate doubles as the scan range
        let mut candidates: Vec<Candidate<'a>> = match stages.first() {
            Some(Stage::MatchAddressRange { min, max }) if min > max => Vec::new(),
            Some(Stage::MatchAddressRange { min, max }) => records
                .range(RecordAddress::from_raw(*min)..=RecordAddress::from_raw(*max))
                .map(|(_, record)| Candidate::new(record))
                .collect(),
            _ => records.values().map(Candidate::new).collect(),
        };

        for (i, stage) in stages.iter().enumerate() {
            let is_last = i + 1 == stages.len();
            match stage {
                Stage::MatchAddressRange { min, max } => {
                    candidates.retain(|c| c.record.id.get() >= *min && c.record.id.get() <= *max);
                }
                Stage::MatchStatus { status } => {
                    candidates.retain(|c| c.record.status == *status);
                }
                Stage::MatchRecentErrorFunctions { function_ids } => {
                    let ids: BTreeSet<String> =
                        function_ids.iter().map(|id| id.to_ascii_lowercase()).collect();
                    candidates.retain(|c| {
                        c.record.recent_errors.iter().any(|e| {
                            e.function_id
                                .as_deref()
                                .map(|id| ids.contains(&id.to_ascii_lowercase()))
                                .unwrap_or(false)
                        })
                    });
                }
                Stage::ProjectSearchFields => {
                    for candidate in candidates.iter_mut() {
                        candidate.project();
                    }
                }
                Stage::MatchText {
                    pattern,
                    case_insensitive,
                } => {
                    let regex = compile(pattern, *case_insensitive)?;
                    let mut kept = Vec::with_capacity(candidates.len());
                    for candidate in candidates {
                        if candidate.matches_text(&regex)? {
                            kept.push(candidate);
                        }
                    }
                    candidates = kept;
                }
                Stage::SortByAddress => {
                    candidates.sort_by_key(|c| c.record.id);
                }
                Stage::Skip { count } => {
                    let n = usize::try_from(*count).unwrap_or(usize::MAX).min(candidates.len());
                    candidates.drain(..n);
                }
                Stage::Limit { count } => {
                    candidates.truncate(usize::try_from(*count).unwrap_or(usize::MAX));
                }
                Stage::GroupCountByStatus => {
                    ensure_terminal(stage, is_last)?;
                    let mut counts = StatusCounts::new();
                    for candidate in &candidates {
                        *counts.entry(candidate.record.status).or_insert(0) += 1;
                    }
                    return Ok(Output::StatusCounts(counts));
                }
                Stage::Count => {
                    ensure_terminal(stage, is_last)?;
                    return Ok(Output::Count(candidates.len() as u64));
                }
            }
        }

        Ok(Output::Records(candidates))
    }
}

impl<'a> Candidate<'a> {
    fn new(record: &'a Record) -> Self {
        Self {
            record,
            search_fields: None,
        }
    }

    fn project(&mut self) {
        let values = self
            .record
            .parsed_fields
            .values()
            .chain(self.record.validated_fields.values())
            .map(String::as_str)
            .collect();
        self.search_fields = Some(values);
    }

    fn matches_text(&self, regex: &Regex) -> StoreResult<bool> {
        let fields = self.search_fields.as_ref().ok_or_else(|| {
            StoreError::InvalidPipeline("text match requires a preceding search-field projection".into())
        })?;
        Ok(fields.iter().any(|v| regex.is_match(v))
            || self
                .record
                .recent_errors
                .iter()
                .any(|e| regex.is_match(&e.message)))
    }
}

fn compile(pattern: &str, case_insensitive: bool) -> StoreResult<Regex> {
    RegexBuilder::new(pattern)
        .case_insensitive(case_insensitive)
        .build()
        .map_err(|e| StoreError::InvalidPipeline(format!("bad text pattern: {}", e)))
}

fn ensure_terminal(stage: &Stage, is_last: bool) -> StoreResult<()> {
    if is_last {
        Ok(())
    } else {
        Err(StoreError::InvalidPipeline(format!(
            "'{}' must be the last stage",
            stage.describe()
        )))
    }
}

impl RecordStore for MemoryStore {
    fn find_records(&self, pipeline: &Pipeline) -> StoreResult<Vec<Record>> {
        let records = self.records.read().map_err(|_| StoreError::Poisoned)?;
        match Self::evaluate(&records, pipeline)? {
            Output::Records(candidates) => {
                Ok(candidates.into_iter().map(|c| c.record.clone()).collect())
            }
            _ => Err(StoreError::InvalidPipeline(
                "pipeline does not produce records".into(),
            )),
        }
    }

    fn count_by_status(&self, pipeline: &Pipeline) -> StoreResult<StatusCounts> {
        let records = self.records.read().map_err(|_| StoreError::Poisoned)?;
        match Self::evaluate(&records, pipeline)? {
            Output::StatusCounts(counts) => Ok(counts),
            _ => Err(StoreError::InvalidPipeline(
                "pipeline does not group by status".into(),
            )),
        }
    }

    fn count_records(&self, pipeline: &Pipeline) -> StoreResult<u64> {
        let records = self.records.read().map_err(|_| StoreError::Poisoned)?;
        match Self::evaluate(&records, pipeline)? {
            Output::Count(count) => Ok(count),
            _ => Err(StoreError::InvalidPipeline(
                "pipeline does not produce a count".into(),
            )),
        }
    }

    fn update_records(&self, update: &RecordBatchUpdate) -> StoreResult<UpdateResult> {
        if !update.selection.stages().iter().all(Stage::is_predicate) {
            return Err(StoreError::InvalidPipeline(
                "update selection may only contain predicates".into(),
            ));
        }

        let mut records = self.records.write().map_err(|_| StoreError::Poisoned)?;
        let selected: Vec<RecordAddress> = match Self::evaluate(&records, &update.selection)? {
            Output::Records(candidates) => candidates.iter().map(|c| c.record.id).collect(),
            _ => {
                return Err(StoreError::InvalidPipeline(
                    "update selection does not produce records".into(),
                ))
            }
        };

        let mut result = UpdateResult::default();
        for address in selected {
            if let Some(record) = records.get_mut(&address) {
                result.matched += 1;
                record.status = update.set_status;
                if update.clear_recent_errors {
                    record.recent_errors.clear();
                }
                if update.clear_auto_retry {
                    record.auto_retry = false;
                }
                record.log.push(update.append_log.clone());
                record.retry_count = record
                    .retry_count
                    .saturating_add(update.increment_retry_count);
                result.modified += 1;
            }
        }

        Ok(result)
    }

    fn update_file(&self, update: &FileUpdate) -> StoreResult<UpdateResult> {
        let mut files = self.files.write().map_err(|_| StoreError::Poisoned)?;
        let file = match files.get_mut(&update.file_id) {
            Some(file) => file,
            None => return Ok(UpdateResult::default()),
        };

        if let Some(expected) = update.expected_status {
            if file.status != expected {
                return Ok(UpdateResult::default());
            }
        }

        file.status = update.set_status;
        file.log.push(update.append_log.clone());
        Ok(UpdateResult {
            matched: 1,
            modified: 1,
        })
    }

    fn find_file(&self, file_id: FileId) -> StoreResult<Option<File>> {
        let files = self.files.read().map_err(|_| StoreError::Poisoned)?;
        Ok(files.get(&file_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{FilterSpec, RawFilterParams};
    use crate::model::LogEntry;
    use crate::planner::QueryPlanner;
    use crate::status::{FileStatus, RecordStatus};

    const FUNCTION_ID: &str = "b921aea76104d6682dc2c636";

    fn address(file: i64, row: i64) -> RecordAddress {
        RecordAddress::encode(file, row).unwrap()
    }

    fn seeded() -> MemoryStore {
        let store = MemoryStore::new();
        for row in 1..=20 {
            let status = if row % 4 == 0 {
                RecordStatus::ValidationError
            } else {
                RecordStatus::Validated
            };
            let mut record = Record::new(address(5, row), status)
                .with_parsed_field("city", format!("City {}", row));
            if status == RecordStatus::ValidationError {
                record = record.with_recent_error(
                    LogEntry::error("Zip code out of range").with_function(FUNCTION_ID),
                );
            }
            store.insert_record(record).unwrap();
        }
        // Neighbouring file must never leak into results
        store
            .insert_record(Record::new(address(6, 1), RecordStatus::ValidationError))
            .unwrap();
        store
    }

    fn plan(raw: RawFilterParams) -> crate::planner::RecordsPlan {
        QueryPlanner::new()
            .plan(FileId::from(5), &FilterSpec::parse(&raw).unwrap())
            .unwrap()
    }

    #[test]
    fn test_unfiltered_page() {
        let store = seeded();
        let page = store
            .find_records(&plan(RawFilterParams::default().with_paging(5, 3)).list)
            .unwrap();
        let rows: Vec<u32> = page.iter().map(Record::row_number).collect();
        assert_eq!(rows, vec![6, 7, 8]);
    }

    #[test]
    fn test_filtered_page_uses_skip() {
        let store = seeded();
        let page = store
            .find_records(&plan(RawFilterParams::default().with_status("69").with_paging(1, 2)).list)
            .unwrap();
        let rows: Vec<u32> = page.iter().map(Record::row_number).collect();
        assert_eq!(rows, vec![8, 12]);
    }

    #[test]
    fn test_start_past_end_is_empty() {
        let store = seeded();
        let page = store
            .find_records(&plan(RawFilterParams::default().with_paging(500, 10)).list)
            .unwrap();
        assert!(page.is_empty());
    }

    #[test]
    fn test_text_match_is_literal_and_case_insensitive() {
        let store = seeded();
        store
            .insert_record(Record::new(address(5, 21), RecordStatus::Parsed).with_parsed_field("note", "a.c"))
            .unwrap();
        store
            .insert_record(Record::new(address(5, 22), RecordStatus::Parsed).with_parsed_field("note", "abc"))
            .unwrap();

        let page = store
            .find_records(&plan(RawFilterParams::default().with_search("A.C")).list)
            .unwrap();
        let rows: Vec<u32> = page.iter().map(Record::row_number).collect();
        assert_eq!(rows, vec![21]);
    }

    #[test]
    fn test_text_match_keeps_leading_space() {
        let store = seeded();
        let page = store
            .find_records(&plan(RawFilterParams::default().with_search(" 2")).list)
            .unwrap();
        let rows: Vec<u32> = page.iter().map(Record::row_number).collect();
        // "City 12" contains "2" but not " 2"
        assert_eq!(rows, vec![2, 20]);
    }

    #[test]
    fn test_text_matches_recent_error_messages() {
        let store = seeded();
        let counts = store
            .count_records(&plan(RawFilterParams::default().with_search("zip CODE")).filtered_count)
            .unwrap();
        assert_eq!(counts, 5);
    }

    #[test]
    fn test_recent_error_membership() {
        let store = seeded();
        let count = store
            .count_records(
                &plan(RawFilterParams::default().with_recent_error(FUNCTION_ID)).filtered_count,
            )
            .unwrap();
        assert_eq!(count, 5);
    }

    #[test]
    fn test_status_counts() {
        let store = seeded();
        let counts = store
            .count_by_status(&plan(RawFilterParams::default().with_status("69")).status_counts)
            .unwrap();
        assert_eq!(counts.get(&RecordStatus::Validated), Some(&15));
        assert_eq!(counts.get(&RecordStatus::ValidationError), Some(&5));
    }

    #[test]
    fn test_text_without_projection_is_rejected() {
        let store = seeded();
        let pipeline = Pipeline::new(
            crate::planner::PipelineKind::List,
            vec![Stage::MatchText {
                pattern: "x".into(),
                case_insensitive: true,
            }],
        );
        assert!(matches!(
            store.find_records(&pipeline),
            Err(StoreError::InvalidPipeline(_))
        ));
    }

    #[test]
    fn test_wrong_output_kind_is_rejected() {
        let store = seeded();
        let p = plan(RawFilterParams::default());
        assert!(store.count_records(&p.list).is_err());
        assert!(store.find_records(&p.status_counts).is_err());
    }

    #[test]
    fn test_conditional_file_update() {
        let store = MemoryStore::new();
        store
            .insert_file(File::new(FileId::from(1), FileStatus::Validated))
            .unwrap();

        let update = FileUpdate {
            file_id: FileId::from(1),
            expected_status: Some(FileStatus::WaitingApprovalToUpload),
            set_status: FileStatus::ApprovedToUpload,
            append_log: LogEntry::info("Approved for uploading"),
        };
        assert_eq!(store.update_file(&update).unwrap().modified, 0);

        let update = FileUpdate {
            expected_status: None,
            ..update
        };
        assert_eq!(store.update_file(&update).unwrap().modified, 1);
        let file = store.find_file(FileId::from(1)).unwrap().unwrap();
        assert_eq!(file.status, FileStatus::ApprovedToUpload);
        assert_eq!(file.log.len(), 1);
    }
}
