//! Revert transition tables
//!
//! Only the three downstream error statuses may be reverted, and only to a
//! stage that precedes them. Reverting to VALIDATED re-runs upload; it can
//! never skip a stage, so stage outputs stay consistent.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use super::file_status::FileStatus;
use super::record_status::RecordStatus;

static REGISTRY: OnceLock<StatusRegistry> = OnceLock::new();

/// Read-only lookup tables for revert legality and file status mapping
#[derive(Debug)]
pub struct StatusRegistry {
    revert_targets: BTreeMap<RecordStatus, Vec<RecordStatus>>,
    file_status_for: BTreeMap<RecordStatus, FileStatus>,
}

impl StatusRegistry {
    /// Process-wide registry, built on first use and never mutated
    pub fn global() -> &'static StatusRegistry {
        REGISTRY.get_or_init(StatusRegistry::build)
    }

    fn build() -> Self {
        let mut revert_targets = BTreeMap::new();
        revert_targets.insert(RecordStatus::ParseError, vec![RecordStatus::Loaded]);
        revert_targets.insert(
            RecordStatus::ValidationError,
            vec![RecordStatus::Loaded, RecordStatus::Parsed],
        );
        revert_targets.insert(
            RecordStatus::UploadError,
            vec![
                RecordStatus::Loaded,
                RecordStatus::Parsed,
                RecordStatus::Validated,
            ],
        );

        let mut file_status_for = BTreeMap::new();
        file_status_for.insert(RecordStatus::Loaded, FileStatus::Loaded);
        file_status_for.insert(RecordStatus::Parsed, FileStatus::Parsed);
        file_status_for.insert(RecordStatus::Validated, FileStatus::Validated);

        Self {
            revert_targets,
            file_status_for,
        }
    }

    /// True when records in `status` may be rolled back
    pub fn is_revertible(&self, status: RecordStatus) -> bool {
        self.revert_targets.contains_key(&status)
    }

    /// Ordered statuses a record in `status` may be rolled back to.
    /// Empty when the status is not revertible.
    pub fn revert_targets(&self, status: RecordStatus) -> &[RecordStatus] {
        self.revert_targets
            .get(&status)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// File status that results from reverting a batch to `target`.
    ///
    /// `None` means the target has no file-level counterpart; callers must
    /// treat that as an error rather than pick a default.
    pub fn file_status_for(&self, target: RecordStatus) -> Option<FileStatus> {
        self.file_status_for.get(&target).copied()
    }

    /// Statuses with a file-level counterpart, in pipeline order
    pub fn mapped_targets(&self) -> impl Iterator<Item = (RecordStatus, FileStatus)> + '_ {
        self.file_status_for.iter().map(|(r, f)| (*r, *f))
    }
}
