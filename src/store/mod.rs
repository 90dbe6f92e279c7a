//! Record/file store collaborator
//!
//! The engine only talks to storage through `RecordStore`. Each method is a
//! single store operation; per-document atomicity is the only guarantee.
//! A record batch update and the following file update are two separate
//! operations, never one transaction.

mod errors;
mod memory;
mod updates;

pub use errors::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use updates::{FileUpdate, RecordBatchUpdate, StatusCounts, UpdateResult};

use crate::address::FileId;
use crate::model::{File, Record};
use crate::planner::Pipeline;

/// Narrow store interface consumed by the engine
pub trait RecordStore: Send + Sync {
    /// Runs a list pipeline and returns records in pipeline order
    fn find_records(&self, pipeline: &Pipeline) -> StoreResult<Vec<Record>>;

    /// Runs a pipeline ending in a status grouping
    fn count_by_status(&self, pipeline: &Pipeline) -> StoreResult<StatusCounts>;

    /// Runs a pipeline ending in a total count
    fn count_records(&self, pipeline: &Pipeline) -> StoreResult<u64>;

    /// Applies a batch update to every record the selection matches.
    /// Document-store adapters check `RecordBatchUpdate::needs_id_resolution`
    /// and match on resolved `_id`s when it is set.
    fn update_records(&self, update: &RecordBatchUpdate) -> StoreResult<UpdateResult>;

    /// Applies a conditional single-file update
    fn update_file(&self, update: &FileUpdate) -> StoreResult<UpdateResult>;

    /// Fetches a file by id
    fn find_file(&self, file_id: FileId) -> StoreResult<Option<File>>;
}
