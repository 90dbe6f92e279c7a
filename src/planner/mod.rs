//! Query planner
//!
//! Produces deterministic stage pipelines for listing, counting and
//! selecting a file's records.
//!
//! # Paging
//!
//! Without a content filter, rows of a file occupy consecutive addresses,
//! so page `start` is reached by raising the address lower bound. With any
//! filter, matching rows are not evenly spaced and the store must skip.

mod explain;
mod planner;
mod stages;

pub use explain::ExplainPlan;
pub use planner::{PagingStrategy, QueryPlanner, RecordsPlan};
pub use stages::{Pipeline, PipelineKind, Stage, SEARCH_FIELDS};
