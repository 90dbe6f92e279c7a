//! Query planner
//!
//! Compiles a file id and a `FilterSpec` into stage pipelines.
//!
//! Stage order (strict):
//! 1. Address range of the file
//! 2. Status equality
//! 3. Recent-error function membership
//! 4. Search-field projection + text match
//! 5. Sort by address
//! 6. Paging: unfiltered pages fold `start` into the address lower bound,
//!    filtered pages use a store-side skip
//! 7. Limit
//!
//! Predicates come first and stay adjacent so stores can fuse them.

use serde::Serialize;

use super::stages::{Pipeline, PipelineKind, Stage};
use crate::address::{AddressRange, AddressResult, FileId, RecordAddress};
use crate::filter::FilterSpec;

/// How the list pipeline pages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PagingStrategy {
    /// `start` added to the address lower bound
    AddressOffset,
    /// Explicit skip stage
    StoreSkip,
}

impl PagingStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            PagingStrategy::AddressOffset => "ADDRESS_OFFSET",
            PagingStrategy::StoreSkip => "STORE_SKIP",
        }
    }
}

/// Everything needed to answer one list request (no runtime state)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordsPlan {
    pub file_id: FileId,
    pub paging_strategy: PagingStrategy,
    /// Bounded, ordered page of records
    pub list: Pipeline,
    /// Counts per status over every filter except the status filter.
    /// Never paged.
    pub status_counts: Pipeline,
    /// Size of the filtered subset. Never paged.
    pub filtered_count: Pipeline,
}

/// Stateless plan compiler
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryPlanner;

impl QueryPlanner {
    pub fn new() -> Self {
        Self
    }

    /// Compiles list and count pipelines.
    ///
    /// Same inputs, same plan. Fails only when the file id has no valid
    /// address range.
    pub fn plan(&self, file_id: FileId, spec: &FilterSpec) -> AddressResult<RecordsPlan> {
        let base = RecordAddress::range_for(file_id)?;
        let paging = spec.paging();

        let (list_range, paging_strategy) = if spec.is_filtered() {
            (base, PagingStrategy::StoreSkip)
        } else {
            // Unfiltered rows are dense in address order, so the offset is
            // arithmetic.
            (base.offset_start(paging.start()), PagingStrategy::AddressOffset)
        };

        let mut list = Self::predicate_stages(list_range, spec, true);
        list.push(Stage::SortByAddress);
        if paging_strategy == PagingStrategy::StoreSkip && paging.start() > 0 {
            list.push(Stage::Skip {
                count: paging.start(),
            });
        }
        list.push(Stage::Limit {
            count: paging.length(),
        });

        let mut status_counts = Self::predicate_stages(base, spec, false);
        status_counts.push(Stage::GroupCountByStatus);

        let mut filtered_count = Self::predicate_stages(base, spec, true);
        filtered_count.push(Stage::Count);

        Ok(RecordsPlan {
            file_id,
            paging_strategy,
            list: Pipeline::new(PipelineKind::List, list),
            status_counts: Pipeline::new(PipelineKind::StatusCounts, status_counts),
            filtered_count: Pipeline::new(PipelineKind::FilteredCount, filtered_count),
        })
    }

    /// Predicate-only pipeline over the whole file (paging ignored).
    /// Used as the match of batch updates.
    pub fn selection(&self, file_id: FileId, spec: &FilterSpec) -> AddressResult<Pipeline> {
        let base = RecordAddress::range_for(file_id)?;
        Ok(Pipeline::new(
            PipelineKind::Selection,
            Self::predicate_stages(base, spec, true),
        ))
    }

    fn predicate_stages(range: AddressRange, spec: &FilterSpec, with_status: bool) -> Vec<Stage> {
        let mut stages = vec![Stage::address_range(range)];

        if with_status {
            if let Some(status) = spec.status() {
                stages.push(Stage::MatchStatus { status });
            }
        }

        if let Some(ids) = spec.recent_error_function_ids() {
            stages.push(Stage::MatchRecentErrorFunctions {
                function_ids: ids.iter().cloned().collect(),
            });
        }

        if let Some(text) = spec.text() {
            stages.push(Stage::ProjectSearchFields);
            stages.push(Stage::MatchText {
                pattern: text.pattern().to_string(),
                case_insensitive: true,
            });
        }

        stages
    }
}
