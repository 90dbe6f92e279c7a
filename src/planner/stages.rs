//! Pipeline stages
//!
//! A compiled query is an ordered list of stages. Stages are typed here and
//! rendered to store documents (aggregation-pipeline JSON) only at the edge,
//! by `Stage::to_document`.

use serde::Serialize;
use serde_json::{json, Value};

use crate::address::AddressRange;
use crate::status::RecordStatus;

/// Field the text projection writes its key/value pairs to
pub const SEARCH_FIELDS: &str = "_searchFields";

/// A single query/aggregation stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "stage", rename_all = "snake_case")]
pub enum Stage {
    /// Inclusive address bounds; always the first stage
    MatchAddressRange { min: u64, max: u64 },
    /// Status equality
    MatchStatus { status: RecordStatus },
    /// At least one recent error raised by one of these functions
    MatchRecentErrorFunctions { function_ids: Vec<String> },
    /// Flattens parsed and validated fields into searchable key/value pairs
    ProjectSearchFields,
    /// Pattern match against every projected field value and every recent
    /// error message. Requires `ProjectSearchFields` earlier in the pipeline.
    MatchText { pattern: String, case_insensitive: bool },
    /// Address ascending, i.e. row order
    SortByAddress,
    /// Store-side skip
    Skip { count: u64 },
    Limit { count: u64 },
    /// One `{status, count}` row per status present
    GroupCountByStatus,
    /// Single total count
    Count,
}

impl Stage {
    /// Address range predicate
    pub fn address_range(range: AddressRange) -> Self {
        Stage::MatchAddressRange {
            min: range.min,
            max: range.max,
        }
    }

    /// True for stages that only narrow the matched set
    pub fn is_predicate(&self) -> bool {
        matches!(
            self,
            Stage::MatchAddressRange { .. }
                | Stage::MatchStatus { .. }
                | Stage::MatchRecentErrorFunctions { .. }
                | Stage::ProjectSearchFields
                | Stage::MatchText { .. }
        )
    }

    /// Renders the stage as an aggregation-pipeline document
    pub fn to_document(&self) -> Value {
        match self {
            Stage::MatchAddressRange { min, max } => {
                json!({ "$match": { "_id": { "$gte": min, "$lte": max } } })
            }
            Stage::MatchStatus { status } => json!({ "$match": { "status": status.code() } }),
            Stage::MatchRecentErrorFunctions { function_ids } => json!({
                "$match": {
                    "recentErrors": { "$elemMatch": { "functionId": { "$in": function_ids } } }
                }
            }),
            Stage::ProjectSearchFields => json!({
                "$addFields": {
                    SEARCH_FIELDS: {
                        "$concatArrays": [
                            { "$objectToArray": { "$ifNull": ["$parsedFields", {}] } },
                            { "$objectToArray": { "$ifNull": ["$validatedFields", {}] } }
                        ]
                    }
                }
            }),
            Stage::MatchText {
                pattern,
                case_insensitive,
            } => {
                let options = if *case_insensitive { "i" } else { "" };
                let values = format!("{}.v", SEARCH_FIELDS);
                json!({
                    "$match": {
                        "$or": [
                            { values: { "$regex": pattern, "$options": options } },
                            { "recentErrors.message": { "$regex": pattern, "$options": options } }
                        ]
                    }
                })
            }
            Stage::SortByAddress => json!({ "$sort": { "_id": 1 } }),
            Stage::Skip { count } => json!({ "$skip": count }),
            Stage::Limit { count } => json!({ "$limit": count }),
            Stage::GroupCountByStatus => {
                json!({ "$group": { "_id": "$status", "count": { "$sum": 1 } } })
            }
            Stage::Count => json!({ "$count": "count" }),
        }
    }

    /// One-line description for explain output
    pub fn describe(&self) -> String {
        match self {
            Stage::MatchAddressRange { min, max } => format!("MATCH _id IN [{}, {}]", min, max),
            Stage::MatchStatus { status } => {
                format!("MATCH status = {} ({})", status, status.code())
            }
            Stage::MatchRecentErrorFunctions { function_ids } => {
                format!("MATCH recentErrors.functionId IN [{}]", function_ids.join(", "))
            }
            Stage::ProjectSearchFields => {
                format!("PROJECT {} <- parsedFields + validatedFields", SEARCH_FIELDS)
            }
            Stage::MatchText {
                pattern,
                case_insensitive,
            } => format!(
                "MATCH TEXT /{}/{} IN {}.v, recentErrors.message",
                pattern,
                if *case_insensitive { "i" } else { "" },
                SEARCH_FIELDS
            ),
            Stage::SortByAddress => "SORT _id ASC".to_string(),
            Stage::Skip { count } => format!("SKIP {}", count),
            Stage::Limit { count } => format!("LIMIT {}", count),
            Stage::GroupCountByStatus => "GROUP BY status COUNT".to_string(),
            Stage::Count => "COUNT".to_string(),
        }
    }
}

/// What a pipeline produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineKind {
    /// Ordered page of records
    List,
    /// Per-status counts
    StatusCounts,
    /// Total count of the filtered subset
    FilteredCount,
    /// Predicates only; the match of a batch update
    Selection,
}

/// Ordered stage list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Pipeline {
    kind: PipelineKind,
    stages: Vec<Stage>,
}

impl Pipeline {
    pub(crate) fn new(kind: PipelineKind, stages: Vec<Stage>) -> Self {
        Self { kind, stages }
    }

    pub fn kind(&self) -> PipelineKind {
        self.kind
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// Bounds of the leading address predicate
    pub fn address_range(&self) -> Option<AddressRange> {
        self.stages.iter().find_map(|stage| match stage {
            Stage::MatchAddressRange { min, max } => Some(AddressRange {
                min: *min,
                max: *max,
            }),
            _ => None,
        })
    }

    /// Store-side skip, if any
    pub fn skip(&self) -> Option<u64> {
        self.stages.iter().find_map(|stage| match stage {
            Stage::Skip { count } => Some(*count),
            _ => None,
        })
    }

    pub fn limit(&self) -> Option<u64> {
        self.stages.iter().find_map(|stage| match stage {
            Stage::Limit { count } => Some(*count),
            _ => None,
        })
    }

    /// Aggregation-pipeline documents, in order
    pub fn to_documents(&self) -> Vec<Value> {
        self.stages.iter().map(Stage::to_document).collect()
    }
}
