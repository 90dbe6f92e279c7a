//! Explain output for compiled plans
//!
//! Deterministic, human-readable, one line per stage.

use std::fmt;

use serde::Serialize;

use super::planner::RecordsPlan;
use super::stages::Pipeline;

/// Explain plan output
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExplainPlan {
    pub file_id: u32,
    pub paging_strategy: String,
    pub list: Vec<String>,
    pub status_counts: Vec<String>,
    pub filtered_count: Vec<String>,
}

impl ExplainPlan {
    /// Creates an explain plan from a compiled plan
    pub fn from_plan(plan: &RecordsPlan) -> Self {
        Self {
            file_id: plan.file_id.get(),
            paging_strategy: plan.paging_strategy.as_str().to_string(),
            list: describe(&plan.list),
            status_counts: describe(&plan.status_counts),
            filtered_count: describe(&plan.filtered_count),
        }
    }
}

fn describe(pipeline: &Pipeline) -> Vec<String> {
    pipeline.stages().iter().map(|s| s.describe()).collect()
}

impl fmt::Display for ExplainPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "file {} ({})", self.file_id, self.paging_strategy)?;
        for (title, lines) in [
            ("list", &self.list),
            ("status_counts", &self.status_counts),
            ("filtered_count", &self.filtered_count),
        ] {
            writeln!(f, "{}:", title)?;
            for (i, line) in lines.iter().enumerate() {
                writeln!(f, "  {}. {}", i + 1, line)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::FileId;
    use crate::filter::{FilterSpec, RawFilterParams};
    use crate::planner::QueryPlanner;

    #[test]
    fn test_explain_filtered_plan() {
        let spec = FilterSpec::parse(
            &RawFilterParams::default()
                .with_status("69")
                .with_paging(10, 10),
        )
        .unwrap();
        let plan = QueryPlanner::new().plan(FileId::from(1), &spec).unwrap();
        let explain = ExplainPlan::from_plan(&plan);

        assert_eq!(explain.paging_strategy, "STORE_SKIP");
        assert_eq!(explain.list[1], "MATCH status = VALIDATION_ERROR (69)");
        assert_eq!(explain.list[3], "SKIP 10");
        assert_eq!(explain.status_counts.last().unwrap(), "GROUP BY status COUNT");

        let text = explain.to_string();
        assert!(text.starts_with("file 1 (STORE_SKIP)"));
        assert!(text.contains("  5. LIMIT 10"));
    }
}
