//! CLI command implementations
//!
//! Every command is a pure computation over its arguments and the engine
//! configuration; none of them touch a store.

use std::path::Path;
use std::sync::Arc;

use serde_json::{json, Value};

use crate::address::{FileId, RecordAddress};
use crate::config::EngineConfig;
use crate::filter::{FilterSpec, ParamValue, RawFilterParams};
use crate::observability::MetricsRegistry;
use crate::planner::{ExplainPlan, QueryPlanner};
use crate::revert::RevertEngine;
use crate::status::RecordStatus;

use super::args::{AddressAction, Cli, Command, PlanArgs};
use super::errors::{CliError, CliResult};
use super::io::{write_error, write_response};

/// Parse arguments, run the command and print its JSON response
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    let config = load_config(cli.config.as_deref())?;

    match run_command(&cli.command, &config) {
        Ok(data) => write_response(data),
        Err(e) => {
            write_error(e.code_str(), e.message())?;
            Err(e)
        }
    }
}

fn load_config(path: Option<&Path>) -> CliResult<EngineConfig> {
    match path {
        Some(path) => Ok(EngineConfig::load(path)?),
        None => Ok(EngineConfig::default()),
    }
}

/// Run a parsed command
pub fn run_command(command: &Command, config: &EngineConfig) -> CliResult<Value> {
    match command {
        Command::Address { action } => address(action),
        Command::Plan(args) => plan(args, config),
        Command::CheckRevert { from, to } => check_revert(from, to),
    }
}

fn address(action: &AddressAction) -> CliResult<Value> {
    match action {
        AddressAction::Encode { file_id, row } => {
            let address = RecordAddress::encode(*file_id, *row)?;
            Ok(json!({
                "file_id": file_id,
                "row_number": row,
                "address": address.get(),
            }))
        }
        AddressAction::Decode { address } => {
            let address = RecordAddress::from_raw(*address);
            if address.row_number() == 0 {
                return Err(CliError::invalid_input(format!(
                    "address {} has row number 0",
                    address.get()
                )));
            }
            Ok(json!({
                "address": address.get(),
                "file_id": address.file_id().get(),
                "row_number": address.row_number(),
            }))
        }
        AddressAction::Range { file_id } => {
            let range = RecordAddress::range_for(FileId::new(*file_id)?)?;
            Ok(json!({
                "file_id": file_id,
                "min": range.min,
                "max": range.max,
                "len": range.len(),
            }))
        }
    }
}

fn plan(args: &PlanArgs, config: &EngineConfig) -> CliResult<Value> {
    let raw = RawFilterParams {
        status: args.status.clone().map(ParamValue::from),
        search: args.search.clone(),
        recent_errors: args.recent_errors.clone(),
        start: args.start.clone().map(ParamValue::from),
        length: args.length.clone().map(ParamValue::from),
    };
    let spec = FilterSpec::from_params(&raw, &config.filter_limits())?;
    let plan = QueryPlanner::new().plan(FileId::new(args.file_id)?, &spec)?;
    let explain = ExplainPlan::from_plan(&plan);

    Ok(json!({
        "file_id": args.file_id,
        "paging_strategy": plan.paging_strategy.as_str(),
        "list": plan.list.to_documents(),
        "status_counts": plan.status_counts.to_documents(),
        "filtered_count": plan.filtered_count.to_documents(),
        "explain": explain,
    }))
}

fn check_revert(from: &str, to: &str) -> CliResult<Value> {
    let from = RecordStatus::parse_code(from)
        .map_err(|e| CliError::invalid_input(format!("--from: {}", e)))?;
    let to = RecordStatus::parse_code(to)
        .map_err(|e| CliError::invalid_input(format!("--to: {}", e)))?;

    let engine = RevertEngine::new(Arc::new(MetricsRegistry::new()));
    let verdict = match engine.check(Some(from), to) {
        Ok(file_status) => json!({
            "allowed": true,
            "file_status": file_status.as_str(),
        }),
        Err(e) => json!({
            "allowed": false,
            "reason": e.to_string(),
        }),
    };

    Ok(json!({
        "from": from.as_str(),
        "to": to.as_str(),
        "verdict": verdict,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan_args(file_id: i64) -> PlanArgs {
        PlanArgs {
            file_id,
            status: None,
            search: None,
            recent_errors: Vec::new(),
            start: None,
            length: None,
        }
    }

    #[test]
    fn test_address_encode() {
        let out = address(&AddressAction::Encode { file_id: 42, row: 7 }).unwrap();
        assert_eq!(out["address"], (42u64 << 32) + 7);
    }

    #[test]
    fn test_address_decode_rejects_row_zero() {
        let err = address(&AddressAction::Decode { address: 42u64 << 32 }).unwrap_err();
        assert_eq!(err.code_str(), "RECORDS_CLI_INVALID_INPUT");
    }

    #[test]
    fn test_address_range_overflow() {
        assert!(address(&AddressAction::Range {
            file_id: u32::MAX as i64
        })
        .is_err());
    }

    #[test]
    fn test_plan_output() {
        let mut args = plan_args(42);
        args.start = Some("5".into());
        let out = plan(&args, &EngineConfig::default()).unwrap();
        assert_eq!(out["paging_strategy"], "ADDRESS_OFFSET");
        assert!(out["list"].as_array().unwrap().len() >= 3);
        assert_eq!(out["explain"]["file_id"], 42);
    }

    #[test]
    fn test_plan_honours_configured_limit() {
        let mut args = plan_args(42);
        args.length = Some("500".into());
        let config = EngineConfig {
            max_page_length: 100,
            ..EngineConfig::default()
        };
        assert!(plan(&args, &config).is_err());
    }

    #[test]
    fn test_check_revert() {
        let ok = check_revert("69", "40").unwrap();
        assert_eq!(ok["verdict"]["allowed"], true);
        assert_eq!(ok["verdict"]["file_status"], "PARSED");

        let rejected = check_revert("49", "60").unwrap();
        assert_eq!(rejected["verdict"]["allowed"], false);

        assert!(check_revert("abc", "20").is_err());
    }
}
