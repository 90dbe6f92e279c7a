//! rivoli-records - record addressing, query planning and status reverts
//! for the Rivoli file pipeline
//!
//! - `address`: file ids, row-ordered record addresses, per-file ranges
//! - `status`: record and file statuses, revert tables
//! - `filter`: validated filter and paging specs
//! - `planner`: filter specs compiled into store pipelines
//! - `revert`: administrative status rollback and reconciliation
//! - `records`: the service a route layer calls

pub mod address;
pub mod cli;
pub mod config;
pub mod filter;
pub mod model;
pub mod observability;
pub mod planner;
pub mod records;
pub mod revert;
pub mod scheduler;
pub mod status;
pub mod store;
