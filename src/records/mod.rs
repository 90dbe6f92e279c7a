//! Records service
//!
//! - `list_records`: one page plus per-status and filtered counts
//! - `revert_records`: administrative status rollback
//! - `approve_upload`: release a file held for upload approval
//! - `reconcile_file_status`: repair a file whose status lags its records

mod errors;
mod service;

pub use errors::{ServiceError, ServiceResult};
pub use service::{RecordsPage, RecordsService};
