//! Status registry
//!
//! The closed set of record and file statuses plus the revert tables that
//! decide which record statuses may be rolled back, to where, and what the
//! owning file's status becomes afterwards.

mod errors;
mod file_status;
mod record_status;
mod registry;

pub use errors::{StatusError, StatusResult};
pub use file_status::{FileStage, FileStatus};
pub use record_status::RecordStatus;
pub use registry::StatusRegistry;
