//! Status reverts
//!
//! Administrative rollback of records (and so their file) to an earlier
//! pipeline stage, plus the reconciliation path for files whose status
//! lags their records.

mod engine;
mod errors;
mod lock;
mod reconcile;
mod request;

pub use engine::{RevertEngine, RevertOutcome};
pub use errors::{RevertError, RevertResult};
pub use lock::FileLockTable;
pub use reconcile::{ReconcileOutcome, Reconciler};
pub use request::RevertRequest;
