//! Scheduler errors

use thiserror::Error;

/// Result type for scheduler operations
pub type SchedulerResult<T> = Result<T, SchedulerError>;

/// Dispatch failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchedulerError {
    /// Receiving side of the queue is gone
    #[error("task queue closed")]
    QueueClosed,

    /// Scheduler refused the task
    #[error("task rejected: {0}")]
    Rejected(String),
}
