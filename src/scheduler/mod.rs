//! Task scheduler collaborator
//!
//! The engine only asks the scheduler to work out a file's next step. What
//! that step is, and when it runs, is the scheduler's business.

mod channel;
mod errors;

pub use channel::{ChannelScheduler, ScheduledTask, TaskReceiver, TaskSender};
pub use errors::{SchedulerError, SchedulerResult};

use crate::address::FileId;
use crate::observability::{log_event, Event, MetricsRegistry};

/// Fire-and-forget next-step dispatch
pub trait TaskScheduler: Send + Sync {
    /// Enqueues next-step computation for a file. Must not block.
    fn dispatch_next_step(&self, file_id: FileId) -> SchedulerResult<()>;
}

/// Dispatches the next step after a committed status change.
///
/// A refused dispatch is logged and counted but never surfaces as an error:
/// the mutation it follows has already committed. Returns whether the
/// scheduler accepted the task.
pub fn notify_next_step(
    scheduler: &dyn TaskScheduler,
    metrics: &MetricsRegistry,
    file_id: FileId,
) -> bool {
    let file = file_id.to_string();
    match scheduler.dispatch_next_step(file_id) {
        Ok(()) => {
            metrics.increment_dispatches();
            log_event(Event::NextStepDispatched, &[("file_id", &file)]);
            true
        }
        Err(e) => {
            metrics.increment_dispatch_failures();
            log_event(
                Event::NextStepDispatchFailed,
                &[("file_id", &file), ("reason", &e.to_string())],
            );
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Refusing;

    impl TaskScheduler for Refusing {
        fn dispatch_next_step(&self, _file_id: FileId) -> SchedulerResult<()> {
            Err(SchedulerError::Rejected("broker down".into()))
        }
    }

    #[test]
    fn test_notify_counts_success() {
        let metrics = MetricsRegistry::new();
        let (scheduler, _receiver) = ChannelScheduler::new("next");

        assert!(notify_next_step(&scheduler, &metrics, FileId::from(7)));
        assert_eq!(metrics.snapshot().dispatches, 1);
    }

    #[test]
    fn test_notify_swallows_refusal() {
        let metrics = MetricsRegistry::new();

        assert!(!notify_next_step(&Refusing, &metrics, FileId::from(7)));
        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.dispatches, 0);
        assert_eq!(snapshot.dispatch_failures, 1);
    }
}
