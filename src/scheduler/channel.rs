//! Channel-backed scheduler
//!
//! Dispatch is a non-blocking send on an unbounded tokio channel; the
//! worker that owns the receiver decides and runs the next step.

use chrono::Utc;
use serde::Serialize;
use tokio::sync::mpsc;
use uuid::Uuid;

use super::errors::{SchedulerError, SchedulerResult};
use super::TaskScheduler;
use crate::address::FileId;
use crate::config::EngineConfig;

/// Task sender
pub type TaskSender = mpsc::UnboundedSender<ScheduledTask>;

/// Task receiver, owned by the worker
pub type TaskReceiver = mpsc::UnboundedReceiver<ScheduledTask>;

/// One queued "compute the next step for this file" request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduledTask {
    pub id: Uuid,
    /// Task name the worker dispatches on
    pub name: String,
    pub file_id: FileId,
    /// Unix seconds
    pub enqueued_at: i64,
}

/// Scheduler that enqueues tasks on an in-process channel
#[derive(Debug, Clone)]
pub struct ChannelScheduler {
    task_name: String,
    sender: TaskSender,
}

impl ChannelScheduler {
    /// Creates a scheduler and the receiver its worker drains
    pub fn new(task_name: impl Into<String>) -> (Self, TaskReceiver) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (
            Self {
                task_name: task_name.into(),
                sender,
            },
            receiver,
        )
    }

    /// Creates a scheduler that enqueues `config.next_step_task`
    pub fn from_config(config: &EngineConfig) -> (Self, TaskReceiver) {
        Self::new(config.next_step_task.clone())
    }

    pub fn task_name(&self) -> &str {
        &self.task_name
    }
}

impl TaskScheduler for ChannelScheduler {
    fn dispatch_next_step(&self, file_id: FileId) -> SchedulerResult<()> {
        let task = ScheduledTask {
            id: Uuid::new_v4(),
            name: self.task_name.clone(),
            file_id,
            enqueued_at: Utc::now().timestamp(),
        };
        self.sender
            .send(task)
            .map_err(|_| SchedulerError::QueueClosed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_dispatch_enqueues_task() {
        let (scheduler, mut receiver) = ChannelScheduler::new("rivoli.status_scheduler.next_step_id");

        scheduler.dispatch_next_step(FileId::from(42)).unwrap();
        scheduler.dispatch_next_step(FileId::from(43)).unwrap();

        let first = receiver.recv().await.unwrap();
        let second = receiver.recv().await.unwrap();
        assert_eq!(first.file_id, FileId::from(42));
        assert_eq!(first.name, "rivoli.status_scheduler.next_step_id");
        assert_eq!(second.file_id, FileId::from(43));
        assert_ne!(first.id, second.id);
    }

    #[test]
    fn test_task_name_comes_from_config() {
        let config = EngineConfig::from_json(r#"{"next_step_task": "rivoli.custom.next"}"#).unwrap();
        let (scheduler, mut receiver) = ChannelScheduler::from_config(&config);
        assert_eq!(scheduler.task_name(), "rivoli.custom.next");

        scheduler.dispatch_next_step(FileId::from(5)).unwrap();
        assert_eq!(receiver.try_recv().unwrap().name, "rivoli.custom.next");
    }

    #[test]
    fn test_dispatch_after_worker_gone() {
        let (scheduler, receiver) = ChannelScheduler::new("next");
        drop(receiver);

        assert_eq!(
            scheduler.dispatch_next_step(FileId::from(1)),
            Err(SchedulerError::QueueClosed)
        );
    }
}
