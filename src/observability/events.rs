//! Observable events
//!
//! Events are explicit and typed; every log line the engine writes names
//! one of these.

use std::fmt;

use super::logger::Severity;

/// Observable events in the records engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Configuration
    /// Configuration loaded
    ConfigLoaded,

    // Listing
    /// List request compiled into pipelines
    ListPlanned,
    /// List request answered
    ListComplete,

    // Reverts
    /// Revert request received
    RevertRequested,
    /// Revert failed a precondition
    RevertRejected,
    /// Record batch update applied
    RecordsReverted,
    /// File status set after a record mutation
    FileStatusUpdated,
    /// Records reverted but the file update did not apply
    RevertPartial,

    // Scheduler
    /// Next pipeline step handed to the scheduler
    NextStepDispatched,
    /// Scheduler refused the dispatch
    NextStepDispatchFailed,

    // Approval
    /// File approved for upload
    UploadApproved,
    /// File was not awaiting approval
    UploadApprovalRejected,

    // Reconciliation
    /// Lagging file status brought in line with its records
    ReconcileUpdated,
}

impl Event {
    pub const ALL: [Event; 13] = [
        Event::ConfigLoaded,
        Event::ListPlanned,
        Event::ListComplete,
        Event::RevertRequested,
        Event::RevertRejected,
        Event::RecordsReverted,
        Event::FileStatusUpdated,
        Event::RevertPartial,
        Event::NextStepDispatched,
        Event::NextStepDispatchFailed,
        Event::UploadApproved,
        Event::UploadApprovalRejected,
        Event::ReconcileUpdated,
    ];

    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::ListPlanned => "LIST_PLANNED",
            Event::ListComplete => "LIST_COMPLETE",
            Event::RevertRequested => "REVERT_REQUESTED",
            Event::RevertRejected => "REVERT_REJECTED",
            Event::RecordsReverted => "RECORDS_REVERTED",
            Event::FileStatusUpdated => "FILE_STATUS_UPDATED",
            Event::RevertPartial => "REVERT_PARTIAL",
            Event::NextStepDispatched => "NEXT_STEP_DISPATCHED",
            Event::NextStepDispatchFailed => "NEXT_STEP_DISPATCH_FAILED",
            Event::UploadApproved => "UPLOAD_APPROVED",
            Event::UploadApprovalRejected => "UPLOAD_APPROVAL_REJECTED",
            Event::ReconcileUpdated => "RECONCILE_UPDATED",
        }
    }

    /// Severity the event is logged at
    pub fn severity(&self) -> Severity {
        match self {
            Event::ListPlanned => Severity::Trace,
            Event::RevertRejected
            | Event::RevertPartial
            | Event::NextStepDispatchFailed
            | Event::UploadApprovalRejected => Severity::Warn,
            _ => Severity::Info,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
