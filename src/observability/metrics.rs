//! Metrics registry
//!
//! - Counters only
//! - Monotonic increase
//! - Reset only on process start

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Operational counters for the records engine
///
/// All counters use Relaxed atomics; values are exact once all writers
/// have finished.
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    list_requests: AtomicU64,
    reverts_applied: AtomicU64,
    reverts_rejected: AtomicU64,
    records_reverted: AtomicU64,
    partial_reverts: AtomicU64,
    dispatches: AtomicU64,
    dispatch_failures: AtomicU64,
    approvals: AtomicU64,
    reconciliations: AtomicU64,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    // Listing

    pub fn increment_list_requests(&self) {
        self.list_requests.fetch_add(1, Ordering::Relaxed);
    }

    // Reverts

    /// Counts a revert whose record mutation committed
    pub fn increment_reverts_applied(&self) {
        self.reverts_applied.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_reverts_rejected(&self) {
        self.reverts_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_records_reverted(&self, count: u64) {
        self.records_reverted.fetch_add(count, Ordering::Relaxed);
    }

    pub fn increment_partial_reverts(&self) {
        self.partial_reverts.fetch_add(1, Ordering::Relaxed);
    }

    // Scheduler

    pub fn increment_dispatches(&self) {
        self.dispatches.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_dispatch_failures(&self) {
        self.dispatch_failures.fetch_add(1, Ordering::Relaxed);
    }

    // Approval and reconciliation

    pub fn increment_approvals(&self) {
        self.approvals.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_reconciliations(&self) {
        self.reconciliations.fetch_add(1, Ordering::Relaxed);
    }

    /// Get all metrics as a snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            list_requests: self.list_requests.load(Ordering::Relaxed),
            reverts_applied: self.reverts_applied.load(Ordering::Relaxed),
            reverts_rejected: self.reverts_rejected.load(Ordering::Relaxed),
            records_reverted: self.records_reverted.load(Ordering::Relaxed),
            partial_reverts: self.partial_reverts.load(Ordering::Relaxed),
            dispatches: self.dispatches.load(Ordering::Relaxed),
            dispatch_failures: self.dispatch_failures.load(Ordering::Relaxed),
            approvals: self.approvals.load(Ordering::Relaxed),
            reconciliations: self.reconciliations.load(Ordering::Relaxed),
        }
    }

    /// Current values as a JSON object
    pub fn to_json(&self) -> String {
        serde_json::to_string(&self.snapshot()).unwrap_or_else(|_| "{}".to_string())
    }
}

/// A point-in-time snapshot of all metrics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub list_requests: u64,
    pub reverts_applied: u64,
    pub reverts_rejected: u64,
    pub records_reverted: u64,
    pub partial_reverts: u64,
    pub dispatches: u64,
    pub dispatch_failures: u64,
    pub approvals: u64,
    pub reconciliations: u64,
}
