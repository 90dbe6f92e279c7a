//! Observability
//!
//! - Structured logging (JSON lines)
//! - Atomic counters
//! - Typed lifecycle events
//!
//! Observability is read-only: nothing here can fail or alter the
//! operation being observed.
//!
//! ```ignore
//! use rivoli_records::observability::{log_event, Event, MetricsRegistry};
//!
//! log_event(Event::RecordsReverted, &[("file_id", "42"), ("modified", "17")]);
//!
//! let metrics = MetricsRegistry::new();
//! metrics.increment_reverts_applied();
//! ```

mod events;
mod logger;
mod metrics;
mod scope;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use metrics::{MetricsRegistry, MetricsSnapshot};
pub use scope::{ObservationScope, Timer};

/// Log a lifecycle event at its own severity
pub fn log_event(event: Event, fields: &[(&str, &str)]) {
    Logger::log(event.severity(), event.as_str(), fields);
}
