//! Start/complete logging around one operation
//!
//! - `{NAME}_BEGIN` on creation
//! - `{NAME}_COMPLETE` on `complete`
//! - `{NAME}_ERROR` on `fail`
//! - `{NAME}_INCOMPLETE` if dropped without either

use std::time::Instant;

use super::logger::{Logger, Severity};

/// A scope that logs its own begin and end
///
/// ```ignore
/// let scope = ObservationScope::with_fields("REVERT", &[("file_id", "42")]);
/// // ... do work ...
/// scope.complete_with_fields(&[("modified", "17")]);
/// ```
pub struct ObservationScope {
    name: &'static str,
    completed: bool,
    fields: Vec<(&'static str, String)>,
    timer: Timer,
}

impl ObservationScope {
    pub fn new(name: &'static str) -> Self {
        Self::with_fields(name, &[])
    }

    /// Creates a scope whose fields are repeated on every line it logs
    pub fn with_fields(name: &'static str, fields: &[(&'static str, &str)]) -> Self {
        let scope = Self {
            name,
            completed: false,
            fields: fields.iter().map(|(k, v)| (*k, v.to_string())).collect(),
            timer: Timer::new(),
        };
        scope.emit(Severity::Info, "BEGIN", &[]);
        scope
    }

    pub fn complete(self) {
        self.complete_with_fields(&[]);
    }

    /// Logs `{NAME}_COMPLETE` with the elapsed time and extra fields
    pub fn complete_with_fields(mut self, extra: &[(&str, &str)]) {
        self.completed = true;
        let elapsed = self.timer.elapsed_ms();
        let mut all = extra.to_vec();
        all.push(("elapsed_ms", elapsed.as_str()));
        self.emit(Severity::Info, "COMPLETE", &all);
    }

    /// Logs `{NAME}_ERROR` at ERROR level
    pub fn fail(mut self, reason: &str) {
        self.completed = true;
        self.emit(Severity::Error, "ERROR", &[("reason", reason)]);
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    fn emit(&self, severity: Severity, suffix: &str, extra: &[(&str, &str)]) {
        let event = format!("{}_{}", self.name, suffix);
        let mut all: Vec<(&str, &str)> =
            self.fields.iter().map(|(k, v)| (*k, v.as_str())).collect();
        all.extend_from_slice(extra);
        Logger::log(severity, &event, &all);
    }
}

impl Drop for ObservationScope {
    fn drop(&mut self) {
        if !self.completed {
            self.emit(
                Severity::Warn,
                "INCOMPLETE",
                &[("reason", "scope dropped without completion")],
            );
        }
    }
}

/// Wall-clock duration timer
pub struct Timer {
    start: Instant,
}

impl Timer {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Elapsed milliseconds as a string
    pub fn elapsed_ms(&self) -> String {
        self.start.elapsed().as_millis().to_string()
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}
