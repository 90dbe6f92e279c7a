//! Record and file documents as held by the store

mod file;
mod log;
mod record;

pub use file::{File, FileStats};
pub use log::{LogEntry, LogLevel};
pub use record::Record;
