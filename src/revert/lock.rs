//! Per-file revert serialization
//!
//! Two reverts of the same file never interleave their record and file
//! mutations inside one process. Reverts of different files run in
//! parallel.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::address::FileId;

/// Lazily created mutex per file id
#[derive(Debug, Default)]
pub struct FileLockTable {
    locks: Mutex<HashMap<FileId, Arc<Mutex<()>>>>,
}

impl FileLockTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `f` while holding the lock for `file_id`
    pub fn with_file_lock<T>(&self, file_id: FileId, f: impl FnOnce() -> T) -> T {
        let entry = {
            let mut locks = relock(&self.locks);
            Arc::clone(locks.entry(file_id).or_default())
        };

        let result = {
            let _guard = relock(&entry);
            f()
        };

        // Drop the entry once no other caller holds or waits on it
        let mut locks = relock(&self.locks);
        drop(entry);
        if locks
            .get(&file_id)
            .map(|e| Arc::strong_count(e) == 1)
            .unwrap_or(false)
        {
            locks.remove(&file_id);
        }

        result
    }

    /// Files with a revert in flight
    pub fn active(&self) -> usize {
        relock(&self.locks).len()
    }
}

// The guarded data is `()` or the table itself, which a panicking holder
// cannot leave half-updated.
fn relock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
