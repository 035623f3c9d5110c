//! Directories imported during the current session.

use parking_lot::Mutex;
use std::fs;
use std::path::PathBuf;
use tracing::{info, warn};

/// Append-only list of directories committed this session.
///
/// Shared between import tasks and the shutdown path; one lock guards all
/// access.
#[derive(Debug, Default)]
pub struct SessionImportTracker {
    entries: Mutex<Vec<PathBuf>>,
}

impl SessionImportTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, path: PathBuf) {
        self.entries.lock().push(path);
    }

    /// Snapshot and clear in one step.
    pub fn drain_all(&self) -> Vec<PathBuf> {
        std::mem::take(&mut *self.entries.lock())
    }

    /// Forget everything; called at session start.
    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Drain the list and delete every directory on it.
    ///
    /// Best effort: a failed deletion is logged and the rest still run.
    /// Returns how many directories were removed.
    pub fn purge(&self) -> usize {
        let entries = self.drain_all();
        let mut removed = 0;
        for path in &entries {
            match fs::remove_dir_all(path) {
                Ok(()) => removed += 1,
                Err(err) => warn!(path = %path.display(), error = %err, "failed to delete imported level"),
            }
        }
        info!(removed, total = entries.len(), "purged session imports");
        removed
    }
}
