//! Type definitions for level imports.

use crate::error::ImportFailureKind;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default cap on the total uncompressed size of one archive (2 GiB).
pub const DEFAULT_SIZE_LIMIT_BYTES: u64 = 2 * 1024 * 1024 * 1024;

/// Options for importing an archive.
#[derive(Debug, Clone)]
pub struct ImportOptions {
    /// Maximum total extracted size in bytes (default: 2 GiB)
    pub size_limit_bytes: Option<u64>,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            size_limit_bytes: Some(DEFAULT_SIZE_LIMIT_BYTES),
        }
    }
}

/// Result of importing one archive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportOutcome {
    /// The archive that was processed
    pub source_path: PathBuf,

    /// Final directory, present only on success
    pub target_directory: Option<PathBuf>,

    /// Failure classification, present only on failure
    pub failure: Option<ImportFailureKind>,
}

impl ImportOutcome {
    pub fn success(source: &Path, target: PathBuf) -> Self {
        Self {
            source_path: source.to_path_buf(),
            target_directory: Some(target),
            failure: None,
        }
    }

    pub fn failure(source: &Path, kind: ImportFailureKind) -> Self {
        Self {
            source_path: source.to_path_buf(),
            target_directory: None,
            failure: Some(kind),
        }
    }

    pub fn succeeded(&self) -> bool {
        self.failure.is_none() && self.target_directory.is_some()
    }
}

/// Aggregate of one processed drop batch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Archives imported
    pub succeeded: usize,

    /// Archives that failed for any reason
    pub failed: usize,

    /// Paths ignored because they are not archives
    pub skipped: usize,

    /// One entry per archive, in input order
    pub outcomes: Vec<ImportOutcome>,
}

impl BatchSummary {
    pub fn any_succeeded(&self) -> bool {
        self.succeeded > 0
    }

    pub(crate) fn push(&mut self, outcome: ImportOutcome) {
        if outcome.succeeded() {
            self.succeeded += 1;
        } else {
            self.failed += 1;
        }
        self.outcomes.push(outcome);
    }
}
