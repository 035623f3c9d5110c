//! Batch processing of dropped paths.

use crate::error::ImportFailureKind;
use crate::importer::ArchiveImporter;
use crate::session::SessionImportTracker;
use crate::types::{BatchSummary, ImportOutcome};
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info};

/// Extension of accepted archives, matched case-insensitively.
pub const ARCHIVE_EXTENSION: &str = "zip";

/// The content library that re-scans the managed directory.
pub trait LibraryRefresher: Send + Sync {
    fn refresh(&self);
}

/// `true` if `path` has the archive extension.
pub fn is_archive(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case(ARCHIVE_EXTENSION))
}

/// Runs the importer over a batch of paths and signals the library once.
pub struct ImportPipeline {
    importer: ArchiveImporter,
    target_base: PathBuf,
    tracker: Arc<SessionImportTracker>,
    refresher: Arc<dyn LibraryRefresher>,
}

impl ImportPipeline {
    pub fn new(
        importer: ArchiveImporter,
        target_base: PathBuf,
        tracker: Arc<SessionImportTracker>,
        refresher: Arc<dyn LibraryRefresher>,
    ) -> Self {
        Self {
            importer,
            target_base,
            tracker,
            refresher,
        }
    }

    /// Process `paths` in order.
    ///
    /// Non-archives are skipped untouched. A failure or panic on one entry
    /// is counted and the rest of the batch still runs. The refresher is
    /// called once at the end if anything was imported.
    pub fn process_batch(&self, paths: &[PathBuf]) -> BatchSummary {
        info!(count = paths.len(), "processing drop batch");
        let mut summary = BatchSummary::default();

        for path in paths {
            if !is_archive(path) {
                debug!(path = %path.display(), "skipping non-archive");
                summary.skipped += 1;
                continue;
            }

            let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                self.importer.import(path, &self.target_base)
            }))
            .unwrap_or_else(|_| {
                error!(path = %path.display(), "import panicked");
                ImportOutcome::failure(path, ImportFailureKind::UnexpectedIo)
            });

            if let Some(target) = &outcome.target_directory {
                self.tracker.record(target.clone());
            }
            summary.push(outcome);
        }

        info!(
            succeeded = summary.succeeded,
            failed = summary.failed,
            skipped = summary.skipped,
            "drop batch finished"
        );

        if summary.any_succeeded() {
            let refreshed = panic::catch_unwind(AssertUnwindSafe(|| self.refresher.refresh()));
            if refreshed.is_err() {
                error!("library refresh panicked");
            }
        }

        summary
    }
}
