//! Import of a single archive: name, extract, validate, commit or roll back.

use crate::error::{classify_io, ImportFailureKind};
use crate::extract::extract_zip;
use crate::naming::{reserve_unique_dir, sanitize_dir_name};
use crate::types::{ImportOptions, ImportOutcome};
use crate::validate::is_valid_content_dir;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// A freshly created target directory that is removed on drop unless
/// [`commit`](StagedDir::commit) is called.
struct StagedDir {
    path: PathBuf,
    committed: bool,
}

impl StagedDir {
    fn new(path: PathBuf) -> Self {
        Self {
            path,
            committed: false,
        }
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn commit(mut self) -> PathBuf {
        self.committed = true;
        std::mem::take(&mut self.path)
    }
}

impl Drop for StagedDir {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        match fs::remove_dir_all(&self.path) {
            Ok(()) => debug!(path = %self.path.display(), "rolled back target"),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => warn!(
                path = %self.path.display(),
                error = %err,
                "failed to roll back target"
            ),
        }
    }
}

/// Turns one archive into one validated directory under a target base.
#[derive(Debug, Clone, Default)]
pub struct ArchiveImporter {
    options: ImportOptions,
}

impl ArchiveImporter {
    pub fn new(options: ImportOptions) -> Self {
        Self { options }
    }

    /// Import `archive` into a new directory under `target_base`.
    ///
    /// After this returns, the target either does not exist (failure) or
    /// exists and passes validation (success). Never panics on bad input
    /// and never returns an `Err`: failures are reported in the outcome.
    pub fn import(&self, archive: &Path, target_base: &Path) -> ImportOutcome {
        let stem = archive
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        let base_name = sanitize_dir_name(&stem);

        let reserved = match reserve_unique_dir(target_base, &base_name) {
            Ok(Some(path)) => path,
            Ok(None) => {
                warn!(archive = %archive.display(), name = %base_name, "no free directory name");
                return ImportOutcome::failure(archive, ImportFailureKind::NameExhausted);
            }
            Err(err) => {
                warn!(archive = %archive.display(), error = %err, "could not create target");
                return ImportOutcome::failure(archive, classify_io(&err));
            }
        };
        let staged = StagedDir::new(reserved);
        debug!(archive = %archive.display(), target = %staged.path().display(), "extracting");

        if let Err(err) = extract_zip(archive, staged.path(), &self.options) {
            warn!(archive = %archive.display(), error = %err, "extraction failed");
            return ImportOutcome::failure(archive, err.kind());
        }

        if !is_valid_content_dir(staged.path()) {
            warn!(archive = %archive.display(), "extracted contents are not a level");
            return ImportOutcome::failure(archive, ImportFailureKind::ValidationFailed);
        }

        let target = staged.commit();
        info!(archive = %archive.display(), target = %target.display(), "imported");
        ImportOutcome::success(archive, target)
    }
}
