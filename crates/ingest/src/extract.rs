//! Zip extraction with path confinement and a size limit.

use crate::error::ExtractError;
use crate::safety::{confine_entry, within_size_limit};
use crate::types::ImportOptions;
use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::Path;
use tracing::{debug, warn};
use zip::ZipArchive;

/// Statistics about a completed extraction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractStats {
    /// Number of files written
    pub files_extracted: u64,

    /// Total bytes written to disk
    pub bytes_written: u64,
}

/// Extract a zip archive into `output_dir`, which must already exist.
///
/// Every entry path is validated before anything is written: absolute
/// paths and `..` components fail the whole extraction, so a hostile archive
/// never writes outside `output_dir`. Symlink entries are skipped. The
/// declared uncompressed sizes are checked against
/// `options.size_limit_bytes` up front.
///
/// On error the directory may be partially populated; the caller owns
/// cleanup.
pub fn extract_zip(
    archive_path: &Path,
    output_dir: &Path,
    options: &ImportOptions,
) -> Result<ExtractStats, ExtractError> {
    let file = File::open(archive_path)?;
    let mut archive = ZipArchive::new(BufReader::new(file))?;

    let mut declared: u64 = 0;
    for index in 0..archive.len() {
        let entry = archive.by_index_raw(index)?;
        confine_entry(entry.name())?;
        declared = declared.saturating_add(entry.size());
        if !within_size_limit(declared, options.size_limit_bytes) {
            return Err(ExtractError::SizeLimitExceeded {
                current: declared,
                limit: options.size_limit_bytes.unwrap_or(0),
            });
        }
    }

    let mut stats = ExtractStats::default();
    for index in 0..archive.len() {
        let mut entry = archive.by_index(index)?;
        let relative = confine_entry(entry.name())?;
        let output_path = output_dir.join(&relative);

        if entry.is_dir() {
            fs::create_dir_all(&output_path)?;
            continue;
        }

        if is_symlink_mode(entry.unix_mode()) {
            warn!(entry = %relative.display(), "skipping symlink entry");
            continue;
        }

        if let Some(parent) = output_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut out = File::create(&output_path)?;
        let written = io::copy(&mut entry, &mut out)?;

        stats.files_extracted += 1;
        stats.bytes_written += written;
        if !within_size_limit(stats.bytes_written, options.size_limit_bytes) {
            return Err(ExtractError::SizeLimitExceeded {
                current: stats.bytes_written,
                limit: options.size_limit_bytes.unwrap_or(0),
            });
        }
    }

    debug!(
        archive = %archive_path.display(),
        files = stats.files_extracted,
        bytes = stats.bytes_written,
        "extracted"
    );
    Ok(stats)
}

fn is_symlink_mode(mode: Option<u32>) -> bool {
    const S_IFMT: u32 = 0o170000;
    const S_IFLNK: u32 = 0o120000;
    mode.is_some_and(|mode| mode & S_IFMT == S_IFLNK)
}
