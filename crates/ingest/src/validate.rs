//! Checks that an extracted directory is a playable level.

use serde::Serialize;
use std::fs;
use std::io;
use std::path::Path;
use tracing::warn;

/// Level descriptor, matched case-insensitively.
pub const DESCRIPTOR_FILE_NAME: &str = "info.dat";

/// Audio formats the host can load.
pub const AUDIO_EXTENSIONS: [&str; 3] = ["egg", "ogg", "wav"];

/// Extension shared by the descriptor and difficulty files.
pub const DATA_EXTENSION: &str = "dat";

/// What was found among a directory's immediate files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ContentReport {
    pub has_descriptor: bool,
    pub has_audio: bool,
    pub has_difficulty: bool,
}

impl ContentReport {
    pub fn is_valid(&self) -> bool {
        self.has_descriptor && self.has_audio && self.has_difficulty
    }
}

/// Inspect the top level of `dir` (no recursion, directories ignored).
pub fn validate_content_dir(dir: &Path) -> io::Result<ContentReport> {
    let mut report = ContentReport::default();

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }

        let name = entry.file_name();
        let name = name.to_string_lossy();
        if name.eq_ignore_ascii_case(DESCRIPTOR_FILE_NAME) {
            report.has_descriptor = true;
            continue;
        }

        let Some(extension) = Path::new(name.as_ref()).extension() else {
            continue;
        };
        let extension = extension.to_string_lossy();
        if AUDIO_EXTENSIONS
            .iter()
            .any(|audio| extension.eq_ignore_ascii_case(audio))
        {
            report.has_audio = true;
        } else if extension.eq_ignore_ascii_case(DATA_EXTENSION) {
            report.has_difficulty = true;
        }
    }

    Ok(report)
}

/// `true` iff `dir` holds a descriptor, an audio file and a difficulty file.
///
/// Listing errors (vanished directory, permissions) count as invalid.
pub fn is_valid_content_dir(dir: &Path) -> bool {
    match validate_content_dir(dir) {
        Ok(report) => report.is_valid(),
        Err(err) => {
            warn!(dir = %dir.display(), error = %err, "validation could not list directory");
            false
        }
    }
}
