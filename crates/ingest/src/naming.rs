//! Directory names for imported levels.
//!
//! The archive's file stem is turned into a name that is legal on every
//! platform the host runs on, then a free slot is found with `_1`, `_2`, ...
//! suffixes.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Candidate names tried per import: the bare name plus `_1` through `_99`.
pub const MAX_NAME_ATTEMPTS: u32 = 100;

/// Prefix of generated names for archives whose stem sanitizes to nothing.
pub const FALLBACK_PREFIX: &str = "ImportedMap_";

const RESERVED_DEVICE_NAMES: [&str; 22] = [
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

fn is_forbidden(c: char) -> bool {
    matches!(c, '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*') || (c as u32) < 0x20
}

/// Turn an archive stem into a filesystem-safe directory name.
///
/// Runs of forbidden characters collapse into a single `_`, forbidden
/// characters at either end are dropped, and trailing dots and spaces are
/// trimmed. Names that end up empty get a random fallback.
///
/// Idempotent: `sanitize_dir_name(&sanitize_dir_name(n)) == sanitize_dir_name(n)`.
///
/// ```
/// use ingest::naming::sanitize_dir_name;
///
/// assert_eq!(sanitize_dir_name("My<Map>: Remix"), "My_Map_ Remix");
/// assert_eq!(sanitize_dir_name("Song..."), "Song");
/// assert!(sanitize_dir_name("???").starts_with("ImportedMap_"));
/// ```
pub fn sanitize_dir_name(stem: &str) -> String {
    let joined = stem
        .split(is_forbidden)
        .filter(|piece| !piece.is_empty())
        .collect::<Vec<_>>()
        .join("_");
    let trimmed = joined.trim_end_matches(['.', ' ']);

    if trimmed.trim().is_empty() {
        return fallback_name();
    }

    // "CON" and friends cannot be directory names on Windows, with or
    // without an extension.
    let device_part = trimmed.split('.').next().unwrap_or(trimmed);
    if RESERVED_DEVICE_NAMES
        .iter()
        .any(|reserved| reserved.eq_ignore_ascii_case(device_part))
    {
        return format!("{}_{}", device_part, &trimmed[device_part.len()..]);
    }

    trimmed.to_string()
}

/// A fresh `ImportedMap_xxxxxxxx` name.
pub fn fallback_name() -> String {
    let id = Uuid::new_v4().simple().to_string();
    format!("{}{}", FALLBACK_PREFIX, &id[..8])
}

/// Candidate `index` for `base`: the bare name first, then `base_1`, `base_2`, ...
pub fn candidate_name(base: &str, index: u32) -> String {
    if index == 0 {
        base.to_string()
    } else {
        format!("{}_{}", base, index)
    }
}

/// Find the first free candidate under `parent` and create it.
///
/// The existence check and the creation are one step: a candidate whose
/// `create_dir` reports `AlreadyExists` is treated as taken. Returns
/// `Ok(None)` when all [`MAX_NAME_ATTEMPTS`] candidates are taken, in which
/// case nothing was created.
pub fn reserve_unique_dir(parent: &Path, base: &str) -> io::Result<Option<PathBuf>> {
    for index in 0..MAX_NAME_ATTEMPTS {
        let candidate = parent.join(candidate_name(base, index));
        if fs::symlink_metadata(&candidate).is_ok() {
            continue;
        }
        match fs::create_dir(&candidate) {
            Ok(()) => return Ok(Some(candidate)),
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists => continue,
            Err(err) => return Err(err),
        }
    }
    Ok(None)
}
