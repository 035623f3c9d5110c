//! Checks applied to untrusted archive entries before anything is written.
//!
//! Entry names come straight from the zip central directory. They are
//! rewritten into a relative path that cannot leave the level directory
//! (zip-slip), regardless of which separator or drive syntax the archiver
//! used.

use crate::error::SecurityError;
use std::path::PathBuf;

/// Turn a raw zip entry name into a path relative to the level directory.
///
/// Both `/` and `\` count as separators. Empty and `.` segments are dropped.
/// A leading separator, a drive prefix such as `C:`, or any `..` segment is
/// rejected, as is a name with nothing left after normalizing.
///
/// ```
/// use ingest::safety::confine_entry;
/// use std::path::Path;
///
/// assert_eq!(confine_entry("Map\\Info.dat").unwrap(), Path::new("Map/Info.dat"));
/// assert!(confine_entry("..\\..\\Plugins\\evil.dll").is_err());
/// assert!(confine_entry("C:/Windows/evil.dll").is_err());
/// ```
pub fn confine_entry(name: &str) -> Result<PathBuf, SecurityError> {
    let unified = name.replace('\\', "/");
    if unified.starts_with('/') || has_drive_prefix(&unified) {
        return Err(SecurityError::AbsolutePath(name.to_string()));
    }

    let mut confined = PathBuf::new();
    for segment in unified.split('/') {
        match segment {
            "" | "." => continue,
            ".." => return Err(SecurityError::PathTraversal(name.to_string())),
            _ => confined.push(segment),
        }
    }

    if confined.as_os_str().is_empty() {
        return Err(SecurityError::PathTraversal(format!("{name} (empty)")));
    }
    Ok(confined)
}

fn has_drive_prefix(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(
        (chars.next(), chars.next()),
        (Some(letter), Some(':')) if letter.is_ascii_alphabetic()
    )
}

/// `true` while `bytes` has not passed `limit`; `None` means unlimited.
pub fn within_size_limit(bytes: u64, limit: Option<u64>) -> bool {
    limit.map_or(true, |max| bytes <= max)
}
