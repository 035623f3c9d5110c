//! Error types for level import operations.

use serde::{Deserialize, Serialize};
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors while resolving the managed target directory.
#[derive(Debug, Error)]
pub enum PathError {
    /// The application root is empty, missing, or not a directory.
    #[error("Application root unavailable: {0}")]
    RootUnavailable(PathBuf),

    /// The target directory was absent and could not be created.
    #[error("Failed to create {path}: {source}")]
    CreateFailed {
        /// Directory that could not be created
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Why a single archive was not imported.
///
/// Reported inside an [`ImportOutcome`](crate::types::ImportOutcome), never
/// returned as an `Err` to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportFailureKind {
    /// The archive or target is held open by another process.
    Locked,
    /// The archive is not a readable zip, or its entries are unsafe.
    Corrupt,
    /// The OS refused access to the archive or the target directory.
    PermissionDenied,
    /// Every candidate directory name is already taken.
    NameExhausted,
    /// Extraction succeeded but the contents are not a level.
    ValidationFailed,
    /// Any other I/O failure.
    UnexpectedIo,
}

impl std::fmt::Display for ImportFailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Self::Locked => "archive or target is locked",
            Self::Corrupt => "archive is corrupt or unsafe",
            Self::PermissionDenied => "permission denied",
            Self::NameExhausted => "no free directory name",
            Self::ValidationFailed => "contents are not a valid level",
            Self::UnexpectedIo => "unexpected I/O error",
        };
        f.write_str(text)
    }
}

/// Low-level extraction error, classified into an [`ImportFailureKind`].
#[derive(Debug, Error)]
pub enum ExtractError {
    /// Reading the archive or writing the level failed.
    #[error("I/O failure: {0}")]
    Io(#[from] io::Error),

    /// The zip container could not be read.
    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// An entry tried to escape the level directory.
    #[error("Unsafe entry: {0}")]
    Security(#[from] SecurityError),

    /// The archive unpacks to more than the configured cap.
    #[error("Archive too large: {current} bytes over the {limit} byte cap")]
    SizeLimitExceeded {
        /// Uncompressed bytes declared so far
        current: u64,
        /// Cap from `ImportOptions::size_limit_bytes`
        limit: u64,
    },
}

impl ExtractError {
    /// Map the error onto the failure taxonomy reported to callers.
    pub fn kind(&self) -> ImportFailureKind {
        match self {
            Self::Io(err) => classify_io(err),
            Self::Zip(zip::result::ZipError::Io(err)) => classify_io(err),
            Self::Zip(_) | Self::Security(_) | Self::SizeLimitExceeded { .. } => {
                ImportFailureKind::Corrupt
            }
        }
    }
}

/// Classify a raw I/O error.
pub fn classify_io(err: &io::Error) -> ImportFailureKind {
    // ERROR_SHARING_VIOLATION and ERROR_LOCK_VIOLATION
    if cfg!(windows) && matches!(err.raw_os_error(), Some(32) | Some(33)) {
        return ImportFailureKind::Locked;
    }
    match err.kind() {
        io::ErrorKind::PermissionDenied => ImportFailureKind::PermissionDenied,
        io::ErrorKind::InvalidData | io::ErrorKind::UnexpectedEof => ImportFailureKind::Corrupt,
        _ => ImportFailureKind::UnexpectedIo,
    }
}

/// An archive entry name that would write outside the level directory.
#[derive(Debug, Error)]
pub enum SecurityError {
    /// A `..` segment, or nothing left after normalizing.
    #[error("Entry escapes the level directory: {0}")]
    PathTraversal(String),

    /// A rooted name or drive prefix.
    #[error("Entry is rooted: {0}")]
    AbsolutePath(String),
}

/// Errors while loading or saving [`Settings`](crate::settings::Settings).
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to read settings {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Malformed settings {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to write settings {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
