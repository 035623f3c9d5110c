//! Error types for the window hook and plugin lifecycle.

use ingest::PathError;
use thiserror::Error;

/// Win32 `ERROR_INVALID_WINDOW_HANDLE`.
pub const ERROR_INVALID_WINDOW_HANDLE: u32 = 1400;

/// Why a hook could not be installed.
#[derive(Debug, Error)]
pub enum HookError {
    /// A hook is already active, or the window is already hooked.
    #[error("Hook already active")]
    AlreadyActive,

    /// Replacing the window procedure failed (OS error code).
    #[error("Window subclassing failed: os error {0}")]
    SubclassFailed(u32),

    /// Registering the window as a drop target failed (OS error code).
    #[error("Drop target registration failed: os error {0}")]
    DropRegistrationFailed(u32),

    /// The managed target directory could not be resolved.
    #[error("Target directory unavailable: {0}")]
    Path(#[from] PathError),
}

/// A query against an OS drop payload failed.
#[derive(Debug, Error)]
pub enum DropError {
    #[error("Drop file count query failed: os error {0}")]
    Count(u32),

    #[error("Drop path query failed at index {index}: os error {code}")]
    Path { index: u32, code: u32 },
}

/// Errors surfaced by plugin lifecycle calls.
#[derive(Debug, Error)]
pub enum PluginError {
    /// The background runtime could not be started.
    #[error("Failed to start runtime: {0}")]
    Runtime(#[from] std::io::Error),

    #[error(transparent)]
    Path(#[from] PathError),

    #[error(transparent)]
    Hook(#[from] HookError),
}
