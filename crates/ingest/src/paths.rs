//! Location of the managed level directory under the host's install root.

use crate::error::PathError;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Host data folder, relative to the install root.
pub const DATA_FOLDER_NAME: &str = "Beat Saber_Data";

/// Managed folder receiving imported levels, relative to the data folder.
pub const TARGET_FOLDER_NAME: &str = "CustomWipLevels";

/// Compute the managed target directory for `app_root`, creating it if absent.
///
/// Calling this again once the directory exists is a no-op success.
///
/// # Errors
///
/// - [`PathError::RootUnavailable`] if `app_root` is empty or is not an
///   existing directory
/// - [`PathError::CreateFailed`] if the target has to be created and creation
///   fails
pub fn resolve_target_base(app_root: &Path) -> Result<PathBuf, PathError> {
    if app_root.as_os_str().is_empty() || !app_root.is_dir() {
        return Err(PathError::RootUnavailable(app_root.to_path_buf()));
    }

    let target = app_root.join(DATA_FOLDER_NAME).join(TARGET_FOLDER_NAME);
    if target.is_dir() {
        debug!(path = %target.display(), "target base already present");
        return Ok(target);
    }

    fs::create_dir_all(&target).map_err(|source| PathError::CreateFailed {
        path: target.clone(),
        source,
    })?;
    info!(path = %target.display(), "created target base");
    Ok(target)
}
