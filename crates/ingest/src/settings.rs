//! Persisted user settings.

use crate::error::SettingsError;
use crate::types::{ImportOptions, DEFAULT_SIZE_LIMIT_BYTES};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Settings file name, stored under `<app_root>/UserData`.
pub const SETTINGS_FILE_NAME: &str = "wipdrop.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Delete levels imported this session when the plugin shuts down
    pub delete_on_close: bool,

    /// Wait before hooking the host window, so the host can finish creating it
    pub hook_delay_ms: u64,

    /// Cap on the uncompressed size of one archive
    pub size_limit_bytes: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            delete_on_close: false,
            hook_delay_ms: 3000,
            size_limit_bytes: Some(DEFAULT_SIZE_LIMIT_BYTES),
        }
    }
}

impl Settings {
    /// Where the settings live for a given install root.
    pub fn path_for_root(app_root: &Path) -> PathBuf {
        app_root.join("UserData").join(SETTINGS_FILE_NAME)
    }

    /// Load from `path`; a missing file yields defaults.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(SettingsError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        serde_json::from_str(&raw).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        let write_err = |source| SettingsError::Write {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        let raw = serde_json::to_string_pretty(self).map_err(|err| write_err(err.into()))?;
        fs::write(path, raw).map_err(write_err)
    }

    pub fn import_options(&self) -> ImportOptions {
        ImportOptions {
            size_limit_bytes: self.size_limit_bytes,
        }
    }
}
