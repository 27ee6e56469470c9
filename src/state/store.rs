//! State file storage.
//!
//! Reads and writes the JSON state file. A missing or unusable file is
//! never fatal: the caller gets `None` and starts from defaults.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use log::{info, warn};
use serde_json::Value;

use super::migration::migrate_state;
use super::PersistedState;
use crate::error::{FxError, Result};

/// Suffix given to a state file that could not be read back.
const CORRUPT_SUFFIX: &str = ".corrupt";

/// Suffix of the temporary file written before replacing the state file.
const TEMP_SUFFIX: &str = ".tmp";

/// Location of the persisted effects state.
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn sibling(&self, suffix: &str) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(OsString::from)
            .unwrap_or_else(|| OsString::from("state"));
        name.push(suffix);
        self.path.with_file_name(name)
    }

    /// Path a corrupt state file is moved to.
    pub fn corrupt_path(&self) -> PathBuf {
        self.sibling(CORRUPT_SUFFIX)
    }

    /// Load the state file.
    ///
    /// Returns `Ok(None)` when there is no file, or when the file cannot be
    /// parsed or migrated. In the latter case the file is moved aside to
    /// [`corrupt_path`](Self::corrupt_path) so the next save starts clean.
    ///
    /// # Errors
    /// Returns `FxError::FileReadError` if the file exists but cannot be read.
    pub fn load(&self) -> Result<Option<PersistedState>> {
        if !self.path.exists() {
            info!("No state file at {}, using defaults", self.path.display());
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path).map_err(|e| FxError::FileReadError {
            path: self.path.clone(),
            source: e,
        })?;

        match Self::parse(&content) {
            Ok(state) => {
                info!("Loaded state from {}", self.path.display());
                Ok(Some(state))
            }
            Err(e) => {
                warn!(
                    "Discarding unreadable state file {}: {}",
                    self.path.display(),
                    e
                );
                self.quarantine();
                Ok(None)
            }
        }
    }

    fn parse(content: &str) -> Result<PersistedState> {
        let raw: Value = serde_json::from_str(content)?;
        let migrated = migrate_state(raw)?;
        Ok(serde_json::from_value(migrated)?)
    }

    fn quarantine(&self) {
        let target = self.corrupt_path();
        if let Err(e) = fs::rename(&self.path, &target) {
            warn!(
                "Could not move {} to {}: {}",
                self.path.display(),
                target.display(),
                e
            );
        }
    }

    /// Write the state file.
    ///
    /// The new content goes to a temporary sibling first and is renamed
    /// over the old file, so a crash mid-write leaves the old state intact.
    pub fn save(&self, state: &PersistedState) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| FxError::DirectoryCreateError {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
            }
        }

        let content = serde_json::to_string_pretty(state)?;
        let temp_path = self.sibling(TEMP_SUFFIX);

        fs::write(&temp_path, content).map_err(|e| FxError::FileWriteError {
            path: temp_path.clone(),
            source: e,
        })?;

        fs::rename(&temp_path, &self.path).map_err(|e| FxError::FileWriteError {
            path: self.path.clone(),
            source: e,
        })?;

        info!("Saved state to {}", self.path.display());
        Ok(())
    }
}
