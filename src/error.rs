//! Error handling for fxchain
//!
//! The effects core itself is total. These errors only come out of the
//! surfaces around it: the state file and caller-side preset validation.

use std::path::PathBuf;

use thiserror::Error;

use crate::effects::UnitType;

/// Result type alias for fxchain operations
pub type Result<T> = std::result::Result<T, FxError>;

/// Errors raised outside the effects core.
#[derive(Error, Debug)]
pub enum FxError {
    // File Errors
    #[error("Failed to read file: {path}: {source}")]
    FileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file: {path}: {source}")]
    FileWriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Directory creation failed: {path}: {source}")]
    DirectoryCreateError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Serialization Errors
    #[error("JSON serialization error: {0}")]
    JsonSerializationError(#[from] serde_json::Error),

    #[error("Invalid state schema version: {version}")]
    InvalidSchemaVersion { version: String },

    #[error("Migration failed from {from} to {to}: {reason}")]
    MigrationError {
        from: String,
        to: String,
        reason: String,
    },

    // Preset Errors
    #[error("Unknown effects unit: {name}")]
    UnknownUnit { name: String },

    #[error("Preset name must not be empty")]
    EmptyPresetName,

    #[error("A {unit} preset named '{name}' already exists")]
    PresetExists { unit: UnitType, name: String },

    #[error("No {unit} preset named '{name}'")]
    PresetNotFound { unit: UnitType, name: String },

    #[error("'{name}' is a built-in {unit} preset and cannot be changed")]
    SystemPresetImmutable { unit: UnitType, name: String },

    // Generic Errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl FxError {
    /// Returns true if this error indicates the operation can be retried.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            FxError::FileWriteError { .. } | FxError::DirectoryCreateError { .. }
        )
    }

    /// Returns a user-friendly recovery suggestion.
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            FxError::FileReadError { .. } => Some("Check that the state file is readable."),
            FxError::FileWriteError { .. } | FxError::DirectoryCreateError { .. } => {
                Some("Check permissions and free space for the state file location.")
            }
            FxError::UnknownUnit { .. } => {
                Some("Use one of: master, eq, pitch, time, reverb, delay, filter.")
            }
            FxError::EmptyPresetName => Some("Give the preset a name."),
            FxError::PresetExists { .. } => Some("Choose a different name or delete the existing preset."),
            FxError::PresetNotFound { .. } => Some("Run 'fxchain presets <unit>' to list names."),
            FxError::SystemPresetImmutable { .. } => {
                Some("Save a copy under a new name and change that instead.")
            }
            FxError::InvalidSchemaVersion { .. } | FxError::MigrationError { .. } => {
                Some("The state file was written by a newer version; it will be set aside.")
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_errors_are_retryable() {
        let err = FxError::FileWriteError {
            path: PathBuf::from("state.json"),
            source: std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
        };
        assert!(err.is_retryable());
        assert!(err.recovery_suggestion().is_some());
        assert!(err.to_string().contains("state.json"));
    }

    #[test]
    fn test_preset_errors_name_the_unit() {
        let err = FxError::PresetExists {
            unit: UnitType::Reverb,
            name: "Hall".to_string(),
        };
        assert_eq!(err.to_string(), "A reverb preset named 'Hall' already exists");
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_json_errors_convert() {
        let err: FxError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert!(matches!(err, FxError::JsonSerializationError(_)));
        assert!(err.recovery_suggestion().is_none());
    }
}
