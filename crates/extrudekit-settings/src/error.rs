//! Error types for the settings crate.

use std::io;
use thiserror::Error;

/// Errors that can occur during settings operations.
#[derive(Error, Debug)]
pub enum SettingsError {
    /// The configuration file could not be loaded.
    #[error("Failed to load settings: {0}")]
    LoadError(String),

    /// The configuration file could not be saved.
    #[error("Failed to save settings: {0}")]
    SaveError(String),

    /// A configuration or parameter value is invalid.
    #[error("Invalid setting '{key}': {reason}")]
    InvalidSetting { key: String, reason: String },

    /// A colour string could not be parsed.
    #[error("Invalid color '{0}'")]
    InvalidColor(String),

    /// The configuration directory could not be found or created.
    #[error("Config directory error: {0}")]
    ConfigDirectory(String),

    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// TOML deserialization error.
    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// TOML serialization error.
    #[error("TOML error: {0}")]
    TomlSerError(#[from] toml::ser::Error),
}

impl SettingsError {
    pub(crate) fn invalid(key: &str, reason: impl Into<String>) -> Self {
        SettingsError::InvalidSetting {
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<SettingsError> for extrudekit_core::Error {
    fn from(err: SettingsError) -> Self {
        match err {
            SettingsError::IoError(e) => extrudekit_core::Error::Io(e),
            other => extrudekit_core::Error::invalid_input(other.to_string()),
        }
    }
}

/// Result type alias for settings operations.
pub type SettingsResult<T> = Result<T, SettingsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_error_display() {
        let err = SettingsError::LoadError("file not found".to_string());
        assert_eq!(err.to_string(), "Failed to load settings: file not found");

        let err = SettingsError::invalid("roughness", "must be finite");
        assert_eq!(err.to_string(), "Invalid setting 'roughness': must be finite");

        let err = SettingsError::InvalidColor("#12".to_string());
        assert_eq!(err.to_string(), "Invalid color '#12'");
    }

    #[test]
    fn test_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let settings_err: SettingsError = io_err.into();
        assert!(matches!(settings_err, SettingsError::IoError(_)));

        let core: extrudekit_core::Error = settings_err.into();
        assert_eq!(core.kind(), extrudekit_core::ErrorKind::Io);

        let core: extrudekit_core::Error = SettingsError::InvalidColor("x".into()).into();
        assert_eq!(core.kind(), extrudekit_core::ErrorKind::InvalidInput);
    }
}
