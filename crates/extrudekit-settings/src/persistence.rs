//! Settings Persistence
//!
//! Locates the configuration file and loads it, falling back to defaults
//! when nothing has been saved yet.

use std::path::{Path, PathBuf};

use crate::config::AppConfig;
use crate::error::{SettingsError, SettingsResult};

const APP_DIR: &str = "extrudekit";
const CONFIG_FILE: &str = "config.toml";

/// Settings persistence layer
#[derive(Debug, Clone)]
pub struct SettingsPersistence {
    path: PathBuf,
}

impl SettingsPersistence {
    /// Persistence rooted at an explicit file
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Persistence at the platform config directory
    pub fn platform_default() -> SettingsResult<Self> {
        Ok(Self::at(Self::config_dir()?.join(CONFIG_FILE)))
    }

    /// `<platform config dir>/extrudekit`
    pub fn config_dir() -> SettingsResult<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or_else(|| {
                SettingsError::ConfigDirectory("no configuration directory on this platform".into())
            })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the config, or defaults when the file does not exist
    pub fn load_or_default(&self) -> SettingsResult<AppConfig> {
        if !self.path.exists() {
            tracing::debug!(
                "No config at {}, using defaults",
                self.path.display()
            );
            return Ok(AppConfig::default());
        }
        AppConfig::load_from_file(&self.path)
    }

    /// Save the config, creating parent directories as needed
    pub fn save(&self, config: &AppConfig) -> SettingsResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                SettingsError::ConfigDirectory(format!("{}: {}", parent.display(), e))
            })?;
        }
        config
            .save_to_file(&self.path)
            .map_err(|e| SettingsError::SaveError(e.to_string()))
    }
}
