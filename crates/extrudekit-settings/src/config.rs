//! Application configuration
//!
//! Values that shape the viewer but are not user-facing scene parameters:
//! default viewport, camera limits, export quality, and input limits.
//! Stored as TOML (or JSON) and validated on load and save.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{SettingsError, SettingsResult};
use crate::params::ParameterStore;

/// Viewport defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportSettings {
    /// Width in CSS pixels
    pub width: u32,
    /// Height in CSS pixels
    pub height: u32,
    /// Device pixel ratio of the live surface
    pub pixel_ratio: f32,
}

impl Default for ViewportSettings {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            pixel_ratio: 1.0,
        }
    }
}

/// Perspective camera and orbit-control limits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    /// Vertical field of view in degrees
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    /// Closest orbit distance
    pub min_distance: f32,
    /// Farthest orbit distance
    pub max_distance: f32,
    /// Auto-rotate speed; 1.0 is one revolution per minute
    pub auto_rotate_speed: f32,
    /// Orbit damping factor
    pub damping: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            fov_degrees: 75.0,
            near: 0.1,
            far: 1000.0,
            min_distance: 0.1,
            max_distance: 100.0,
            auto_rotate_speed: 1.0,
            damping: 0.05,
        }
    }
}

/// Export quality settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    /// Raster supersampling factor
    pub raster_scale: u32,
    /// Decimal places kept in vector coordinates
    pub svg_precision: usize,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            raster_scale: 2,
            svg_precision: 1,
        }
    }
}

/// Load-request limits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputSettings {
    /// Largest accepted input file in bytes
    pub max_file_bytes: u64,
}

impl Default for InputSettings {
    fn default() -> Self {
        Self {
            max_file_bytes: 50 * 1024 * 1024,
        }
    }
}

/// Logging preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    pub filter: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

/// Complete application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub viewport: ViewportSettings,
    pub camera: CameraSettings,
    pub export: ExportSettings,
    pub input: InputSettings,
    pub logging: LoggingSettings,
    /// Initial scene parameters
    pub parameters: ParameterStore,
}

enum Format {
    Toml,
    Json,
}

fn format_for(path: &Path) -> SettingsResult<Format> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("toml") => Ok(Format::Toml),
        Some("json") => Ok(Format::Json),
        _ => Err(SettingsError::LoadError(
            "Config file must be .json or .toml".to_string(),
        )),
    }
}

impl AppConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse TOML text
    pub fn from_toml_str(content: &str) -> SettingsResult<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let format = format_for(path)?;
        let content = std::fs::read_to_string(path)?;
        let config: Self = match format {
            Format::Toml => toml::from_str(&content)?,
            Format::Json => serde_json::from_str(&content)?,
        };
        config.validate()?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Save config to file (JSON or TOML)
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;
        let content = match format_for(path)? {
            Format::Toml => toml::to_string_pretty(self)?,
            Format::Json => serde_json::to_string_pretty(self)?,
        };
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> SettingsResult<()> {
        if self.viewport.width == 0 || self.viewport.height == 0 {
            return Err(SettingsError::invalid(
                "viewport",
                "dimensions must be > 0",
            ));
        }
        if !(self.viewport.pixel_ratio.is_finite() && self.viewport.pixel_ratio > 0.0) {
            return Err(SettingsError::invalid("viewport.pixel_ratio", "must be > 0"));
        }

        let cam = &self.camera;
        if !(cam.fov_degrees > 0.0 && cam.fov_degrees < 180.0) {
            return Err(SettingsError::invalid(
                "camera.fov_degrees",
                "must be between 0 and 180",
            ));
        }
        if !(cam.near > 0.0 && cam.far > cam.near) {
            return Err(SettingsError::invalid("camera", "require 0 < near < far"));
        }
        if !(cam.min_distance > 0.0 && cam.max_distance >= cam.min_distance) {
            return Err(SettingsError::invalid(
                "camera",
                "require 0 < min_distance <= max_distance",
            ));
        }

        if self.export.raster_scale == 0 || self.export.raster_scale > 8 {
            return Err(SettingsError::invalid(
                "export.raster_scale",
                "must be between 1 and 8",
            ));
        }
        if self.export.svg_precision > 6 {
            return Err(SettingsError::invalid(
                "export.svg_precision",
                "must be at most 6",
            ));
        }

        if self.input.max_file_bytes == 0 {
            return Err(SettingsError::invalid("input.max_file_bytes", "must be > 0"));
        }

        self.parameters.validate()
    }
}
