//! ExtrudeKit Settings Crate
//!
//! Holds the user-facing parameter store that every rebuild and export reads,
//! the colour types it is expressed in, and the application configuration
//! file with its persistence.

pub mod color;
pub mod config;
pub mod error;
pub mod params;
pub mod persistence;

pub use color::{Background, Rgb};
pub use config::{
    AppConfig, CameraSettings, ExportSettings, InputSettings, LoggingSettings, ViewportSettings,
};
pub use error::{SettingsError, SettingsResult};
pub use params::{ParamChange, ParameterStore, RebuildEffect};
pub use persistence::SettingsPersistence;
