//! Error types for scene loading and export rendering.

use extrudekit_core::{Error, ExportFormat};
use extrudekit_designer::ConvertError;
use thiserror::Error;

/// Failures while loading a pre-built 3D asset
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AssetLoadError {
    #[error("Unsupported asset type: {0}")]
    UnsupportedExtension(String),

    #[error("glTF error: {0}")]
    Gltf(String),

    #[error("Mesh {mesh} primitive {primitive}: {reason}")]
    Primitive {
        mesh: usize,
        primitive: usize,
        reason: String,
    },

    #[error("Asset contains no triangle geometry")]
    NoGeometry,
}

impl From<AssetLoadError> for Error {
    fn from(err: AssetLoadError) -> Self {
        Error::AssetLoad(err.to_string())
    }
}

/// Failures while rendering or encoding an export
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExportError {
    #[error("No model loaded")]
    NoModel,

    #[error("Viewport has no area ({width}x{height})")]
    EmptyViewport { width: u32, height: u32 },

    #[error("Could not allocate a {width}x{height} surface")]
    Surface { width: u32, height: u32 },

    #[error("Encoding failed: {0}")]
    Encode(String),

    #[error("Rendered markup rejected: {0}")]
    Markup(#[from] ConvertError),
}

impl ExportError {
    /// Lift into the unified error, tagged with the export path that failed
    pub fn into_error(self, format: ExportFormat) -> Error {
        match self {
            ExportError::NoModel => Error::NoModel,
            other => Error::export(format, other.to_string()),
        }
    }
}

pub type ExportResult<T> = std::result::Result<T, ExportError>;
