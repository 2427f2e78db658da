//! Closed tags shared across crates.

use serde::{Deserialize, Serialize};
use std::fmt;

/// What produced the current model.
///
/// Decided once at load time from the request and carried through framing
/// and rebuild decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelKind {
    /// Extruded from vector artwork; rescaled to a fixed scene size.
    Vector,
    /// A pre-built 3D asset; never rescaled.
    Solid,
}

impl ModelKind {
    /// Determine the kind from a file extension (case-insensitive, no dot)
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "svg" => Some(ModelKind::Vector),
            "glb" | "gltf" => Some(ModelKind::Solid),
            _ => None,
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelKind::Vector => write!(f, "vector"),
            ModelKind::Solid => write!(f, "solid"),
        }
    }
}

/// The two export paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExportFormat {
    /// Path-based markup output.
    Svg,
    /// Supersampled raster output.
    Png,
}

impl ExportFormat {
    /// File extension without the dot
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Svg => "svg",
            ExportFormat::Png => "png",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportFormat::Svg => write!(f, "SVG"),
            ExportFormat::Png => write!(f, "PNG"),
        }
    }
}

/// Long-running operations guarded by a busy flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operation {
    /// Loading and assembling a model.
    Load,
    /// Rendering and encoding an export.
    Export,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Load => write!(f, "load"),
            Operation::Export => write!(f, "export"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_extension() {
        assert_eq!(ModelKind::from_extension("svg"), Some(ModelKind::Vector));
        assert_eq!(ModelKind::from_extension("GLB"), Some(ModelKind::Solid));
        assert_eq!(ModelKind::from_extension("gltf"), Some(ModelKind::Solid));
        assert_eq!(ModelKind::from_extension("txt"), None);
    }

    #[test]
    fn test_format_display() {
        assert_eq!(ExportFormat::Svg.to_string(), "SVG");
        assert_eq!(ExportFormat::Png.extension(), "png");
    }
}
