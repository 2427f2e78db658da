//! Converter errors

use thiserror::Error;

/// Errors produced while turning vector markup into solids
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConvertError {
    /// The markup is not well-formed XML
    #[error("Malformed SVG: {0}")]
    Malformed(String),

    /// The document has no `<svg>` root element
    #[error("Invalid SVG: No SVG element found")]
    MissingRoot,

    /// A `d` attribute could not be read
    #[error("Invalid path data at offset {offset}: {reason}")]
    PathData {
        /// Byte offset into the attribute value.
        offset: usize,
        /// What was expected there.
        reason: String,
    },

    /// A `transform` attribute could not be read
    #[error("Invalid transform '{0}'")]
    Transform(String),

    /// The outline collapsed to nothing during extrusion
    #[error("Degenerate shape: {0}")]
    Degenerate(String),

    /// Nothing drawable was produced
    #[error("No valid shapes found in SVG")]
    EmptyGeometry,
}

impl From<ConvertError> for extrudekit_core::Error {
    fn from(err: ConvertError) -> Self {
        match err {
            ConvertError::EmptyGeometry => extrudekit_core::Error::EmptyGeometry,
            other => extrudekit_core::Error::Parse(other.to_string()),
        }
    }
}

pub type ConvertResult<T> = Result<T, ConvertError>;
