//! Error handling for ExtrudeKit
//!
//! Every failure the viewer can surface is one of a small, closed set of
//! kinds. Lower layers keep their own detailed error enums and convert into
//! [`Error`] at the crate boundary, so the host only ever sees this type.
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

use crate::types::{ExportFormat, Operation};

/// Main error type for ExtrudeKit
///
/// A unified error type that can represent any error from all layers.
/// This is the primary error type used in public APIs.
#[derive(Error, Debug)]
pub enum Error {
    /// The load request was rejected before any parsing began
    #[error("Invalid input: {reason}")]
    InvalidInput {
        /// Human-readable reason shown to the user.
        reason: String,
    },

    /// The vector document could not be parsed
    #[error("SVG parse error: {0}")]
    Parse(String),

    /// The vector document parsed but produced no solids
    #[error("No valid shapes found in SVG")]
    EmptyGeometry,

    /// The solid-asset loader failed
    #[error("Asset load error: {0}")]
    AssetLoad(String),

    /// Rendering or encoding an export failed
    #[error("{format} export failed: {reason}")]
    Export {
        /// The export path that failed.
        format: ExportFormat,
        /// The reason the export failed.
        reason: String,
    },

    /// Another operation of the same kind is still in flight
    #[error("Another {operation} is already in progress")]
    Busy {
        /// The operation that is already running.
        operation: Operation,
    },

    /// An operation that needs a model was invoked without one
    #[error("No model loaded")]
    NoModel,

    /// The viewer task has shut down and can take no more commands
    #[error("Viewer stopped")]
    Stopped,

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse classification of [`Error`] values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Rejected load request.
    InvalidInput,
    /// Structural parse failure.
    Parse,
    /// Valid parse, zero usable shapes.
    EmptyGeometry,
    /// Solid-asset loader failure.
    AssetLoad,
    /// Renderer or encoder failure.
    Export,
    /// Busy-state guard rejection.
    Busy,
    /// Missing model.
    NoModel,
    /// Viewer task gone.
    Stopped,
    /// Filesystem failure.
    Io,
}

impl Error {
    /// Create an invalid-input error from a reason string
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Error::InvalidInput {
            reason: reason.into(),
        }
    }

    /// Create an export error for the given format
    pub fn export(format: ExportFormat, reason: impl Into<String>) -> Self {
        Error::Export {
            format,
            reason: reason.into(),
        }
    }

    /// Get the kind of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidInput { .. } => ErrorKind::InvalidInput,
            Error::Parse(_) => ErrorKind::Parse,
            Error::EmptyGeometry => ErrorKind::EmptyGeometry,
            Error::AssetLoad(_) => ErrorKind::AssetLoad,
            Error::Export { .. } => ErrorKind::Export,
            Error::Busy { .. } => ErrorKind::Busy,
            Error::NoModel => ErrorKind::NoModel,
            Error::Stopped => ErrorKind::Stopped,
            Error::Io(_) => ErrorKind::Io,
        }
    }

    /// The message shown at the UI boundary for this error
    pub fn user_message(&self) -> String {
        match self {
            Error::InvalidInput { reason } => reason.clone(),
            Error::Parse(_) => {
                "Failed to load SVG file. The SVG contains invalid syntax.".to_string()
            }
            Error::EmptyGeometry => {
                "Failed to load SVG file. The SVG doesn't contain any drawable shapes.".to_string()
            }
            Error::AssetLoad(_) => {
                "Failed to load 3D model. Please check the file format.".to_string()
            }
            Error::Export { format, .. } => {
                format!("Failed to export to {}. Please try again.", format)
            }
            Error::Busy { operation } => {
                format!("Please wait for the current {} to finish.", operation)
            }
            Error::NoModel => "Please load a model first.".to_string(),
            Error::Stopped => "The viewer is no longer running.".to_string(),
            Error::Io(_) => "Failed to load SVG file. Please check the file format.".to_string(),
        }
    }

    /// Check if this error left the prior model untouched
    ///
    /// Every error does; this only distinguishes load failures from the rest
    /// for callers that want to re-enable a file picker.
    pub fn is_load_error(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::InvalidInput | ErrorKind::Parse | ErrorKind::EmptyGeometry | ErrorKind::AssetLoad
        )
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;
