//! Event type definitions for the event bus.
//!
//! Events are cloneable and serializable so a host can forward them over
//! whatever transport it uses.

use serde::{Deserialize, Serialize};

use crate::types::{ExportFormat, ModelKind};

/// Root event enum for all application events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AppEvent {
    /// Progress milestones for long-running operations
    Progress(ProgressEvent),
    /// Current-model lifecycle
    Model(ModelEvent),
    /// Finished exports
    Export(ExportEvent),
    /// Errors surfaced to the UI
    Error(ErrorEvent),
}

impl AppEvent {
    /// Get the category of this event
    pub fn category(&self) -> EventCategory {
        match self {
            AppEvent::Progress(_) => EventCategory::Progress,
            AppEvent::Model(_) => EventCategory::Model,
            AppEvent::Export(_) => EventCategory::Export,
            AppEvent::Error(_) => EventCategory::Error,
        }
    }

    /// Get a short description of this event for logging
    pub fn description(&self) -> String {
        match self {
            AppEvent::Progress(e) => e.description(),
            AppEvent::Model(e) => e.description(),
            AppEvent::Export(e) => e.description(),
            AppEvent::Error(e) => e.description(),
        }
    }
}

/// Event category for filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventCategory {
    /// Progress milestones.
    Progress,
    /// Model lifecycle events.
    Model,
    /// Export completions.
    Export,
    /// Error events.
    Error,
}

impl std::fmt::Display for EventCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventCategory::Progress => write!(f, "Progress"),
            EventCategory::Model => write!(f, "Model"),
            EventCategory::Export => write!(f, "Export"),
            EventCategory::Error => write!(f, "Error"),
        }
    }
}

/// A single progress milestone.
///
/// An empty message means the indicator should be hidden.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressEvent {
    /// Label shown next to the indicator.
    pub message: String,
    /// Completion percentage, `0..=100`.
    pub percent: u8,
}

impl ProgressEvent {
    /// Create a milestone, clamping the percentage to 100
    pub fn new(message: impl Into<String>, percent: u8) -> Self {
        Self {
            message: message.into(),
            percent: percent.min(100),
        }
    }

    /// The terminal milestone that hides the indicator
    pub fn hide() -> Self {
        Self::new("", 100)
    }

    /// Whether this milestone hides the indicator
    pub fn is_hidden(&self) -> bool {
        self.message.is_empty()
    }

    fn description(&self) -> String {
        if self.is_hidden() {
            format!("Progress: done ({}%)", self.percent)
        } else {
            format!("Progress: {} ({}%)", self.message, self.percent)
        }
    }
}

/// Current-model lifecycle events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ModelEvent {
    /// A new model replaced the previous one.
    Loaded {
        /// Vector or solid.
        kind: ModelKind,
        /// Name of the source file.
        file_name: String,
        /// Number of meshes under the model root.
        mesh_count: usize,
    },
    /// The model was detached and released.
    Cleared,
    /// A parameter change was applied.
    ParametersApplied {
        /// What was rebuilt, e.g. "geometry" or "lighting".
        effect: String,
    },
}

impl ModelEvent {
    fn description(&self) -> String {
        match self {
            ModelEvent::Loaded {
                kind,
                file_name,
                mesh_count,
            } => format!("Loaded {} model {} ({} meshes)", kind, file_name, mesh_count),
            ModelEvent::Cleared => "Model cleared".to_string(),
            ModelEvent::ParametersApplied { effect } => format!("Parameters applied: {}", effect),
        }
    }
}

/// Finished exports, handed to the host boundary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ExportEvent {
    /// Vector markup is ready.
    VectorReady {
        /// The serialized markup.
        markup: String,
        /// Width in pixels.
        width: u32,
        /// Height in pixels.
        height: u32,
    },
    /// Encoded raster bytes are ready.
    RasterReady {
        /// Encoded image bytes.
        bytes: Vec<u8>,
        /// Viewport width in pixels.
        width: u32,
        /// Viewport height in pixels.
        height: u32,
    },
}

impl ExportEvent {
    /// Which export path produced this event
    pub fn format(&self) -> ExportFormat {
        match self {
            ExportEvent::VectorReady { .. } => ExportFormat::Svg,
            ExportEvent::RasterReady { .. } => ExportFormat::Png,
        }
    }

    fn description(&self) -> String {
        match self {
            ExportEvent::VectorReady {
                markup,
                width,
                height,
            } => format!("SVG export {}x{} ({} bytes)", width, height, markup.len()),
            ExportEvent::RasterReady {
                bytes,
                width,
                height,
            } => format!("PNG export {}x{} ({} bytes)", width, height, bytes.len()),
        }
    }
}

/// An error surfaced to the UI
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEvent {
    /// Human-readable message.
    pub message: String,
}

impl ErrorEvent {
    /// Create an error event
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    fn description(&self) -> String {
        format!("Error: {}", self.message)
    }
}
