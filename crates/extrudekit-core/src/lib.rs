//! # ExtrudeKit Core
//!
//! Core types, errors, and events for ExtrudeKit.
//! Provides the error taxonomy shared by every layer, the event bus used to
//! report progress and results to the host, and the small value types that
//! travel between the converter, the scene, and the exporters.

pub mod error;
pub mod event_bus;
pub mod progress;
pub mod types;

pub use error::{Error, ErrorKind, Result};

// Re-export event bus for convenience
pub use event_bus::{
    AppEvent, ErrorEvent, EventBus, EventBusError, EventCategory, EventFilter, ExportEvent,
    ModelEvent, ProgressEvent, SubscriptionId,
};

pub use progress::{NoProgress, ProgressSink, ProgressTracker};

pub use types::{ExportFormat, ModelKind, Operation, ProgressCallback, SharedBus};
