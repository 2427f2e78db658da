//! # ExtrudeKit
//!
//! Turns flat SVG artwork into bevelled 3D solids (or loads a glTF asset),
//! frames a camera on the result, and exports the lit scene back out as SVG
//! or supersampled PNG.
//!
//! ## Architecture
//!
//! ExtrudeKit is organized as a workspace with multiple crates:
//!
//! 1. **extrudekit-core** - Errors, event bus, progress reporting
//! 2. **extrudekit-settings** - Parameter store, colours, configuration file
//! 3. **extrudekit-designer** - SVG to extruded, bevelled meshes
//! 4. **extrudekit-visualizer** - Scene, camera framing, lighting, export renderers
//! 5. **extrudekit** - Application context, command service, CLI

pub mod cli;
pub mod load;
pub mod service;
pub mod viewer;

pub use extrudekit_core::{AppEvent, Error, ErrorKind, EventBus, ModelKind, Result, SharedBus};
pub use extrudekit_settings::{AppConfig, Background, ParamChange, ParameterStore, Rgb};
pub use extrudekit_visualizer::{CameraFrame, ModelSummary, RasterExport, VectorExport};
pub use load::{LoadInput, LoadRequest};
pub use service::ViewerHandle;
pub use viewer::{Shortcut, Viewer, ViewerSnapshot};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Target triple the binary was built for
pub const BUILD_TARGET: &str = env!("BUILD_TARGET");

/// Version line printed by `--version`
pub const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("BUILD_DATE"),
    ", ",
    env!("BUILD_TARGET"),
    ")"
);

/// Initialize logging
///
/// Logs go to stderr so command output on stdout stays clean. `RUST_LOG`
/// takes precedence over `default_filter`.
pub fn init_logging(default_filter: &str) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(default_filter))?;

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}
