//! # ExtrudeKit Visualizer
//!
//! Scene state, camera framing, lighting, asset loading, and the two export
//! renderers for ExtrudeKit.
//!
//! Exports project the live [`Scene`] through its own camera into a single
//! depth-sorted [`RenderList`], then serialize that list as SVG paths or
//! rasterize it into an off-screen PNG surface.

pub mod asset_loader;
pub mod camera;
pub mod error;
pub mod export;
pub mod framing;
pub mod lighting;
pub mod projector;
pub mod raster_export;
pub mod scene;
pub mod shading;
pub mod svg_export;
pub mod viewport;

pub use asset_loader::{AssetLoader, GltfLoader};
pub use camera::Camera;
pub use error::{AssetLoadError, ExportError, ExportResult};
pub use export::{export_raster, export_vector, RasterExport, VectorExport};
pub use framing::{
    distance_multiplier, frame_for, CameraFrame, DEFAULT_MULTIPLIER, MIN_FRAME_DISTANCE,
    SOLID_MULTIPLIER, VECTOR_MULTIPLIER,
};
pub use lighting::{Light, LightKind, LightRig, ShadowSettings};
pub use projector::{project_scene, RenderList, RenderPolygon};
pub use scene::{Model, ModelSummary, Scene, SceneMesh};
pub use shading::{shade, Shade};
pub use viewport::{OffscreenSurface, Viewport};
