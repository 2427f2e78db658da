//! # ExtrudeKit Designer
//!
//! Turns flat vector artwork into bevelled 3D solids.
//!
//! ## Pipeline
//!
//! ```text
//! markup
//!   ├── sanitize      (declarations, doctype, typographic symbols)
//!   ├── document      (element tree, fills, transforms, extent)
//!   │     └── path_data / svg_transform
//!   ├── shapes        (curve sampling, outer/hole classification)
//!   ├── extrude       (caps, walls, quarter-round bevel)
//!   └── converter     (materials, progress, centre/scale/yaw placement)
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use extrudekit_core::{NoProgress, ProgressTracker};
//! use extrudekit_designer::convert;
//! use extrudekit_settings::ParameterStore;
//!
//! let sink = NoProgress;
//! let mut progress = ProgressTracker::new(&sink);
//! let artwork = convert(markup, &ParameterStore::default(), &mut progress).await?;
//! println!("{} meshes", artwork.mesh_count());
//! ```

pub mod converter;
pub mod document;
pub mod error;
pub mod extrude;
pub mod material;
pub mod mesh;
pub mod path_data;
pub mod sanitize;
pub mod shapes;
pub mod svg_transform;

pub use converter::{assemble, convert, ExtrudedSolid, VectorArtwork, DEFAULT_YAW, SCENE_EXTENT};
pub use document::{parse_document, FillRule, SvgDocument, SvgPath, DEFAULT_EXTENT};
pub use error::{ConvertError, ConvertResult};
pub use extrude::{extrude_shape, ExtrudeOptions};
pub use material::{PhysicalMaterial, Side, MIN_VECTOR_CLEARCOAT, MIN_VECTOR_ROUGHNESS};
pub use mesh::{Aabb, MeshData};
pub use path_data::parse_path_data;
pub use sanitize::{prepare_for_host, sanitize_markup};
pub use shapes::{shapes_from_path, Shape};
pub use svg_transform::parse_transform;
