//! Vector artwork to extruded solids.
//!
//! Runs the whole pipeline for one markup string: sanitize, parse, decompose
//! every path into shapes, extrude each shape, and compute the placement that
//! centres, scales, and turns the group for the default view.

use extrudekit_core::ProgressTracker;
use extrudekit_settings::{ParamChange, ParameterStore};
use glam::{Mat4, Vec2, Vec3};
use tracing::{debug, info, warn};

use crate::document::parse_document;
use crate::error::{ConvertError, ConvertResult};
use crate::extrude::{extrude_shape, ExtrudeOptions};
use crate::material::PhysicalMaterial;
use crate::mesh::{Aabb, MeshData};
use crate::sanitize::sanitize_markup;
use crate::shapes::shapes_from_path;

/// Scene units spanned by the larger side of the source artwork
pub const SCENE_EXTENT: f32 = 8.0;
/// Turn about +Y applied to every vector model
pub const DEFAULT_YAW: f32 = std::f32::consts::FRAC_PI_4;

/// One extruded shape with its own material
#[derive(Debug, Clone)]
pub struct ExtrudedSolid {
    pub mesh: MeshData,
    pub material: PhysicalMaterial,
    pub cast_shadow: bool,
    pub receive_shadow: bool,
    /// Source element id or tag, for logs
    pub label: String,
}

/// The converted group of solids and its placement in the scene
#[derive(Debug, Clone)]
pub struct VectorArtwork {
    pub solids: Vec<ExtrudedSolid>,
    /// Centre, scale, then yaw; applied on top of the solids' own vertices
    pub placement: Mat4,
    pub source_width: f32,
    pub source_height: f32,
    /// Bounds of the unplaced group
    pub local_bounds: Aabb,
    /// Uniform scale folded into `placement`, 1 when scaling was skipped
    pub scale: f32,
}

impl VectorArtwork {
    /// Bounds after placement
    pub fn bounds(&self) -> Aabb {
        self.local_bounds.transformed(&self.placement)
    }

    /// Bounds after centring and scaling, before the yaw
    pub fn scaled_bounds(&self) -> Aabb {
        let center = self.local_bounds.center();
        self.local_bounds
            .transformed(&(Mat4::from_scale(Vec3::splat(self.scale)) * Mat4::from_translation(-center)))
    }

    pub fn mesh_count(&self) -> usize {
        self.solids.len()
    }

    /// Apply a material field to every solid; returns how many changed
    pub fn apply_material_change(&mut self, change: &ParamChange) -> usize {
        self.solids
            .iter_mut()
            .map(|solid| solid.material.apply_change(change))
            .filter(|changed| *changed)
            .count()
    }
}

/// Convert markup into extruded solids.
///
/// Reports milestones 40 through 85 on `progress`; the caller owns the
/// surrounding milestones. Paths that fail are skipped with a warning.
pub async fn convert(
    markup: &str,
    params: &ParameterStore,
    progress: &mut ProgressTracker<'_>,
) -> ConvertResult<VectorArtwork> {
    progress.report("Processing SVG content...", 40);
    let cleaned = sanitize_markup(markup);
    let document = parse_document(&cleaned)?;
    debug!(
        "Parsed SVG: {} paths, extent {}x{}",
        document.paths.len(),
        document.width,
        document.height
    );

    progress.report("Cleaning SVG elements...", 50);
    tokio::task::yield_now().await;

    progress.report("Creating 3D geometry...", 60);
    let options = ExtrudeOptions::from_params(params);
    let total = document.paths.len();
    let mut solids = Vec::new();

    for (index, svg_path) in document.paths.iter().enumerate() {
        let mut shapes = shapes_from_path(&svg_path.path, svg_path.fill_rule, options.curve_segments);
        if shapes.is_empty() {
            warn!("No shapes created from path {} ({})", index, svg_path.label);
            continue;
        }

        progress.step(
            format!("Building 3D shapes... {}/{}", index + 1, total),
            index,
            total,
            60,
            20,
        );

        for shape in shapes.iter_mut() {
            // Markup is y-down, the scene is y-up
            shape.map_points(|p| Vec2::new(p.x, -p.y));
            match extrude_shape(shape, &options) {
                Ok(mesh) => solids.push(ExtrudedSolid {
                    mesh,
                    material: PhysicalMaterial::for_vector(params, svg_path.fill),
                    cast_shadow: true,
                    receive_shadow: true,
                    label: svg_path.label.clone(),
                }),
                Err(e) => warn!("Skipping shape in path {} ({}): {}", index, svg_path.label, e),
            }
        }
        tokio::task::yield_now().await;
    }

    if solids.is_empty() {
        return Err(ConvertError::EmptyGeometry);
    }

    progress.report("Finalizing model...", 85);
    let artwork = assemble(solids, document.width, document.height);
    let size = artwork.local_bounds.size();
    info!(
        "SVG loaded successfully: {} meshes, dimensions: {:.2} x {:.2} x {:.2}",
        artwork.mesh_count(),
        size.x,
        size.y,
        size.z
    );
    Ok(artwork)
}

/// Compute the group placement for a set of solids
pub fn assemble(solids: Vec<ExtrudedSolid>, source_width: f32, source_height: f32) -> VectorArtwork {
    let local_bounds = solids
        .iter()
        .fold(Aabb::empty(), |acc, solid| acc.union(&solid.mesh.bounds()));

    let source_max = source_width.max(source_height);
    let scale = if local_bounds.max_dimension() > 0.0 && source_max > 0.0 {
        SCENE_EXTENT / source_max
    } else {
        1.0
    };

    let placement = Mat4::from_rotation_y(DEFAULT_YAW)
        * Mat4::from_scale(Vec3::splat(scale))
        * Mat4::from_translation(-local_bounds.center());

    VectorArtwork {
        solids,
        placement,
        source_width,
        source_height,
        local_bounds,
        scale,
    }
}
