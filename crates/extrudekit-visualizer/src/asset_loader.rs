//! Loaders for pre-built 3D assets.
//!
//! A loaded asset keeps its native size. Node transforms are baked into the
//! vertices, the root is translated so the bounding-box centre sits at the
//! origin, and the store's colour, roughness and metalness replace the
//! asset's own.

use async_trait::async_trait;
use extrudekit_core::ModelKind;
use extrudekit_designer::{Aabb, MeshData, PhysicalMaterial};
use extrudekit_settings::{ParameterStore, Rgb};
use glam::{Mat3, Mat4, Vec3};
use tracing::{debug, info, warn};

use crate::error::AssetLoadError;
use crate::scene::{Model, SceneMesh};

/// Something that turns asset bytes into a scene model
#[async_trait]
pub trait AssetLoader: Send + Sync {
    /// Short name for logs
    fn name(&self) -> &'static str;

    /// Whether this loader handles the extension (lower-case, no dot)
    fn supports(&self, extension: &str) -> bool;

    /// Parse `bytes` into a model
    async fn load(
        &self,
        bytes: &[u8],
        file_name: &str,
        params: &ParameterStore,
    ) -> Result<Model, AssetLoadError>;
}

/// glTF 2.0 loader for `.glb` and self-contained `.gltf`
#[derive(Debug, Default, Clone, Copy)]
pub struct GltfLoader;

impl GltfLoader {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AssetLoader for GltfLoader {
    fn name(&self) -> &'static str {
        "gltf"
    }

    fn supports(&self, extension: &str) -> bool {
        matches!(extension, "glb" | "gltf")
    }

    async fn load(
        &self,
        bytes: &[u8],
        file_name: &str,
        params: &ParameterStore,
    ) -> Result<Model, AssetLoadError> {
        let (document, buffers, _images) =
            gltf::import_slice(bytes).map_err(|e| AssetLoadError::Gltf(e.to_string()))?;
        tokio::task::yield_now().await;

        let scene = document
            .default_scene()
            .or_else(|| document.scenes().next())
            .ok_or(AssetLoadError::NoGeometry)?;

        let mut meshes = Vec::new();
        for node in scene.nodes() {
            collect_node(&node, Mat4::IDENTITY, &buffers, params, &mut meshes)?;
        }
        if meshes.is_empty() {
            return Err(AssetLoadError::NoGeometry);
        }

        let bounds = meshes
            .iter()
            .fold(Aabb::empty(), |acc, m: &SceneMesh| acc.union(&m.mesh.bounds()));
        let root = Mat4::from_translation(-bounds.center());
        let model = Model::from_meshes(ModelKind::Solid, root, meshes, file_name);

        let size = bounds.size();
        info!(
            "glTF loaded: {} meshes, {} triangles, dimensions: {:.2} x {:.2} x {:.2}",
            model.mesh_count(),
            model.triangle_count(),
            size.x,
            size.y,
            size.z
        );
        Ok(model)
    }
}

fn collect_node(
    node: &gltf::Node<'_>,
    parent: Mat4,
    buffers: &[gltf::buffer::Data],
    params: &ParameterStore,
    out: &mut Vec<SceneMesh>,
) -> Result<(), AssetLoadError> {
    let world = parent * Mat4::from_cols_array_2d(&node.transform().matrix());

    if let Some(mesh) = node.mesh() {
        for primitive in mesh.primitives() {
            if primitive.mode() != gltf::mesh::Mode::Triangles {
                warn!(
                    "Skipping mesh {} primitive {}: mode {:?}",
                    mesh.index(),
                    primitive.index(),
                    primitive.mode()
                );
                continue;
            }
            let data = read_primitive(&primitive, buffers, &world).map_err(|reason| {
                AssetLoadError::Primitive {
                    mesh: mesh.index(),
                    primitive: primitive.index(),
                    reason,
                }
            })?;

            let [r, g, b, _] = primitive
                .material()
                .pbr_metallic_roughness()
                .base_color_factor();
            let mut material = PhysicalMaterial::for_solid(params, Some(Rgb::from_f32([r, g, b])));
            material.override_from(params);

            out.push(SceneMesh {
                mesh: data,
                material,
                cast_shadow: true,
                receive_shadow: true,
            });
        }
    }

    for child in node.children() {
        collect_node(&child, world, buffers, params, out)?;
    }
    Ok(())
}

fn read_primitive(
    primitive: &gltf::Primitive<'_>,
    buffers: &[gltf::buffer::Data],
    world: &Mat4,
) -> Result<MeshData, String> {
    let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(|d| d.0.as_slice()));

    let positions: Vec<Vec3> = reader
        .read_positions()
        .ok_or_else(|| "missing POSITION attribute".to_string())?
        .map(|p| world.transform_point3(Vec3::from_array(p)))
        .collect();

    let indices: Vec<u32> = match reader.read_indices() {
        Some(indices) => indices.into_u32().collect(),
        None => (0..positions.len() as u32).collect(),
    };
    if indices.len() % 3 != 0 {
        return Err(format!("{} indices is not a triangle list", indices.len()));
    }
    if let Some(bad) = indices.iter().find(|&&i| i as usize >= positions.len()) {
        return Err(format!("index {} out of range", bad));
    }

    let normal_matrix = Mat3::from_mat4(world.inverse().transpose());
    let normals: Vec<Vec3> = match reader.read_normals() {
        Some(normals) => normals
            .map(|n| (normal_matrix * Vec3::from_array(n)).normalize_or_zero())
            .collect(),
        None => {
            debug!("Primitive {} has no normals, computing", primitive.index());
            vertex_normals(&positions, &indices)
        }
    };
    if normals.len() != positions.len() {
        return Err("NORMAL count differs from POSITION count".to_string());
    }

    Ok(MeshData {
        positions,
        normals,
        indices,
    })
}

/// Area-weighted vertex normals
fn vertex_normals(positions: &[Vec3], indices: &[u32]) -> Vec<Vec3> {
    let mut normals = vec![Vec3::ZERO; positions.len()];
    for tri in indices.chunks_exact(3) {
        let (a, b, c) = (tri[0] as usize, tri[1] as usize, tri[2] as usize);
        let n = (positions[b] - positions[a]).cross(positions[c] - positions[a]);
        normals[a] += n;
        normals[b] += n;
        normals[c] += n;
    }
    normals.iter().map(|n| n.normalize_or_zero()).collect()
}
