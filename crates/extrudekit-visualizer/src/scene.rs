//! Scene state: the single current model, camera, lights, and background.

use extrudekit_core::ModelKind;
use extrudekit_designer::{Aabb, ExtrudedSolid, MeshData, PhysicalMaterial, VectorArtwork};
use extrudekit_settings::{Background, ParamChange, ParameterStore};
use glam::Mat4;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::camera::Camera;
use crate::framing::{frame_for, CameraFrame};
use crate::lighting::LightRig;

/// A mesh in the scene graph with its material
#[derive(Debug, Clone)]
pub struct SceneMesh {
    pub mesh: MeshData,
    pub material: PhysicalMaterial,
    pub cast_shadow: bool,
    pub receive_shadow: bool,
}

impl From<ExtrudedSolid> for SceneMesh {
    fn from(solid: ExtrudedSolid) -> Self {
        Self {
            mesh: solid.mesh,
            material: solid.material,
            cast_shadow: solid.cast_shadow,
            receive_shadow: solid.receive_shadow,
        }
    }
}

/// The loaded model: one root transform over all of its meshes
#[derive(Debug, Clone)]
pub struct Model {
    pub kind: ModelKind,
    pub root: Mat4,
    pub meshes: Vec<SceneMesh>,
    /// Bounds of the meshes before the root transform
    pub local_bounds: Aabb,
    pub source_file: String,
}

impl Model {
    pub fn from_artwork(artwork: VectorArtwork, source_file: impl Into<String>) -> Self {
        Self {
            kind: ModelKind::Vector,
            root: artwork.placement,
            local_bounds: artwork.local_bounds,
            meshes: artwork.solids.into_iter().map(SceneMesh::from).collect(),
            source_file: source_file.into(),
        }
    }

    pub fn from_meshes(
        kind: ModelKind,
        root: Mat4,
        meshes: Vec<SceneMesh>,
        source_file: impl Into<String>,
    ) -> Self {
        let local_bounds = meshes
            .iter()
            .fold(Aabb::empty(), |acc, m| acc.union(&m.mesh.bounds()));
        Self {
            kind,
            root,
            meshes,
            local_bounds,
            source_file: source_file.into(),
        }
    }

    /// Scene-space bounding volume
    pub fn bounds(&self) -> Aabb {
        self.local_bounds.transformed(&self.root)
    }

    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.meshes.iter().map(|m| m.mesh.triangle_count()).sum()
    }

    /// Update one material field on every mesh; returns how many changed
    pub fn apply_material_change(&mut self, change: &ParamChange) -> usize {
        self.meshes
            .iter_mut()
            .map(|m| m.material.apply_change(change))
            .filter(|changed| *changed)
            .count()
    }

    pub fn summary(&self) -> ModelSummary {
        let bounds = self.bounds();
        ModelSummary {
            kind: self.kind,
            source_file: self.source_file.clone(),
            mesh_count: self.mesh_count(),
            triangle_count: self.triangle_count(),
            bounds_min: bounds.min.to_array(),
            bounds_max: bounds.max.to_array(),
        }
    }
}

/// Read-only description of the current model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSummary {
    pub kind: ModelKind,
    pub source_file: String,
    pub mesh_count: usize,
    pub triangle_count: usize,
    pub bounds_min: [f32; 3],
    pub bounds_max: [f32; 3],
}

/// Everything the renderers draw
#[derive(Debug, Clone)]
pub struct Scene {
    pub camera: Camera,
    pub lights: LightRig,
    pub background: Background,
    model: Option<Model>,
    initial_frame: Option<CameraFrame>,
}

impl Scene {
    pub fn new(camera: Camera, params: &ParameterStore) -> Self {
        Self {
            camera,
            lights: LightRig::build(params),
            background: params.background,
            model: None,
            initial_frame: None,
        }
    }

    pub fn model(&self) -> Option<&Model> {
        self.model.as_ref()
    }

    pub fn model_mut(&mut self) -> Option<&mut Model> {
        self.model.as_mut()
    }

    pub fn has_model(&self) -> bool {
        self.model.is_some()
    }

    pub fn initial_frame(&self) -> Option<&CameraFrame> {
        self.initial_frame.as_ref()
    }

    /// Install a new model, dropping the previous one, and frame it
    pub fn set_model(&mut self, model: Model) -> Option<Model> {
        info!(
            "Model set: {} ({}), {} meshes",
            model.source_file,
            model.kind,
            model.mesh_count()
        );
        let previous = self.model.replace(model);
        self.initial_frame = None;
        self.refocus();
        previous
    }

    /// Remove the model and forget its cached frame
    pub fn clear_model(&mut self) -> Option<Model> {
        self.initial_frame = None;
        self.model.take()
    }

    /// Recompute the default frame for the current model and cache it
    pub fn refocus(&mut self) -> Option<CameraFrame> {
        let model = self.model.as_ref()?;
        let frame = frame_for(&model.bounds(), Some(model.kind));
        self.camera.set_frame(&frame);
        self.initial_frame = Some(frame);
        Some(frame)
    }

    /// Return the camera to the cached frame.
    ///
    /// Falls back to [`Scene::refocus`] when a model exists without a cached
    /// frame; does nothing without a model.
    pub fn reset_camera(&mut self) -> Option<CameraFrame> {
        if self.model.is_none() {
            return None;
        }
        match self.initial_frame {
            Some(frame) => {
                self.camera.set_frame(&frame);
                debug!("Camera reset to initial view");
                Some(frame)
            }
            None => self.refocus(),
        }
    }

    pub fn rebuild_lights(&mut self, params: &ParameterStore) {
        self.lights.rebuild(params);
    }

    pub fn set_background(&mut self, background: Background) {
        self.background = background;
    }

    /// Apply a material change to the current model, if any
    pub fn apply_material_change(&mut self, change: &ParamChange) -> usize {
        self.model
            .as_mut()
            .map(|m| m.apply_material_change(change))
            .unwrap_or(0)
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new(Camera::default(), &ParameterStore::default())
    }
}
