//! The application context.
//!
//! A [`Viewer`] owns the parameter store, the scene with its single current
//! model, the viewport, and the event bus. Every operation goes through
//! `&mut self`, so there is exactly one writer; [`crate::service`] puts a
//! command queue in front of it for hosts that trigger work concurrently.

use std::sync::Arc;

use extrudekit_core::{
    AppEvent, Error, ErrorEvent, ExportEvent, ExportFormat, ModelEvent, ModelKind,
    ProgressEvent, ProgressTracker, Result, SharedBus,
};
use extrudekit_designer::convert;
use extrudekit_settings::{AppConfig, ParamChange, ParameterStore, RebuildEffect};
use extrudekit_visualizer::{
    export_raster, export_vector, AssetLoadError, AssetLoader, Camera, CameraFrame, GltfLoader,
    Model, ModelSummary, RasterExport, Scene, VectorExport, Viewport,
};
use serde::Serialize;
use tracing::{debug, error, info};

use crate::load::{LoadInput, LoadRequest};

/// Markup of the current vector model, kept for geometry rebuilds
#[derive(Debug, Clone)]
struct VectorSource {
    file_name: String,
    markup: String,
}

/// Keyboard shortcuts understood by the viewer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shortcut {
    ResetCamera,
    ToggleAutoRotate,
    Refocus,
}

impl Shortcut {
    /// Map a key press; `ctrl` is Ctrl on Linux/Windows and Cmd on macOS
    pub fn from_key(key: char, ctrl: bool) -> Option<Self> {
        match (key.to_ascii_lowercase(), ctrl) {
            ('r', true) => Some(Shortcut::ResetCamera),
            ('a', true) | (' ', _) => Some(Shortcut::ToggleAutoRotate),
            ('f', true) => Some(Shortcut::Refocus),
            _ => None,
        }
    }
}

/// Read-only view of the viewer state for hosts
#[derive(Debug, Clone, Serialize)]
pub struct ViewerSnapshot {
    pub model: Option<ModelSummary>,
    pub camera: CameraFrame,
    pub initial_frame: Option<CameraFrame>,
    pub auto_rotate: bool,
    pub parameters: ParameterStore,
    pub viewport: Viewport,
}

pub struct Viewer {
    config: AppConfig,
    params: ParameterStore,
    scene: Scene,
    viewport: Viewport,
    bus: SharedBus,
    source: Option<VectorSource>,
    loaders: Vec<Box<dyn AssetLoader>>,
}

impl Viewer {
    pub fn new(config: AppConfig, bus: SharedBus) -> Self {
        let params = config.parameters.clone();
        let viewport = Viewport::from_settings(&config.viewport);
        let mut camera = Camera::from_settings(&config.camera);
        camera.update_aspect_ratio(viewport.width as f32, viewport.height as f32);

        Self {
            scene: Scene::new(camera, &params),
            params,
            viewport,
            config,
            bus,
            source: None,
            loaders: vec![Box::new(GltfLoader::new())],
        }
    }

    /// Register another solid-asset loader; earlier loaders win
    pub fn add_loader(&mut self, loader: Box<dyn AssetLoader>) {
        self.loaders.push(loader);
    }

    pub fn bus(&self) -> &SharedBus {
        &self.bus
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn params(&self) -> &ParameterStore {
        &self.params
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.scene.camera
    }

    fn publish(&self, event: AppEvent) {
        self.bus.publish(event).ok();
    }

    /// Surface an error to the host and hide any progress indicator
    fn report_error(&self, err: &Error) {
        error!("{}", err);
        self.publish(AppEvent::Error(ErrorEvent::new(err.user_message())));
        self.publish(AppEvent::Progress(ProgressEvent::hide()));
    }

    /// Validate, parse and install a new model.
    ///
    /// On any failure the previous model, frame and cached source stay as
    /// they were.
    pub async fn load(&mut self, request: LoadRequest) -> Result<ModelSummary> {
        let result = self.load_inner(request).await;
        if let Err(err) = &result {
            self.report_error(err);
        }
        result
    }

    async fn load_inner(&mut self, request: LoadRequest) -> Result<ModelSummary> {
        info!("Load requested: {} ({} bytes)", request.file_name, request.file_size);
        let input = request.validate(self.config.input.max_file_bytes)?;

        let bus = Arc::clone(&self.bus);
        let mut progress = ProgressTracker::new(bus.as_ref());

        let (model, source) = match input {
            LoadInput::Vector { file_name, markup } => {
                progress.report("Reading SVG file...", 10);
                let artwork = convert(&markup, &self.params, &mut progress).await?;
                let model = Model::from_artwork(artwork, file_name.as_str());
                (model, Some(VectorSource { file_name, markup }))
            }
            LoadInput::Solid {
                file_name,
                extension,
                bytes,
            } => {
                progress.report("Loading 3D model...", 10);
                let loader = self
                    .loaders
                    .iter()
                    .find(|l| l.supports(&extension))
                    .ok_or_else(|| AssetLoadError::UnsupportedExtension(extension.clone()))?;
                debug!("Using {} loader for {}", loader.name(), file_name);
                let model = loader.load(&bytes, &file_name, &self.params).await?;
                (model, None)
            }
        };

        let summary = self.install(model, source);
        progress.finish();
        Ok(summary)
    }

    fn install(&mut self, model: Model, source: Option<VectorSource>) -> ModelSummary {
        let summary = model.summary();
        self.scene.set_model(model);
        self.source = source;
        self.publish(AppEvent::Model(ModelEvent::Loaded {
            kind: summary.kind,
            file_name: summary.source_file.clone(),
            mesh_count: summary.mesh_count,
        }));
        summary
    }

    /// Apply one parameter change and run the rebuild it declares.
    ///
    /// Geometry changes only rebuild vector models. A failed rebuild keeps
    /// the current model and still leaves the new value in the store.
    pub async fn apply(&mut self, change: ParamChange) -> Result<RebuildEffect> {
        let effect = match self.params.apply(change) {
            Ok(effect) => effect,
            Err(err) => {
                let err = Error::invalid_input(err.to_string());
                self.report_error(&err);
                return Err(err);
            }
        };
        let applied = self.params.current(&change);

        match effect {
            RebuildEffect::Geometry => self.rebuild_geometry().await?,
            RebuildEffect::Material => {
                let updated = self.scene.apply_material_change(&applied);
                debug!("Updated {} materials for {}", updated, applied.key());
            }
            RebuildEffect::Lighting => self.scene.rebuild_lights(&self.params),
            RebuildEffect::Background => self.scene.set_background(self.params.background),
        }

        self.publish(AppEvent::Model(ModelEvent::ParametersApplied {
            effect: effect.to_string(),
        }));
        Ok(effect)
    }

    /// Apply several changes in order, stopping at the first failure
    pub async fn apply_all(&mut self, changes: &[ParamChange]) -> Result<()> {
        for change in changes {
            self.apply(*change).await?;
        }
        Ok(())
    }

    async fn rebuild_geometry(&mut self) -> Result<()> {
        let is_vector = self
            .scene
            .model()
            .is_some_and(|m| m.kind == ModelKind::Vector);
        let Some(source) = self.source.clone().filter(|_| is_vector) else {
            debug!("Geometry change ignored: no vector model");
            return Ok(());
        };

        info!("Rebuilding geometry for {}", source.file_name);
        let bus = Arc::clone(&self.bus);
        let mut progress = ProgressTracker::new(bus.as_ref());
        match convert(&source.markup, &self.params, &mut progress).await {
            Ok(artwork) => {
                let model = Model::from_artwork(artwork, source.file_name.as_str());
                self.install(model, Some(source));
                progress.finish();
                Ok(())
            }
            Err(err) => {
                let err = Error::from(err);
                self.report_error(&err);
                Err(err)
            }
        }
    }

    pub fn reset_camera(&mut self) -> Option<CameraFrame> {
        self.scene.reset_camera()
    }

    pub fn refocus(&mut self) -> Option<CameraFrame> {
        self.scene.refocus()
    }

    /// Flip auto-rotation; returns the new state
    pub fn toggle_auto_rotate(&mut self) -> bool {
        self.scene.camera.auto_rotate = !self.scene.camera.auto_rotate;
        debug!("Auto-rotate {}", self.scene.camera.auto_rotate);
        self.scene.camera.auto_rotate
    }

    /// Advance per-frame camera motion by `dt` seconds
    pub fn tick(&mut self, dt: f32) -> bool {
        self.scene.camera.advance(dt)
    }

    /// Run a keyboard shortcut; returns false when it did nothing
    pub fn handle_shortcut(&mut self, shortcut: Shortcut) -> bool {
        match shortcut {
            Shortcut::ResetCamera => self.reset_camera().is_some(),
            Shortcut::ToggleAutoRotate => {
                self.toggle_auto_rotate();
                true
            }
            Shortcut::Refocus => self.refocus().is_some(),
        }
    }

    /// Drop the current model so a new file can be chosen
    pub fn clear_model(&mut self) -> bool {
        self.source = None;
        let cleared = self.scene.clear_model().is_some();
        if cleared {
            info!("Model cleared");
            self.publish(AppEvent::Model(ModelEvent::Cleared));
        }
        cleared
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.viewport.resize(width, height);
        self.scene
            .camera
            .update_aspect_ratio(width as f32, height as f32);
        debug!("Viewport resized to {}x{}", width, height);
    }

    pub fn snapshot(&self) -> ViewerSnapshot {
        ViewerSnapshot {
            model: self.scene.model().map(Model::summary),
            camera: self.scene.camera.frame(),
            initial_frame: self.scene.initial_frame().copied(),
            auto_rotate: self.scene.camera.auto_rotate,
            parameters: self.params.clone(),
            viewport: self.viewport,
        }
    }

    pub async fn export_vector(&self) -> Result<VectorExport> {
        let mut progress = ProgressTracker::new(self.bus.as_ref());
        let result = export_vector(&self.scene, &self.viewport, &self.config.export, &mut progress)
            .await
            .map_err(|e| e.into_error(ExportFormat::Svg));

        match &result {
            Ok(export) => self.publish(AppEvent::Export(ExportEvent::VectorReady {
                markup: export.markup.clone(),
                width: export.width,
                height: export.height,
            })),
            Err(err) => self.report_error(err),
        }
        result
    }

    pub async fn export_raster(&self) -> Result<RasterExport> {
        let mut progress = ProgressTracker::new(self.bus.as_ref());
        let result = export_raster(&self.scene, &self.viewport, &self.config.export, &mut progress)
            .await
            .map_err(|e| e.into_error(ExportFormat::Png));

        match &result {
            Ok(export) => self.publish(AppEvent::Export(ExportEvent::RasterReady {
                bytes: export.bytes.clone(),
                width: export.width,
                height: export.height,
            })),
            Err(err) => self.report_error(err),
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use extrudekit_core::EventBus;

    fn viewer() -> Viewer {
        Viewer::new(AppConfig::default(), Arc::new(EventBus::new()))
    }

    #[test]
    fn test_shortcuts() {
        assert_eq!(Shortcut::from_key('r', true), Some(Shortcut::ResetCamera));
        assert_eq!(Shortcut::from_key('R', true), Some(Shortcut::ResetCamera));
        assert_eq!(Shortcut::from_key('r', false), None);
        assert_eq!(Shortcut::from_key(' ', false), Some(Shortcut::ToggleAutoRotate));
        assert_eq!(Shortcut::from_key('a', true), Some(Shortcut::ToggleAutoRotate));
        assert_eq!(Shortcut::from_key('f', true), Some(Shortcut::Refocus));
    }

    #[test]
    fn test_toggle_auto_rotate() {
        let mut viewer = viewer();
        assert!(!viewer.tick(1.0));
        assert!(viewer.handle_shortcut(Shortcut::ToggleAutoRotate));
        assert!(viewer.snapshot().auto_rotate);
        assert!(!viewer.toggle_auto_rotate());
    }

    #[test]
    fn test_shortcuts_without_model_do_nothing() {
        let mut viewer = viewer();
        let before = viewer.snapshot().camera;
        assert!(!viewer.handle_shortcut(Shortcut::ResetCamera));
        assert!(!viewer.handle_shortcut(Shortcut::Refocus));
        assert_eq!(viewer.snapshot().camera, before);
    }

    #[test]
    fn test_resize_updates_camera_aspect() {
        let mut viewer = viewer();
        viewer.resize(1000, 500);
        assert_eq!(viewer.viewport().width, 1000);
        assert_eq!(viewer.scene().camera.aspect_ratio, 2.0);
    }
}
