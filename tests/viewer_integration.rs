//! Application-context tests: loading, rebuild wiring, camera reset, exports

mod common;

use common::{svg_request, triangle_glb, Harness, EMPTY_SVG, SQUARES_SVG};
use extrudekit::{AppEvent, Background, ErrorKind, LoadRequest, ModelKind, ParamChange, Rgb};
use extrudekit_core::{ExportEvent, ModelEvent};
use extrudekit_settings::RebuildEffect;
use glam::Vec3;

fn first_mesh_positions(h: &Harness) -> Vec<Vec3> {
    h.viewer.scene().model().unwrap().meshes[0].mesh.positions.clone()
}

#[tokio::test]
async fn test_load_svg_frames_model_and_reports_progress() {
    let mut h = Harness::new();
    let summary = h.viewer.load(svg_request(SQUARES_SVG)).await.unwrap();
    assert_eq!(summary.kind, ModelKind::Vector);
    assert_eq!(summary.mesh_count, 2);

    let snapshot = h.viewer.snapshot();
    assert_eq!(Some(snapshot.camera), snapshot.initial_frame);

    let events = h.take_events();
    let progress: Vec<u8> = events
        .iter()
        .filter_map(|e| match e {
            AppEvent::Progress(p) => Some(p.percent),
            _ => None,
        })
        .collect();
    assert_eq!(progress.first(), Some(&10));
    assert_eq!(progress.last(), Some(&100));
    assert!(progress.windows(2).all(|w| w[0] <= w[1]));
    assert!(events.iter().any(|e| matches!(
        e,
        AppEvent::Model(ModelEvent::Loaded { mesh_count: 2, .. })
    )));
}

#[tokio::test]
async fn test_empty_geometry_keeps_previous_model() {
    let mut h = Harness::new();
    let before = h.viewer.load(svg_request(SQUARES_SVG)).await.unwrap();
    let frame = h.viewer.snapshot().initial_frame;

    let err = h.viewer.load(svg_request(EMPTY_SVG)).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::EmptyGeometry);

    let snapshot = h.viewer.snapshot();
    assert_eq!(snapshot.model, Some(before));
    assert_eq!(snapshot.initial_frame, frame);
    assert_eq!(
        h.errors(),
        vec!["Failed to load SVG file. The SVG doesn't contain any drawable shapes."]
    );
    assert!(matches!(
        h.take_events().last(),
        Some(AppEvent::Progress(p)) if p.is_hidden()
    ));
}

#[tokio::test]
async fn test_invalid_input_rejected_before_parsing() {
    let mut h = Harness::new();
    let err = h
        .viewer
        .load(LoadRequest::new("model.txt", SQUARES_SVG.as_bytes().to_vec()))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);

    let mut oversize = svg_request(SQUARES_SVG);
    oversize.file_size = 60 * 1024 * 1024;
    let err = h.viewer.load(oversize).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);

    assert!(!h.viewer.scene().has_model());
    let started = h
        .take_events()
        .iter()
        .any(|e| matches!(e, AppEvent::Progress(p) if !p.is_hidden()));
    assert!(!started);
}

#[tokio::test]
async fn test_material_change_leaves_geometry_alone() {
    let mut h = Harness::new();
    h.viewer.load(svg_request(SQUARES_SVG)).await.unwrap();
    let positions = first_mesh_positions(&h);
    let triangles = h.viewer.scene().model().unwrap().triangle_count();

    let effect = h.viewer.apply(ParamChange::Roughness(0.25)).await.unwrap();
    assert_eq!(effect, RebuildEffect::Material);

    let model = h.viewer.scene().model().unwrap();
    assert_eq!(first_mesh_positions(&h), positions);
    assert_eq!(model.triangle_count(), triangles);
    assert!(model.meshes.iter().all(|m| m.material.roughness == 0.25));
    assert_eq!(model.meshes[0].material.color, Rgb::from_u32(0xe53935));
}

#[tokio::test]
async fn test_geometry_change_rebuilds_vector_model() {
    let mut h = Harness::new();
    h.viewer.load(svg_request(SQUARES_SVG)).await.unwrap();
    let depth_before = h.viewer.scene().model().unwrap().local_bounds.size().z;
    h.viewer.camera_mut().orbit(1.0, 0.0);

    let effect = h.viewer.apply(ParamChange::Depth(60.0)).await.unwrap();
    assert_eq!(effect, RebuildEffect::Geometry);

    let depth_after = h.viewer.scene().model().unwrap().local_bounds.size().z;
    assert!((depth_after - depth_before - 4.0).abs() < 1e-4);
    let snapshot = h.viewer.snapshot();
    assert_eq!(Some(snapshot.camera), snapshot.initial_frame);
}

#[tokio::test]
async fn test_solid_asset_ignores_geometry_and_takes_store_colour() {
    let mut h = Harness::new();
    let summary = h
        .viewer
        .load(LoadRequest::new("part.glb", triangle_glb()))
        .await
        .unwrap();
    assert_eq!(summary.kind, ModelKind::Solid);
    assert!(h.viewer.scene().model().unwrap().bounds().center().length() < 1e-5);
    assert_eq!(
        h.viewer.scene().model().unwrap().meshes[0].material.color,
        h.viewer.params().color
    );

    let positions = first_mesh_positions(&h);
    assert_eq!(
        h.viewer.apply(ParamChange::BevelSize(3.0)).await.unwrap(),
        RebuildEffect::Geometry
    );
    assert_eq!(first_mesh_positions(&h), positions);

    h.viewer
        .apply(ParamChange::Color(Rgb::from_u32(0x00ff00)))
        .await
        .unwrap();
    assert_eq!(
        h.viewer.scene().model().unwrap().meshes[0].material.color,
        Rgb::from_u32(0x00ff00)
    );
}

#[tokio::test]
async fn test_lighting_and_background_changes() {
    let mut h = Harness::new();
    h.viewer
        .apply(ParamChange::DirectionalLight(2.0))
        .await
        .unwrap();
    let lights = &h.viewer.scene().lights;
    assert_eq!(lights.len(), 5);
    assert!((lights.get("key").unwrap().intensity - 2.4).abs() < 1e-6);
    assert!((lights.get("fill").unwrap().intensity - 0.8).abs() < 1e-6);

    let white = Background::Solid(Rgb::WHITE);
    assert_eq!(
        h.viewer.apply(ParamChange::Background(white)).await.unwrap(),
        RebuildEffect::Background
    );
    assert_eq!(h.viewer.scene().background, white);
}

#[tokio::test]
async fn test_non_finite_parameter_is_rejected() {
    let mut h = Harness::new();
    let before = h.viewer.params().clone();
    let err = h
        .viewer
        .apply(ParamChange::Roughness(f32::NAN))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
    assert_eq!(h.viewer.params(), &before);
    assert_eq!(h.errors().len(), 1);
}

#[tokio::test]
async fn test_reset_restores_load_time_frame() {
    let mut h = Harness::new();
    h.viewer.load(svg_request(SQUARES_SVG)).await.unwrap();
    let initial = h.viewer.snapshot().initial_frame.unwrap();

    let camera = h.viewer.camera_mut();
    camera.orbit(0.7, 0.2);
    camera.zoom(3.0);
    camera.pan(25.0, -10.0);
    assert_ne!(h.viewer.snapshot().camera, initial);

    assert_eq!(h.viewer.reset_camera(), Some(initial));
    assert_eq!(h.viewer.reset_camera(), Some(initial));
    assert_eq!(h.viewer.snapshot().camera, initial);
}

#[tokio::test]
async fn test_exports_match_viewport_and_leave_it_alone() {
    let mut h = Harness::new();
    h.viewer.load(svg_request(SQUARES_SVG)).await.unwrap();
    h.viewer.resize(160, 120);
    let camera = h.viewer.snapshot().camera;

    let raster = h.viewer.export_raster().await.unwrap();
    assert_eq!((raster.pixel_width, raster.pixel_height), (320, 240));
    let decoded = image::load_from_memory(&raster.bytes).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (320, 240));

    let vector = h.viewer.export_vector().await.unwrap();
    assert_eq!((vector.width, vector.height), (160, 120));
    assert!(vector.markup.starts_with("<svg"));

    assert_eq!((h.viewer.viewport().width, h.viewer.viewport().height), (160, 120));
    assert_eq!(h.viewer.snapshot().camera, camera);

    let formats: Vec<_> = h
        .take_events()
        .into_iter()
        .filter_map(|e| match e {
            AppEvent::Export(export) => Some(export.format()),
            _ => None,
        })
        .collect();
    assert_eq!(formats.len(), 2);
    assert!(matches!(
        formats.as_slice(),
        [extrudekit_core::ExportFormat::Png, extrudekit_core::ExportFormat::Svg]
    ));
}

#[tokio::test]
async fn test_export_after_clear_needs_model() {
    let mut h = Harness::new();
    h.viewer.load(svg_request(SQUARES_SVG)).await.unwrap();
    assert!(h.viewer.clear_model());
    assert!(h.viewer.snapshot().initial_frame.is_none());

    let err = h.viewer.export_vector().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NoModel);
    assert_eq!(h.errors(), vec!["Please load a model first."]);
    assert!(!h
        .take_events()
        .iter()
        .any(|e| matches!(e, AppEvent::Export(ExportEvent::VectorReady { .. }))));
}
