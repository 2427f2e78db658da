//! End-to-end export tests: convert artwork, frame it, export both ways

use extrudekit_core::{NoProgress, ProgressEvent, ProgressTracker};
use extrudekit_designer::convert;
use extrudekit_settings::{Background, ExportSettings, ParameterStore, Rgb};
use extrudekit_visualizer::{
    export_raster, export_vector, ExportError, Model, Scene, Viewport,
};
use parking_lot::Mutex;

const ARTWORK: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 100 100">
    <rect x="10" y="10" width="80" height="80" fill="#cc3300"/>
</svg>"##;

async fn scene_with_artwork(params: &ParameterStore) -> Scene {
    let sink = NoProgress;
    let mut progress = ProgressTracker::new(&sink);
    let artwork = convert(ARTWORK, params, &mut progress).await.unwrap();
    let mut scene = Scene::new(Default::default(), params);
    scene.set_model(Model::from_artwork(artwork, "square.svg"));
    scene
}

#[tokio::test]
async fn test_raster_export_is_twice_viewport() {
    let scene = scene_with_artwork(&ParameterStore::default()).await;
    let viewport = Viewport::new(120, 90);
    let sink = NoProgress;
    let mut progress = ProgressTracker::new(&sink);

    let export = export_raster(&scene, &viewport, &ExportSettings::default(), &mut progress)
        .await
        .unwrap();

    assert_eq!((export.width, export.height), (120, 90));
    assert_eq!((export.pixel_width, export.pixel_height), (240, 180));
    let decoded = image::load_from_memory(&export.bytes).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (240, 180));
}

#[tokio::test]
async fn test_raster_background_follows_scene() {
    let params = ParameterStore {
        background: Background::Solid(Rgb::from_u32(0x0000ff)),
        ..Default::default()
    };
    let scene = scene_with_artwork(&params).await;
    let sink = NoProgress;
    let mut progress = ProgressTracker::new(&sink);
    let export = export_raster(
        &scene,
        &Viewport::new(64, 64),
        &ExportSettings::default(),
        &mut progress,
    )
    .await
    .unwrap();

    let image = image::load_from_memory(&export.bytes).unwrap().to_rgba8();
    assert_eq!(image.get_pixel(0, 0).0, [0, 0, 255, 255]);

    let transparent = scene_with_artwork(&ParameterStore::default()).await;
    let mut progress = ProgressTracker::new(&sink);
    let export = export_raster(
        &transparent,
        &Viewport::new(64, 64),
        &ExportSettings::default(),
        &mut progress,
    )
    .await
    .unwrap();
    let image = image::load_from_memory(&export.bytes).unwrap().to_rgba8();
    assert_eq!(image.get_pixel(0, 0).0[3], 0);
}

#[tokio::test]
async fn test_vector_export_markup() {
    let scene = scene_with_artwork(&ParameterStore::default()).await;
    let viewport = Viewport::new(200, 150);
    let sink = NoProgress;
    let mut progress = ProgressTracker::new(&sink);

    let export = export_vector(&scene, &viewport, &ExportSettings::default(), &mut progress)
        .await
        .unwrap();

    assert_eq!((export.width, export.height), (200, 150));
    assert!(export.markup.starts_with("<svg"));
    assert!(export.markup.ends_with("</svg>"));
    assert!(export.markup.contains(r#"xmlns="http://www.w3.org/2000/svg""#));
    assert!(export.markup.contains("<path "));
    assert!(export.markup.contains("stroke-linecap:round\""));
    assert!(!export.markup.contains("fill: "));
}

#[tokio::test]
async fn test_export_progress_milestones() {
    let scene = scene_with_artwork(&ParameterStore::default()).await;
    let viewport = Viewport::new(50, 50);
    let settings = ExportSettings::default();

    let sink: Mutex<Vec<ProgressEvent>> = Mutex::new(Vec::new());
    let mut progress = ProgressTracker::new(&sink);
    export_vector(&scene, &viewport, &settings, &mut progress)
        .await
        .unwrap();
    let seen: Vec<u8> = sink.lock().drain(..).map(|e| e.percent).collect();
    assert_eq!(seen, vec![0, 20, 40, 85, 100]);

    let mut progress = ProgressTracker::new(&sink);
    export_raster(&scene, &viewport, &settings, &mut progress)
        .await
        .unwrap();
    let events = sink.into_inner();
    let seen: Vec<u8> = events.iter().map(|e| e.percent).collect();
    assert_eq!(seen, vec![0, 20, 40, 80, 100]);
    assert_eq!(events[0].message, "Exporting to PNG...");
    assert!(events.last().unwrap().is_hidden());
}

#[tokio::test]
async fn test_export_leaves_live_state_alone() {
    let scene = scene_with_artwork(&ParameterStore::default()).await;
    let viewport = Viewport::new(300, 200);
    let camera_before = scene.camera;
    let sink = NoProgress;

    let mut progress = ProgressTracker::new(&sink);
    export_raster(&scene, &viewport, &ExportSettings::default(), &mut progress)
        .await
        .unwrap();
    let mut progress = ProgressTracker::new(&sink);
    export_vector(&scene, &viewport, &ExportSettings::default(), &mut progress)
        .await
        .unwrap();

    assert_eq!(viewport, Viewport::new(300, 200));
    assert_eq!(scene.camera, camera_before);
}

#[tokio::test]
async fn test_export_without_model_or_area() {
    let sink = NoProgress;
    let mut progress = ProgressTracker::new(&sink);
    let err = export_vector(
        &Scene::default(),
        &Viewport::new(10, 10),
        &ExportSettings::default(),
        &mut progress,
    )
    .await
    .unwrap_err();
    assert_eq!(err, ExportError::NoModel);

    let scene = scene_with_artwork(&ParameterStore::default()).await;
    let err = export_raster(
        &scene,
        &Viewport::new(0, 10),
        &ExportSettings::default(),
        &mut progress,
    )
    .await
    .unwrap_err();
    assert_eq!(
        err,
        ExportError::EmptyViewport {
            width: 0,
            height: 10
        }
    );
}
