//! Command-queue service tests: busy guards and single-writer ordering

mod common;

use std::sync::Arc;

use common::{svg_request, SQUARES_SVG};
use extrudekit::{AppConfig, ErrorKind, EventBus, ParamChange, Viewer, ViewerHandle};
use extrudekit_core::Operation;

fn spawn() -> ViewerHandle {
    let viewer = Viewer::new(AppConfig::default(), Arc::new(EventBus::new()));
    let (handle, _task) = ViewerHandle::spawn(viewer);
    handle
}

#[tokio::test]
async fn test_second_load_while_loading_is_busy() {
    let handle = spawn();
    let (first, second) = tokio::join!(
        handle.load(svg_request(SQUARES_SVG)),
        handle.load(svg_request(SQUARES_SVG)),
    );

    assert!(first.is_ok());
    let err = second.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Busy);
    assert_eq!(
        err.user_message(),
        "Please wait for the current load to finish."
    );
    assert!(!handle.is_loading());

    // Flag released: a later load goes through
    assert!(handle.load(svg_request(SQUARES_SVG)).await.is_ok());
}

#[tokio::test]
async fn test_second_export_while_exporting_is_busy() {
    let handle = spawn();
    handle.load(svg_request(SQUARES_SVG)).await.unwrap();

    let (png, svg) = tokio::join!(handle.export_raster(), handle.export_vector());
    assert!(png.is_ok());
    assert!(matches!(
        svg.unwrap_err(),
        extrudekit::Error::Busy {
            operation: Operation::Export
        }
    ));
    assert!(!handle.is_exporting());
}

#[tokio::test]
async fn test_cancelled_load_keeps_busy_flag() {
    let handle = spawn();
    {
        // One poll queues the command; the caller then stops waiting
        let first = handle.load(svg_request(SQUARES_SVG));
        tokio::pin!(first);
        tokio::select! {
            biased;
            _ = &mut first => panic!("load finished before the viewer task ran"),
            _ = std::future::ready(()) => {}
        }
    }
    assert!(handle.is_loading());

    let err = handle.load(svg_request(SQUARES_SVG)).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Busy);

    // Queued behind the abandoned load, so the model is in place by now
    let snapshot = handle.snapshot().await.unwrap();
    assert!(snapshot.model.is_some());
    assert!(!handle.is_loading());
}

#[tokio::test]
async fn test_cancelled_export_keeps_busy_flag() {
    let handle = spawn();
    handle.load(svg_request(SQUARES_SVG)).await.unwrap();
    {
        let first = handle.export_raster();
        tokio::pin!(first);
        tokio::select! {
            biased;
            _ = &mut first => panic!("export finished before the viewer task ran"),
            _ = std::future::ready(()) => {}
        }
    }
    assert!(handle.is_exporting());
    assert!(matches!(
        handle.export_vector().await.unwrap_err(),
        extrudekit::Error::Busy {
            operation: Operation::Export
        }
    ));

    handle.snapshot().await.unwrap();
    assert!(!handle.is_exporting());
    assert!(handle.export_vector().await.is_ok());
}

#[tokio::test]
async fn test_commands_apply_in_order() {
    let handle = spawn();
    handle.load(svg_request(SQUARES_SVG)).await.unwrap();
    handle.resize(320, 200).await.unwrap();
    handle.apply(ParamChange::Metalness(0.6)).await.unwrap();
    handle.apply(ParamChange::Metalness(0.2)).await.unwrap();

    let snapshot = handle.snapshot().await.unwrap();
    assert_eq!(snapshot.parameters.metalness, 0.2);
    assert_eq!((snapshot.viewport.width, snapshot.viewport.height), (320, 200));
    assert_eq!(handle.reset_camera().await.unwrap(), snapshot.initial_frame);

    let json = serde_json::to_value(&snapshot).unwrap();
    assert_eq!(json["model"]["kind"], "Vector");
}

#[tokio::test]
async fn test_stopped_viewer_reports_stopped() {
    let viewer = Viewer::new(AppConfig::default(), Arc::new(EventBus::new()));
    let (handle, task) = ViewerHandle::spawn(viewer);
    task.abort();
    let _ = task.await;

    let err = handle.snapshot().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Stopped);
}
