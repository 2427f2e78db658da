//! The two export paths over the live scene.
//!
//! Both read the current model, camera, lights, and background without
//! copying them into a separate scene, so an export matches the view.
//! Neither touches the live [`Viewport`].

use extrudekit_core::ProgressTracker;
use extrudekit_designer::prepare_for_host;
use extrudekit_settings::ExportSettings;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{ExportError, ExportResult};
use crate::projector::project_scene;
use crate::raster_export::{encode_png, rasterize};
use crate::scene::Scene;
use crate::svg_export::{normalize_styles, render_svg};
use crate::viewport::Viewport;

/// Markup ready for the host, sized like the viewport
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorExport {
    pub markup: String,
    pub width: u32,
    pub height: u32,
}

/// Encoded PNG plus the viewport size it was rendered for
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RasterExport {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
    /// Encoded image size, `scale` times the viewport
    pub pixel_width: u32,
    pub pixel_height: u32,
}

fn check_ready(scene: &Scene, viewport: &Viewport) -> ExportResult<()> {
    if !scene.has_model() {
        return Err(ExportError::NoModel);
    }
    if viewport.is_empty() {
        return Err(ExportError::EmptyViewport {
            width: viewport.width,
            height: viewport.height,
        });
    }
    Ok(())
}

/// Render the scene to normalized SVG markup at viewport size
pub async fn export_vector(
    scene: &Scene,
    viewport: &Viewport,
    settings: &ExportSettings,
    progress: &mut ProgressTracker<'_>,
) -> ExportResult<VectorExport> {
    check_ready(scene, viewport)?;
    progress.report("Exporting to SVG...", 0);
    tokio::task::yield_now().await;

    let (width, height) = (viewport.width, viewport.height);
    progress.report("Setting up SVG renderer...", 20);

    progress.report("Creating SVG scene...", 40);
    let list = project_scene(scene, width, height);
    let raw = render_svg(&list, &scene.background, settings.svg_precision);
    tokio::task::yield_now().await;

    progress.report("Optimizing SVG paths...", 85);
    let markup = prepare_for_host(&normalize_styles(&raw))?;

    progress.finish();
    info!(
        "SVG exported: {}x{}, {} paths, {} bytes",
        width,
        height,
        list.len(),
        markup.len()
    );
    Ok(VectorExport {
        markup,
        width,
        height,
    })
}

/// Render the scene off-screen at `raster_scale`× and encode PNG
pub async fn export_raster(
    scene: &Scene,
    viewport: &Viewport,
    settings: &ExportSettings,
    progress: &mut ProgressTracker<'_>,
) -> ExportResult<RasterExport> {
    check_ready(scene, viewport)?;
    progress.report("Exporting to PNG...", 0);
    tokio::task::yield_now().await;

    progress.report("Setting up PNG renderer...", 20);
    let surface = viewport.offscreen(settings.raster_scale.max(1));

    progress.report("Preparing scene...", 40);
    let list = project_scene(scene, surface.width, surface.height);
    let pixmap = rasterize(&list, &scene.background, surface.scale)?;

    progress.report("Finalizing...", 80);
    tokio::task::yield_now().await;
    let bytes = encode_png(&pixmap)?;

    progress.finish();
    info!(
        "PNG exported: {}x{} at {}x, {} bytes",
        viewport.width,
        viewport.height,
        surface.scale,
        bytes.len()
    );
    Ok(RasterExport {
        bytes,
        width: viewport.width,
        height: viewport.height,
        pixel_width: surface.width,
        pixel_height: surface.height,
    })
}
