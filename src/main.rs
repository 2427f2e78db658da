use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use extrudekit::cli::{Cli, Command, SceneArgs};
use extrudekit::{init_logging, LoadRequest, Viewer, ViewerHandle, BUILD_DATE, BUILD_TARGET, VERSION};
use extrudekit_core::{EventBus, ExportFormat};
use extrudekit_settings::{AppConfig, SettingsPersistence};
use tracing::{info, warn};

fn load_config(cli: &Cli) -> anyhow::Result<(AppConfig, Option<String>)> {
    if let Some(path) = &cli.config {
        let config = AppConfig::load_from_file(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        return Ok((config, None));
    }
    // A broken platform config should not block a one-off export
    match SettingsPersistence::platform_default().and_then(|p| p.load_or_default()) {
        Ok(config) => Ok((config, None)),
        Err(err) => Ok((AppConfig::default(), Some(err.to_string()))),
    }
}

/// Spawn a viewer, apply overrides, and load the input
async fn open_scene(config: AppConfig, scene: &SceneArgs) -> anyhow::Result<ViewerHandle> {
    let (handle, _task) = ViewerHandle::spawn(Viewer::new(config, Arc::new(EventBus::new())));

    if let Some((width, height)) = scene.size {
        handle.resize(width, height).await?;
    }
    for change in scene.changes() {
        handle.apply(change).await?;
    }

    let request = LoadRequest::from_path(&scene.input)
        .await
        .with_context(|| format!("reading {}", scene.input.display()))?;
    let summary = handle.load(request).await?;
    info!(
        "Loaded {} ({}): {} meshes, {} triangles",
        summary.source_file, summary.kind, summary.mesh_count, summary.triangle_count
    );
    Ok(handle)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let (mut config, config_warning) = load_config(&cli)?;

    init_logging(&config.logging.filter)?;
    info!("ExtrudeKit {} (built {} for {})", VERSION, BUILD_DATE, BUILD_TARGET);
    if let Some(warning) = config_warning {
        warn!("Using default configuration: {}", warning);
    }

    match cli.command {
        Command::ExportSvg(args) => {
            let handle = open_scene(config, &args.scene).await?;
            let export = handle.export_vector().await?;
            let output = args.output_path(ExportFormat::Svg);
            tokio::fs::write(&output, export.markup.as_bytes())
                .await
                .with_context(|| format!("writing {}", output.display()))?;
            println!("{} ({}x{})", output.display(), export.width, export.height);
        }
        Command::ExportPng(args) => {
            if let Some(scale) = args.scale {
                config.export.raster_scale = scale.max(1);
            }
            let handle = open_scene(config, &args.scene).await?;
            let export = handle.export_raster().await?;
            let output = args.output_path(ExportFormat::Png);
            tokio::fs::write(&output, &export.bytes)
                .await
                .with_context(|| format!("writing {}", output.display()))?;
            println!(
                "{} ({}x{} px)",
                output.display(),
                export.pixel_width,
                export.pixel_height
            );
        }
        Command::Frame(scene) => {
            let handle = open_scene(config, &scene).await?;
            let snapshot = handle.snapshot().await?;
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
        }
    }

    Ok(())
}
