//! Command-line arguments for the `extrudekit` binary.

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use extrudekit_core::ExportFormat;
use extrudekit_settings::{Background, ParamChange, Rgb};

#[derive(Parser, Debug)]
#[command(name = "extrudekit", version, long_version = crate::LONG_VERSION, about = "Extrude SVG artwork into 3D and export the view")]
pub struct Cli {
    /// Configuration file (.toml or .json); defaults to the platform config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Render the framed scene to an SVG file
    ExportSvg(ExportArgs),
    /// Render the framed scene to a supersampled PNG file
    ExportPng(ExportArgs),
    /// Print the model summary and default camera frame as JSON
    Frame(SceneArgs),
}

#[derive(Args, Debug)]
pub struct SceneArgs {
    /// Input file (.svg, .glb or .gltf)
    pub input: PathBuf,

    /// Viewport size, e.g. 800x600
    #[arg(long, value_parser = parse_size)]
    pub size: Option<(u32, u32)>,

    /// Extrusion depth
    #[arg(long)]
    pub depth: Option<f32>,

    #[arg(long)]
    pub bevel_size: Option<f32>,

    #[arg(long)]
    pub bevel_thickness: Option<f32>,

    #[arg(long)]
    pub bevel_segments: Option<u32>,

    /// Model colour: #rgb, #rrggbb, rgb(r,g,b) or a CSS name
    #[arg(long, value_parser = Rgb::parse)]
    pub color: Option<Rgb>,

    /// Background colour, or "transparent"
    #[arg(long)]
    pub background: Option<Background>,

    /// Any other parameter as key=value, e.g. --set roughness=0.2
    #[arg(long = "set", value_parser = ParamChange::parse)]
    pub overrides: Vec<ParamChange>,
}

impl SceneArgs {
    /// Parameter changes in the order they should be applied
    pub fn changes(&self) -> Vec<ParamChange> {
        let mut changes = Vec::new();
        if let Some(v) = self.depth {
            changes.push(ParamChange::Depth(v));
        }
        if let Some(v) = self.bevel_size {
            changes.push(ParamChange::BevelSize(v));
        }
        if let Some(v) = self.bevel_thickness {
            changes.push(ParamChange::BevelThickness(v));
        }
        if let Some(v) = self.bevel_segments {
            changes.push(ParamChange::BevelSegments(v));
        }
        if let Some(c) = self.color {
            changes.push(ParamChange::Color(c));
        }
        if let Some(b) = self.background {
            changes.push(ParamChange::Background(b));
        }
        changes.extend(self.overrides.iter().copied());
        changes
    }
}

#[derive(Args, Debug)]
pub struct ExportArgs {
    #[command(flatten)]
    pub scene: SceneArgs,

    /// Output file; defaults to the input name with the export extension
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Raster supersampling factor (PNG only)
    #[arg(long)]
    pub scale: Option<u32>,
}

impl ExportArgs {
    pub fn output_path(&self, format: ExportFormat) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| default_output(&self.scene.input, format))
    }
}

fn default_output(input: &Path, format: ExportFormat) -> PathBuf {
    input.with_extension(format.extension())
}

fn parse_size(value: &str) -> Result<(u32, u32), String> {
    let (w, h) = value
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{}'", value))?;
    let parse = |s: &str| {
        s.trim()
            .parse::<u32>()
            .ok()
            .filter(|n| *n > 0)
            .ok_or_else(|| format!("'{}' is not a positive size", s))
    };
    Ok((parse(w)?, parse(h)?))
}
