//! The parameter store.
//!
//! One instance per application context. Every field is independently
//! settable through a [`ParamChange`], and each change declares which part of
//! the scene has to be rebuilt for it to take effect.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::color::{Background, Rgb};
use crate::error::{SettingsError, SettingsResult};

/// Geometry, material, environment, and background parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ParameterStore {
    /// Extrusion depth in source units; the extruder divides it by 10.
    pub depth: f32,
    /// How far the bevel reaches into the outline.
    pub bevel_size: f32,
    /// How far the bevel reaches along the extrusion axis.
    pub bevel_thickness: f32,
    /// Requested bevel subdivisions; the extruder enforces a minimum.
    pub bevel_segments: u32,
    pub color: Rgb,
    pub roughness: f32,
    pub metalness: f32,
    pub clearcoat: f32,
    pub transmission: f32,
    pub env_intensity: f32,
    pub ambient_light: f32,
    pub directional_light: f32,
    pub background: Background,
}

impl Default for ParameterStore {
    fn default() -> Self {
        Self {
            depth: 20.0,
            bevel_size: 0.5,
            bevel_thickness: 1.0,
            bevel_segments: 3,
            color: Rgb::from_u32(0x808080),
            roughness: 0.7,
            metalness: 0.1,
            clearcoat: 0.0,
            transmission: 0.0,
            env_intensity: 1.0,
            ambient_light: 0.5,
            directional_light: 1.0,
            background: Background::Transparent,
        }
    }
}

/// What a parameter change forces the scene to rebuild
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RebuildEffect {
    /// Re-run vector conversion (vector models only).
    Geometry,
    /// Update materials in place on every mesh.
    Material,
    /// Tear down and recreate the lighting rig.
    Lighting,
    /// Swap the scene background.
    Background,
}

impl fmt::Display for RebuildEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RebuildEffect::Geometry => write!(f, "geometry"),
            RebuildEffect::Material => write!(f, "material"),
            RebuildEffect::Lighting => write!(f, "lighting"),
            RebuildEffect::Background => write!(f, "background"),
        }
    }
}

/// A single field mutation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ParamChange {
    Depth(f32),
    BevelSize(f32),
    BevelThickness(f32),
    BevelSegments(u32),
    Color(Rgb),
    Roughness(f32),
    Metalness(f32),
    Clearcoat(f32),
    Transmission(f32),
    EnvIntensity(f32),
    AmbientLight(f32),
    DirectionalLight(f32),
    Background(Background),
}

impl ParamChange {
    /// The rebuild this change requires
    pub fn effect(&self) -> RebuildEffect {
        match self {
            ParamChange::Depth(_)
            | ParamChange::BevelSize(_)
            | ParamChange::BevelThickness(_)
            | ParamChange::BevelSegments(_) => RebuildEffect::Geometry,
            ParamChange::Color(_)
            | ParamChange::Roughness(_)
            | ParamChange::Metalness(_)
            | ParamChange::Clearcoat(_)
            | ParamChange::Transmission(_)
            | ParamChange::EnvIntensity(_) => RebuildEffect::Material,
            ParamChange::AmbientLight(_) | ParamChange::DirectionalLight(_) => {
                RebuildEffect::Lighting
            }
            ParamChange::Background(_) => RebuildEffect::Background,
        }
    }

    /// The field name used in config files and on the command line
    pub fn key(&self) -> &'static str {
        match self {
            ParamChange::Depth(_) => "depth",
            ParamChange::BevelSize(_) => "bevel-size",
            ParamChange::BevelThickness(_) => "bevel-thickness",
            ParamChange::BevelSegments(_) => "bevel-segments",
            ParamChange::Color(_) => "color",
            ParamChange::Roughness(_) => "roughness",
            ParamChange::Metalness(_) => "metalness",
            ParamChange::Clearcoat(_) => "clearcoat",
            ParamChange::Transmission(_) => "transmission",
            ParamChange::EnvIntensity(_) => "env-intensity",
            ParamChange::AmbientLight(_) => "ambient-light",
            ParamChange::DirectionalLight(_) => "directional-light",
            ParamChange::Background(_) => "background",
        }
    }

    /// Parse a `key=value` pair, e.g. `roughness=0.3` or `color=#ff0000`
    pub fn parse(assignment: &str) -> SettingsResult<Self> {
        let (key, value) = assignment
            .split_once('=')
            .ok_or_else(|| SettingsError::invalid(assignment, "expected key=value"))?;
        let key = key.trim().to_ascii_lowercase().replace('_', "-");
        let value = value.trim();
        let number = || -> SettingsResult<f32> {
            value
                .parse::<f32>()
                .map_err(|_| SettingsError::invalid(&key, format!("'{}' is not a number", value)))
        };

        Ok(match key.as_str() {
            "depth" => ParamChange::Depth(number()?),
            "bevel-size" => ParamChange::BevelSize(number()?),
            "bevel-thickness" => ParamChange::BevelThickness(number()?),
            "bevel-segments" => ParamChange::BevelSegments(value.parse().map_err(|_| {
                SettingsError::invalid(&key, format!("'{}' is not a whole number", value))
            })?),
            "color" => ParamChange::Color(Rgb::parse(value)?),
            "roughness" => ParamChange::Roughness(number()?),
            "metalness" => ParamChange::Metalness(number()?),
            "clearcoat" => ParamChange::Clearcoat(number()?),
            "transmission" => ParamChange::Transmission(number()?),
            "env-intensity" => ParamChange::EnvIntensity(number()?),
            "ambient-light" => ParamChange::AmbientLight(number()?),
            "directional-light" => ParamChange::DirectionalLight(number()?),
            "background" => ParamChange::Background(value.parse()?),
            _ => return Err(SettingsError::invalid(&key, "unknown parameter")),
        })
    }
}

fn finite(key: &str, value: f32) -> SettingsResult<f32> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(SettingsError::invalid(key, "must be a finite number"))
    }
}

fn unit(key: &str, value: f32) -> SettingsResult<f32> {
    finite(key, value).map(|v| v.clamp(0.0, 1.0))
}

fn non_negative(key: &str, value: f32) -> SettingsResult<f32> {
    finite(key, value).map(|v| v.max(0.0))
}

impl ParameterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one change, last write wins
    ///
    /// Unit-range material fields are clamped to `0..=1` and lengths and
    /// intensities to be non-negative. Non-finite numbers are rejected and
    /// leave the store untouched.
    pub fn apply(&mut self, change: ParamChange) -> SettingsResult<RebuildEffect> {
        let key = change.key();
        match change {
            ParamChange::Depth(v) => self.depth = non_negative(key, v)?,
            ParamChange::BevelSize(v) => self.bevel_size = non_negative(key, v)?,
            ParamChange::BevelThickness(v) => self.bevel_thickness = non_negative(key, v)?,
            ParamChange::BevelSegments(v) => self.bevel_segments = v,
            ParamChange::Color(c) => self.color = c,
            ParamChange::Roughness(v) => self.roughness = unit(key, v)?,
            ParamChange::Metalness(v) => self.metalness = unit(key, v)?,
            ParamChange::Clearcoat(v) => self.clearcoat = unit(key, v)?,
            ParamChange::Transmission(v) => self.transmission = unit(key, v)?,
            ParamChange::EnvIntensity(v) => self.env_intensity = non_negative(key, v)?,
            ParamChange::AmbientLight(v) => self.ambient_light = non_negative(key, v)?,
            ParamChange::DirectionalLight(v) => self.directional_light = non_negative(key, v)?,
            ParamChange::Background(b) => self.background = b,
        }
        tracing::debug!("parameter {} updated ({})", key, change.effect());
        Ok(change.effect())
    }

    /// The same field as `change`, carrying the value currently stored
    ///
    /// Used after [`apply`](Self::apply) to propagate the clamped value.
    pub fn current(&self, change: &ParamChange) -> ParamChange {
        match change {
            ParamChange::Depth(_) => ParamChange::Depth(self.depth),
            ParamChange::BevelSize(_) => ParamChange::BevelSize(self.bevel_size),
            ParamChange::BevelThickness(_) => ParamChange::BevelThickness(self.bevel_thickness),
            ParamChange::BevelSegments(_) => ParamChange::BevelSegments(self.bevel_segments),
            ParamChange::Color(_) => ParamChange::Color(self.color),
            ParamChange::Roughness(_) => ParamChange::Roughness(self.roughness),
            ParamChange::Metalness(_) => ParamChange::Metalness(self.metalness),
            ParamChange::Clearcoat(_) => ParamChange::Clearcoat(self.clearcoat),
            ParamChange::Transmission(_) => ParamChange::Transmission(self.transmission),
            ParamChange::EnvIntensity(_) => ParamChange::EnvIntensity(self.env_intensity),
            ParamChange::AmbientLight(_) => ParamChange::AmbientLight(self.ambient_light),
            ParamChange::DirectionalLight(_) => {
                ParamChange::DirectionalLight(self.directional_light)
            }
            ParamChange::Background(_) => ParamChange::Background(self.background),
        }
    }

    pub fn set_depth(&mut self, depth: f32) -> SettingsResult<RebuildEffect> {
        self.apply(ParamChange::Depth(depth))
    }

    pub fn set_roughness(&mut self, roughness: f32) -> SettingsResult<RebuildEffect> {
        self.apply(ParamChange::Roughness(roughness))
    }

    pub fn set_color(&mut self, color: Rgb) -> SettingsResult<RebuildEffect> {
        self.apply(ParamChange::Color(color))
    }

    pub fn set_background(&mut self, background: Background) -> SettingsResult<RebuildEffect> {
        self.apply(ParamChange::Background(background))
    }

    /// Validate a store loaded from disk
    pub fn validate(&self) -> SettingsResult<()> {
        let fields = [
            ("depth", self.depth),
            ("bevel-size", self.bevel_size),
            ("bevel-thickness", self.bevel_thickness),
            ("roughness", self.roughness),
            ("metalness", self.metalness),
            ("clearcoat", self.clearcoat),
            ("transmission", self.transmission),
            ("env-intensity", self.env_intensity),
            ("ambient-light", self.ambient_light),
            ("directional-light", self.directional_light),
        ];
        for (key, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(SettingsError::invalid(key, "must be a non-negative number"));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let p = ParameterStore::default();
        assert_eq!(p.depth, 20.0);
        assert_eq!(p.bevel_size, 0.5);
        assert_eq!(p.bevel_thickness, 1.0);
        assert_eq!(p.bevel_segments, 3);
        assert_eq!(p.color.to_hex(), "#808080");
        assert_eq!(p.roughness, 0.7);
        assert_eq!(p.metalness, 0.1);
        assert_eq!(p.clearcoat, 0.0);
        assert_eq!(p.transmission, 0.0);
        assert_eq!(p.env_intensity, 1.0);
        assert_eq!(p.ambient_light, 0.5);
        assert_eq!(p.directional_light, 1.0);
        assert!(p.background.is_transparent());
    }

    #[test]
    fn test_effects() {
        assert_eq!(ParamChange::BevelSegments(5).effect(), RebuildEffect::Geometry);
        assert_eq!(ParamChange::EnvIntensity(2.0).effect(), RebuildEffect::Material);
        assert_eq!(ParamChange::AmbientLight(0.1).effect(), RebuildEffect::Lighting);
        assert_eq!(
            ParamChange::Background(Background::Transparent).effect(),
            RebuildEffect::Background
        );
    }

    #[test]
    fn test_apply_clamps_and_rejects() {
        let mut p = ParameterStore::default();
        assert_eq!(p.set_roughness(1.5).unwrap(), RebuildEffect::Material);
        assert_eq!(p.roughness, 1.0);

        assert!(p.set_depth(f32::NAN).is_err());
        assert_eq!(p.depth, 20.0);

        p.apply(ParamChange::Depth(-3.0)).unwrap();
        assert_eq!(p.depth, 0.0);

        assert_eq!(
            p.current(&ParamChange::Roughness(42.0)),
            ParamChange::Roughness(1.0)
        );
    }

    #[test]
    fn test_parse_assignments() {
        assert_eq!(
            ParamChange::parse("roughness=0.25").unwrap(),
            ParamChange::Roughness(0.25)
        );
        assert_eq!(
            ParamChange::parse("bevel_segments = 6").unwrap(),
            ParamChange::BevelSegments(6)
        );
        assert_eq!(
            ParamChange::parse("background=#ffffff").unwrap(),
            ParamChange::Background(Background::Solid(Rgb::WHITE))
        );
        assert!(ParamChange::parse("depth").is_err());
        assert!(ParamChange::parse("sparkle=1").is_err());
        assert!(ParamChange::parse("depth=deep").is_err());
    }

    #[test]
    fn test_serde_uses_camel_case() {
        let json = serde_json::to_string(&ParameterStore::default()).unwrap();
        assert!(json.contains("\"bevelSize\":0.5"));
        assert!(json.contains("\"color\":\"#808080\""));
        assert!(json.contains("\"background\":\"transparent\""));
    }
}
