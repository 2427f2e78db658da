//! The fixed five-light rig.
//!
//! Only the two overall intensities are user controlled; colours and
//! directions are constants. The rig is always rebuilt as a whole.

use extrudekit_settings::{ParameterStore, Rgb};
use glam::Vec3;

pub const AMBIENT_COLOR: Rgb = Rgb::new(0x40, 0x40, 0x40);
pub const HEMISPHERE_SKY: Rgb = Rgb::new(0x87, 0xce, 0xeb);
pub const HEMISPHERE_GROUND: Rgb = Rgb::new(0x36, 0x2d, 0x1d);

pub const KEY_FACTOR: f32 = 1.2;
pub const FILL_FACTOR: f32 = 0.4;
pub const RIM_FACTOR: f32 = 0.3;
pub const HEMISPHERE_FACTOR: f32 = 0.8;

/// Shadow-map parameters for the key light
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadowSettings {
    pub map_size: u32,
    pub near: f32,
    pub far: f32,
    /// Half-width of the orthographic shadow camera
    pub extent: f32,
    pub bias: f32,
}

impl Default for ShadowSettings {
    fn default() -> Self {
        Self {
            map_size: 2048,
            near: 0.1,
            far: 50.0,
            extent: 10.0,
            bias: -0.0001,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LightKind {
    Ambient,
    /// Shines from `position` toward the origin
    Directional {
        position: Vec3,
        shadow: Option<ShadowSettings>,
    },
    Hemisphere {
        sky: Rgb,
        ground: Rgb,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Light {
    pub name: &'static str,
    pub kind: LightKind,
    pub color: Rgb,
    pub intensity: f32,
}

impl Light {
    /// Unit vector from a lit point toward a directional light
    pub fn direction(&self) -> Option<Vec3> {
        match self.kind {
            LightKind::Directional { position, .. } => Some(position.normalize_or_zero()),
            _ => None,
        }
    }

    pub fn casts_shadow(&self) -> bool {
        matches!(
            self.kind,
            LightKind::Directional {
                shadow: Some(_),
                ..
            }
        )
    }
}

/// The scene's complete set of lights
#[derive(Debug, Clone, PartialEq)]
pub struct LightRig {
    lights: Vec<Light>,
}

impl LightRig {
    /// Build the rig for the current intensities
    pub fn build(params: &ParameterStore) -> Self {
        let ambient = params.ambient_light;
        let directional = params.directional_light;

        let lights = vec![
            Light {
                name: "ambient",
                kind: LightKind::Ambient,
                color: AMBIENT_COLOR,
                intensity: ambient,
            },
            Light {
                name: "key",
                kind: LightKind::Directional {
                    position: Vec3::ONE.normalize() * 10.0,
                    shadow: Some(ShadowSettings::default()),
                },
                color: Rgb::WHITE,
                intensity: directional * KEY_FACTOR,
            },
            Light {
                name: "fill",
                kind: LightKind::Directional {
                    position: Vec3::new(-1.0, 0.5, -1.0).normalize() * 8.0,
                    shadow: None,
                },
                color: Rgb::WHITE,
                intensity: directional * FILL_FACTOR,
            },
            Light {
                name: "rim",
                kind: LightKind::Directional {
                    position: Vec3::new(0.0, 1.0, -1.0).normalize() * 6.0,
                    shadow: None,
                },
                color: Rgb::WHITE,
                intensity: directional * RIM_FACTOR,
            },
            Light {
                name: "hemisphere",
                kind: LightKind::Hemisphere {
                    sky: HEMISPHERE_SKY,
                    ground: HEMISPHERE_GROUND,
                },
                color: HEMISPHERE_SKY,
                intensity: ambient * HEMISPHERE_FACTOR,
            },
        ];
        Self { lights }
    }

    /// Drop every light and build a fresh rig
    pub fn rebuild(&mut self, params: &ParameterStore) {
        *self = Self::build(params);
        tracing::debug!(
            "Lighting rebuilt: ambient {}, directional {}",
            params.ambient_light,
            params.directional_light
        );
    }

    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    pub fn len(&self) -> usize {
        self.lights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lights.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Light> {
        self.lights.iter().find(|l| l.name == name)
    }
}

impl Default for LightRig {
    fn default() -> Self {
        Self::build(&ParameterStore::default())
    }
}
