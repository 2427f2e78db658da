//! Flat shading of a surface point under the light rig.
//!
//! A Lambert diffuse term plus a Blinn-Phong highlight per directional
//! light, driven by the physical material fields:
//!
//! - metalness moves energy from diffuse into a base-coloured specular
//! - roughness widens and dims the highlight
//! - clearcoat adds a second, sharp white highlight
//! - env intensity scales a view-independent reflection term
//! - transmission lowers opacity

use extrudekit_designer::PhysicalMaterial;
use glam::Vec3;

use crate::lighting::{LightKind, LightRig};

/// Specular reflectance of non-metals
const DIELECTRIC_F0: f32 = 0.04;
const MAX_SHININESS: f32 = 512.0;
/// Strength of the environment reflection at `env_intensity == 1`
const ENV_STRENGTH: f32 = 0.25;
/// Opacity removed by full transmission
const TRANSMISSION_OPACITY_LOSS: f32 = 0.75;

/// A shaded colour, channels in `0.0..=1.0`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shade {
    pub color: Vec3,
    pub alpha: f32,
}

impl Shade {
    pub fn to_rgba8(&self) -> [u8; 4] {
        let q = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.color.x), q(self.color.y), q(self.color.z), q(self.alpha)]
    }
}

fn rgb(c: extrudekit_settings::Rgb) -> Vec3 {
    Vec3::from_array(c.to_f32())
}

fn shininess(roughness: f32) -> f32 {
    let r = roughness.clamp(0.02, 1.0);
    (2.0 / (r * r * r * r) - 2.0).clamp(1.0, MAX_SHININESS)
}

/// Shade `material` at a point with unit `normal`, seen from `eye`
pub fn shade(
    material: &PhysicalMaterial,
    rig: &LightRig,
    point: Vec3,
    normal: Vec3,
    eye: Vec3,
) -> Shade {
    let base = rgb(material.color);
    let metal = material.metalness.clamp(0.0, 1.0);
    let diffuse_color = base * (1.0 - metal);
    let f0 = Vec3::splat(DIELECTRIC_F0).lerp(base, metal);
    let view = (eye - point).normalize_or_zero();
    let power = shininess(material.roughness);
    // Normalized Blinn-Phong
    let normalization = (power + 8.0) / (8.0 * std::f32::consts::PI);

    let mut color = Vec3::ZERO;
    for light in rig.lights() {
        let radiance = rgb(light.color) * light.intensity;
        match light.kind {
            LightKind::Ambient => color += diffuse_color * radiance,
            LightKind::Hemisphere { sky, ground } => {
                let t = 0.5 * (normal.y + 1.0);
                let sky_ground = rgb(ground).lerp(rgb(sky), t) * light.intensity;
                color += diffuse_color * sky_ground;
            }
            LightKind::Directional { position, .. } => {
                let l = position.normalize_or_zero();
                let n_dot_l = normal.dot(l);
                if n_dot_l <= 0.0 {
                    continue;
                }
                color += diffuse_color * radiance * n_dot_l;

                let half = (l + view).normalize_or_zero();
                let n_dot_h = normal.dot(half).max(0.0);
                let specular = normalization * n_dot_h.powf(power) * n_dot_l * 0.25;
                color += f0 * radiance * specular;

                if material.clearcoat > 0.0 {
                    let coat_power = shininess(material.clearcoat_roughness.max(0.05));
                    let coat = n_dot_h.powf(coat_power) * n_dot_l;
                    color += radiance * (material.clearcoat * DIELECTRIC_F0 * coat);
                }
            }
        }
    }

    let env = f0 * (material.env_intensity * ENV_STRENGTH * (1.0 - material.roughness.clamp(0.0, 1.0)));
    color += env * material.reflectivity.clamp(0.0, 1.0);

    Shade {
        color: color.clamp(Vec3::ZERO, Vec3::ONE),
        alpha: 1.0 - material.transmission.clamp(0.0, 1.0) * TRANSMISSION_OPACITY_LOSS,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use extrudekit_settings::{ParameterStore, Rgb};

    fn material() -> PhysicalMaterial {
        PhysicalMaterial::for_solid(&ParameterStore::default(), Some(Rgb::from_u32(0x808080)))
    }

    #[test]
    fn test_lit_face_brighter_than_unlit() {
        let rig = LightRig::default();
        let eye = Vec3::new(0.0, 0.0, 10.0);
        let toward_key = shade(&material(), &rig, Vec3::ZERO, Vec3::ONE.normalize(), eye);
        let away = shade(&material(), &rig, Vec3::ZERO, -Vec3::ONE.normalize(), eye);
        assert!(toward_key.color.length() > away.color.length());
    }

    #[test]
    fn test_no_light_is_black() {
        let params = ParameterStore {
            ambient_light: 0.0,
            directional_light: 0.0,
            env_intensity: 0.0,
            ..Default::default()
        };
        let rig = LightRig::build(&params);
        let m = PhysicalMaterial::for_solid(&params, None);
        let s = shade(&m, &rig, Vec3::ZERO, Vec3::Y, Vec3::new(0.0, 5.0, 5.0));
        assert_eq!(s.color, Vec3::ZERO);
        assert_eq!(s.alpha, 1.0);
    }

    #[test]
    fn test_transmission_lowers_alpha() {
        let mut m = material();
        m.transmission = 1.0;
        let s = shade(&m, &LightRig::default(), Vec3::ZERO, Vec3::Z, Vec3::Z * 5.0);
        assert!((s.alpha - 0.25).abs() < 1e-6);
        assert_eq!(s.to_rgba8()[3], 64);
    }
}
