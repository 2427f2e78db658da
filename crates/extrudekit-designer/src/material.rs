//! Physically based material parameters.

use extrudekit_settings::{ParamChange, ParameterStore, Rgb};
use serde::{Deserialize, Serialize};

/// Which faces a material renders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Front,
    Double,
}

/// Physical material parameters for one mesh
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhysicalMaterial {
    pub color: Rgb,
    pub roughness: f32,
    pub metalness: f32,
    pub clearcoat: f32,
    pub clearcoat_roughness: f32,
    pub transmission: f32,
    pub env_intensity: f32,
    pub reflectivity: f32,
    pub side: Side,
}

impl Default for PhysicalMaterial {
    fn default() -> Self {
        Self::for_solid(&ParameterStore::default(), None)
    }
}

/// Floor for roughness on extruded artwork
pub const MIN_VECTOR_ROUGHNESS: f32 = 0.05;
/// Floor for clearcoat on extruded artwork
pub const MIN_VECTOR_CLEARCOAT: f32 = 0.05;

impl PhysicalMaterial {
    /// Material for an extruded vector shape.
    ///
    /// `fill` is the shape's own colour; the store's colour is used without one.
    pub fn for_vector(params: &ParameterStore, fill: Option<Rgb>) -> Self {
        Self {
            color: fill.unwrap_or(params.color),
            roughness: params.roughness.max(MIN_VECTOR_ROUGHNESS),
            metalness: params.metalness,
            clearcoat: params.clearcoat.max(MIN_VECTOR_CLEARCOAT),
            clearcoat_roughness: 0.05,
            transmission: params.transmission,
            env_intensity: params.env_intensity,
            reflectivity: 1.0,
            side: Side::Double,
        }
    }

    /// Material for a loaded asset, starting from the asset's own base colour
    pub fn for_solid(params: &ParameterStore, base: Option<Rgb>) -> Self {
        Self {
            color: base.unwrap_or(params.color),
            roughness: params.roughness,
            metalness: params.metalness,
            clearcoat: params.clearcoat,
            clearcoat_roughness: 0.0,
            transmission: params.transmission,
            env_intensity: params.env_intensity,
            reflectivity: 0.5,
            side: Side::Front,
        }
    }

    /// Apply one material-field change in place
    ///
    /// Returns false for changes that do not touch materials. Only the
    /// targeted field changes, so per-shape fill colours survive a
    /// roughness tweak.
    pub fn apply_change(&mut self, change: &ParamChange) -> bool {
        match *change {
            ParamChange::Color(c) => self.color = c,
            ParamChange::Roughness(v) => self.roughness = v,
            ParamChange::Metalness(v) => self.metalness = v,
            ParamChange::Clearcoat(v) => self.clearcoat = v,
            ParamChange::Transmission(v) => self.transmission = v,
            ParamChange::EnvIntensity(v) => self.env_intensity = v,
            _ => return false,
        }
        true
    }

    /// Replace the asset's own colour, roughness and metalness with the store's
    pub fn override_from(&mut self, params: &ParameterStore) {
        self.color = params.color;
        self.roughness = params.roughness;
        self.metalness = params.metalness;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vector_material_floors() {
        let params = ParameterStore {
            roughness: 0.0,
            clearcoat: 0.0,
            ..Default::default()
        };
        let m = PhysicalMaterial::for_vector(&params, Some(Rgb::from_u32(0xff0000)));
        assert_eq!(m.roughness, 0.05);
        assert_eq!(m.clearcoat, 0.05);
        assert_eq!(m.clearcoat_roughness, 0.05);
        assert_eq!(m.reflectivity, 1.0);
        assert_eq!(m.side, Side::Double);
        assert_eq!(m.color.to_hex(), "#ff0000");
    }

    #[test]
    fn test_apply_change_touches_one_field() {
        let params = ParameterStore::default();
        let fill = Rgb::from_u32(0x00ff00);
        let mut m = PhysicalMaterial::for_vector(&params, Some(fill));

        assert!(m.apply_change(&ParamChange::Roughness(0.2)));
        assert_eq!(m.roughness, 0.2);
        assert_eq!(m.color, fill);

        assert!(m.apply_change(&ParamChange::Color(Rgb::WHITE)));
        assert_eq!(m.color, Rgb::WHITE);

        assert!(!m.apply_change(&ParamChange::Depth(3.0)));
    }

    #[test]
    fn test_override_from_store() {
        let params = ParameterStore {
            metalness: 0.9,
            ..Default::default()
        };
        let mut m = PhysicalMaterial::for_solid(&params, Some(Rgb::from_u32(0x112233)));
        assert_eq!(m.color.to_hex(), "#112233");
        m.override_from(&params);
        assert_eq!(m.color, params.color);
        assert_eq!(m.metalness, 0.9);
    }
}
