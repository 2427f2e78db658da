//! Default camera placement for a freshly loaded model.
//!
//! The camera looks at the bounding-box centre from a fixed 45° azimuth,
//! raised by half the largest extent. How far back it sits depends on what
//! kind of model is shown: loaded assets keep their native size and need a
//! tight frame, while extruded artwork is always rescaled to the same scene
//! size and gets a wider one.

use extrudekit_core::ModelKind;
use extrudekit_designer::Aabb;
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Distance multiplier for loaded 3D assets
pub const SOLID_MULTIPLIER: f32 = 0.8;
/// Distance multiplier for extruded vector artwork
pub const VECTOR_MULTIPLIER: f32 = 3.5;
/// Distance multiplier when the model kind is unknown
pub const DEFAULT_MULTIPLIER: f32 = 2.8;
/// Closest the default frame may place the camera
pub const MIN_FRAME_DISTANCE: f32 = 20.0;
/// Camera height above the centre, as a fraction of the largest extent
pub const HEIGHT_FACTOR: f32 = 0.5;
/// Horizontal offset along X and Z, as a fraction of the distance
pub const AZIMUTH_FACTOR: f32 = 0.8;

/// Camera placement: where it sits and what it looks at
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraFrame {
    pub position: Vec3,
    pub target: Vec3,
}

pub fn distance_multiplier(kind: Option<ModelKind>) -> f32 {
    match kind {
        Some(ModelKind::Solid) => SOLID_MULTIPLIER,
        Some(ModelKind::Vector) => VECTOR_MULTIPLIER,
        None => DEFAULT_MULTIPLIER,
    }
}

/// Compute the default frame for a model with the given bounds
pub fn frame_for(bounds: &Aabb, kind: Option<ModelKind>) -> CameraFrame {
    let center = bounds.center();
    let max_dim = bounds.max_dimension();
    let multiplier = distance_multiplier(kind);

    let distance = (max_dim * multiplier).max(MIN_FRAME_DISTANCE);
    let height = max_dim * HEIGHT_FACTOR;
    let position = center
        + Vec3::new(
            distance * AZIMUTH_FACTOR,
            height,
            distance * AZIMUTH_FACTOR,
        );

    tracing::debug!(
        "Framing {:?}: max dimension {:.2}, multiplier {}, camera at {:?}",
        kind,
        max_dim,
        multiplier,
        position
    );

    CameraFrame {
        position,
        target: center,
    }
}
