//! Property tests for default camera framing

use extrudekit_core::ModelKind;
use extrudekit_designer::Aabb;
use extrudekit_visualizer::{frame_for, MIN_FRAME_DISTANCE};
use glam::Vec3;
use proptest::prelude::*;

fn kind_strategy() -> impl Strategy<Value = Option<ModelKind>> {
    prop_oneof![
        Just(None),
        Just(Some(ModelKind::Vector)),
        Just(Some(ModelKind::Solid)),
    ]
}

fn bounds_strategy() -> impl Strategy<Value = Aabb> {
    (
        prop::array::uniform3(-100.0f32..100.0),
        prop::array::uniform3(0.0f32..200.0),
    )
        .prop_map(|(min, size)| {
            let min = Vec3::from_array(min);
            Aabb::from_points([min, min + Vec3::from_array(size)])
        })
}

proptest! {
    #[test]
    fn framing_is_deterministic(bounds in bounds_strategy(), kind in kind_strategy()) {
        prop_assert_eq!(frame_for(&bounds, kind), frame_for(&bounds, kind));
    }

    #[test]
    fn camera_looks_at_centre_from_outside(bounds in bounds_strategy(), kind in kind_strategy()) {
        let frame = frame_for(&bounds, kind);
        prop_assert_eq!(frame.target, bounds.center());

        let offset = frame.position - frame.target;
        prop_assert!((offset.x - offset.z).abs() < 1e-3);
        prop_assert!(offset.x >= MIN_FRAME_DISTANCE * 0.8 - 1e-3);
        prop_assert!(offset.y >= 0.0);
    }
}

#[test]
fn test_reference_distances() {
    let bounds = Aabb::from_points([Vec3::ZERO, Vec3::splat(10.0)]);
    let cases = [
        (Some(ModelKind::Solid), 20.0),
        (Some(ModelKind::Vector), 35.0),
        (None, 28.0),
    ];
    for (kind, distance) in cases {
        let frame = frame_for(&bounds, kind);
        let expected = Vec3::new(5.0 + distance * 0.8, 5.0 + 5.0, 5.0 + distance * 0.8);
        assert!(
            (frame.position - expected).length() < 1e-4,
            "{:?}: {:?} != {:?}",
            kind,
            frame.position,
            expected
        );
    }
}
