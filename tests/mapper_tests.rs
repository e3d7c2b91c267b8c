//! Coordinate Mapper Tests
//!
//! Tests for:
//! - Landmark → anchor-space conversion with the default calibration
//! - Mirroring for the left side
//! - Origin transforms (translation, rotation, scale)
//! - Custom calibration constants

use glam::{Affine3A, Quat, Vec3};
use marionette::LandmarkPoint;
use marionette::retarget::{CoordinateMapper, CoordinateMapping, to_world_space};
use std::f32::consts::PI;

const EPSILON: f32 = 1e-5;

fn vec3_approx(a: Vec3, b: Vec3) -> bool {
    (a - b).abs().max_element() < EPSILON
}

// ============================================================================
// Anchor Space
// ============================================================================

#[test]
fn image_center_maps_to_anchor_height() {
    let v = to_world_space(LandmarkPoint::new(0.5, 0.4, 0.0), false, &CoordinateMapping::default(), None);
    assert!(vec3_approx(v, Vec3::new(0.0, 0.7, -0.2)));
}

#[test]
fn depth_is_scaled_and_flipped() {
    let mapping = CoordinateMapping::default();
    let near = to_world_space(LandmarkPoint::new(0.5, 0.4, -0.5), false, &mapping, None);
    let far = to_world_space(LandmarkPoint::new(0.5, 0.4, 0.5), false, &mapping, None);
    assert!(vec3_approx(near, Vec3::new(0.0, 0.7, 0.8)));
    assert!(vec3_approx(far, Vec3::new(0.0, 0.7, -1.2)));
}

#[test]
fn image_y_grows_downward() {
    let mapping = CoordinateMapping::default();
    let top = to_world_space(LandmarkPoint::new(0.5, 0.0, 0.0), false, &mapping, None);
    let bottom = to_world_space(LandmarkPoint::new(0.5, 1.0, 0.0), false, &mapping, None);
    assert!(top.y > bottom.y);
    assert!((top.y - bottom.y - 1.0).abs() < EPSILON);
}

#[test]
fn mirror_only_flips_x() {
    let mapping = CoordinateMapping::default();
    let p = LandmarkPoint::new(0.8, 0.3, 0.25);
    let a = to_world_space(p, false, &mapping, None);
    let b = to_world_space(p, true, &mapping, None);
    assert!(vec3_approx(a, Vec3::new(-b.x, b.y, b.z)));
    assert!((a.x - 0.3).abs() < EPSILON);
}

#[test]
fn custom_calibration_constants() {
    let mapping = CoordinateMapping {
        x_scale: 2.0,
        y_scale: 0.5,
        z_scale: 1.0,
        y_offset: 1.5,
        z_offset: 0.0,
        ..Default::default()
    };
    let v = to_world_space(LandmarkPoint::new(0.75, 0.2, 0.1), false, &mapping, None);
    assert!(vec3_approx(v, Vec3::new(0.5, 1.6, -0.1)));
}

// ============================================================================
// Origin Transform
// ============================================================================

#[test]
fn origin_rotation_turns_anchor_space() {
    let origin = Affine3A::from_rotation_translation(Quat::from_rotation_y(PI), Vec3::new(0.0, 0.0, 3.0));
    let mapper = CoordinateMapper::default().with_origin(origin);

    let v = mapper.to_world(LandmarkPoint::new(0.5, 0.4, 0.0), false);
    assert!(vec3_approx(v, Vec3::new(0.0, 0.7, 3.2)));
}

#[test]
fn conversion_is_pure() {
    let mapper = CoordinateMapper::default().with_origin(Affine3A::from_translation(Vec3::ONE));
    let p = LandmarkPoint::new(0.3, 0.6, -0.4);
    assert_eq!(mapper.to_world(p, true), mapper.to_world(p, true));
}

#[test]
fn sanitize_rejects_out_of_range() {
    let mapper = CoordinateMapper::default();
    assert!(mapper.sanitize_and_convert(LandmarkPoint::new(0.5, 0.5, 3.0), false, "Head").is_none());
    assert!(mapper.sanitize_and_convert(LandmarkPoint::new(0.5, 0.5, 0.0), false, "Head").is_some());
}
