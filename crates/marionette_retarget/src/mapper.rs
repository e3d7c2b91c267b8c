//! Coordinate Mapper
//!
//! Converts normalized landmark coordinates into the avatar's anchor space,
//! and from there into world space through an optional origin transform.

use glam::{Affine3A, Vec3};
use marionette_core::LandmarkPoint;

use crate::settings::CoordinateMapping;

/// Maps a landmark into anchor space, then through `origin` if given.
///
/// `mirror` flips the x axis; hand data arrives in a single camera-facing
/// convention and must be mirrored for the character's left side. Pure:
/// the same inputs always give the same output.
#[must_use]
pub fn to_world_space(
    point: LandmarkPoint,
    mirror: bool,
    mapping: &CoordinateMapping,
    origin: Option<&Affine3A>,
) -> Vec3 {
    let mut x = (point.x - mapping.x_center) * mapping.x_scale;
    if mirror {
        x = -x;
    }
    let local = Vec3::new(
        x,
        (mapping.y_reference - point.y) * mapping.y_scale + mapping.y_offset,
        -point.z * mapping.z_scale - mapping.z_offset,
    );

    match origin {
        Some(origin) => origin.transform_point3(local),
        None => local,
    }
}

/// Mapping constants bundled with the current origin transform.
#[derive(Debug, Clone, Default)]
pub struct CoordinateMapper {
    pub mapping: CoordinateMapping,
    pub origin: Option<Affine3A>,
}

impl CoordinateMapper {
    #[must_use]
    pub fn new(mapping: CoordinateMapping) -> Self {
        Self {
            mapping,
            origin: None,
        }
    }

    #[must_use]
    pub fn with_origin(mut self, origin: Affine3A) -> Self {
        self.origin = Some(origin);
        self
    }

    #[inline]
    #[must_use]
    pub fn to_world(&self, point: LandmarkPoint, mirror: bool) -> Vec3 {
        to_world_space(point, mirror, &self.mapping, self.origin.as_ref())
    }

    /// Validates then converts. `None` means the caller must keep its
    /// previous value.
    #[must_use]
    pub fn sanitize_and_convert(&self, point: LandmarkPoint, mirror: bool, label: &str) -> Option<Vec3> {
        if !point.is_valid() {
            log::debug!("Invalid landmark for {label}: {point:?}");
            return None;
        }
        Some(self.to_world(point, mirror))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Quat;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-5
    }

    #[test]
    fn reference_constants() {
        let mapper = CoordinateMapper::default();
        let p = mapper.to_world(LandmarkPoint::new(0.75, 0.2, 0.1), false);
        assert!(approx(p, Vec3::new(0.25, 0.9, -0.4)));
    }

    #[test]
    fn mirror_flips_x_only() {
        let mapper = CoordinateMapper::default();
        let point = LandmarkPoint::new(0.8, 0.3, -0.5);
        let right = mapper.to_world(point, false);
        let left = mapper.to_world(point, true);
        assert!((left.x + right.x).abs() < 1e-6);
        assert_eq!(left.y, right.y);
        assert_eq!(left.z, right.z);
    }

    #[test]
    fn origin_applies_trs() {
        let origin = Affine3A::from_scale_rotation_translation(
            Vec3::splat(2.0),
            Quat::from_rotation_y(std::f32::consts::PI),
            Vec3::new(0.0, 1.0, 0.0),
        );
        let mapper = CoordinateMapper::default().with_origin(origin);
        let p = mapper.to_world(LandmarkPoint::new(0.5, 0.4, 0.0), false);
        // local (0, 0.7, -0.2) -> scaled (0, 1.4, -0.4) -> rotated (0, 1.4, 0.4) -> +1 y
        assert!(approx(p, Vec3::new(0.0, 2.4, 0.4)));
    }

    #[test]
    fn invalid_point_is_not_converted() {
        let mapper = CoordinateMapper::default();
        assert!(
            mapper
                .sanitize_and_convert(LandmarkPoint::new(f32::NAN, 0.5, 0.0), false, "Head")
                .is_none()
        );
    }
}
