//! Skeleton Bone Resolver
//!
//! Locates finger bones by name under an avatar root and calibrates the
//! rig's bone-local forward axis once per avatar.

use glam::Vec3;
use marionette_core::{BoneKey, Side};
use rustc_hash::FxHashMap;

use crate::binding::{AxisSource, SkeletonBinding};
use crate::host::SkeletonHost;
use crate::settings::{AxisCalibration, BoneNaming};

pub struct BoneResolver;

impl BoneResolver {
    /// Resolves every finger bone of both hands under `root`.
    ///
    /// Never fails: a missing hand root skips that whole side, a missing
    /// finger bone is left out of the binding. Both are logged.
    pub fn bind<H: SkeletonHost>(
        host: &H,
        root: H::Bone,
        naming: &BoneNaming,
        calibration: &AxisCalibration,
    ) -> SkeletonBinding<H::Bone> {
        let mut hands = FxHashMap::default();
        let mut bones = FxHashMap::default();
        let mut bind_rotations = FxHashMap::default();
        let mut missing = Vec::new();

        for side in Side::ALL {
            let hand_name = naming.hand_name(side);
            let Some(hand) = host.find_bone(root, &hand_name) else {
                log::error!("Could not find {side} hand bone `{hand_name}` in the hierarchy!");
                missing.push(hand_name);
                continue;
            };
            hands.insert(side, hand);

            for key in BoneKey::all_for(side) {
                let name = naming.bone_name(key);
                match host.find_bone(hand, &name) {
                    Some(bone) => {
                        log::debug!("Found {side} bone: {name}");
                        if let Some(rotation) = host.local_rotation(bone) {
                            bind_rotations.insert(key, rotation);
                        }
                        bones.insert(key, bone);
                    }
                    None => {
                        log::warn!("Missing {side} bone: {name}");
                        missing.push(name);
                    }
                }
            }
        }

        let detected = bones
            .get(&calibration.reference)
            .and_then(|&bone| detect_forward_axis(host, bone));

        let (forward_axis, axis_source) = match detected {
            Some(axis) => {
                log::info!("Detected bone forward axis: {axis}");
                (axis, AxisSource::Detected)
            }
            None => {
                let fallback = calibration.fallback_axis.normalize_or(Vec3::Y);
                log::warn!(
                    "Reference bone {} not found, using fallback forward axis {fallback}",
                    calibration.reference
                );
                (fallback, AxisSource::Fallback)
            }
        };

        let axis_overrides = calibration
            .overrides
            .iter()
            .filter_map(|o| o.axis.try_normalize().map(|axis| (o.key, axis)))
            .collect();

        SkeletonBinding {
            root,
            hands,
            bones,
            bind_rotations,
            forward_axis,
            axis_source,
            axis_overrides,
            missing,
        }
    }
}

/// Picks the bone-local axis least aligned with world up.
///
/// Candidates are tested in the order forward (Z), up (Y), right (X); the
/// first strictly smallest `|dot(axis, up)|` wins.
#[must_use]
pub fn detect_forward_axis<H: SkeletonHost>(host: &H, bone: H::Bone) -> Option<Vec3> {
    let rotation = host.world_rotation(bone)?;

    let mut best: Option<(f32, Vec3)> = None;
    for local in [Vec3::Z, Vec3::Y, Vec3::X] {
        let alignment = (rotation * local).dot(Vec3::Y).abs();
        if best.is_none_or(|(best_alignment, _)| alignment < best_alignment) {
            best = Some((alignment, local));
        }
    }
    best.map(|(_, axis)| axis)
}
