//! Finger Pose Solver
//!
//! Turns consecutive hand landmark pairs into finger bone rotations. For
//! each articulated segment the landmark direction is mapped to world space
//! and the bone is turned by the shortest arc from its forward direction
//! onto that target direction.

use glam::{Quat, Vec3};
use marionette_core::{BoneKey, Finger, HAND_LANDMARK_COUNT, LandmarkPoint, Segment, Side};
use smallvec::SmallVec;

use crate::binding::SkeletonBinding;
use crate::host::SkeletonHost;
use crate::mapper::CoordinateMapper;
use crate::settings::FingerSolveMode;

/// Result of solving one articulated finger segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentSolve {
    pub key: BoneKey,
    /// Normalized landmark direction in world space
    pub target_dir: Vec3,
    /// World-space rotation taking the bone's forward onto `target_dir`
    pub delta: Quat,
}

/// Every articulated segment of both hands fits inline.
pub type SegmentSolves = SmallVec<[SegmentSolve; 30]>;

#[derive(Debug, Clone, Copy, Default)]
pub struct FingerPoseSolver {
    pub mode: FingerSolveMode,
}

impl FingerPoseSolver {
    #[must_use]
    pub fn new(mode: FingerSolveMode) -> Self {
        Self { mode }
    }

    /// Applies one hand's landmarks to its finger bones.
    ///
    /// No-op when fewer than 21 landmarks are supplied. Segments with an
    /// invalid or coincident endpoint, unbound bones and parentless bones
    /// are skipped. Tip bones are never rotated.
    pub fn apply<H: SkeletonHost>(
        &self,
        host: &mut H,
        binding: &SkeletonBinding<H::Bone>,
        landmarks: &[LandmarkPoint],
        side: Side,
        mapper: &CoordinateMapper,
    ) -> SegmentSolves {
        let mut solves = SegmentSolves::new();
        if landmarks.len() < HAND_LANDMARK_COUNT {
            return solves;
        }

        let mirror = side.is_left();
        for finger in Finger::ALL {
            let indices = finger.landmark_indices();

            for segment in Segment::ARTICULATED {
                let Some((from, to)) = segment.landmark_span() else {
                    continue;
                };
                let (from, to) = (landmarks[indices[from]], landmarks[indices[to]]);
                if !from.is_valid() || !to.is_valid() {
                    continue;
                }

                let from_world = mapper.to_world(from, mirror);
                let to_world = mapper.to_world(to, mirror);
                let Some(target_dir) = (to_world - from_world).try_normalize() else {
                    continue;
                };

                let key = BoneKey::new(finger, segment, side);
                let Some(bone) = binding.bone(key) else {
                    continue;
                };
                let Some(parent) = host.parent(bone) else {
                    continue;
                };

                let delta = match self.mode {
                    FingerSolveMode::BindRelative => {
                        apply_bind_relative(host, binding, key, bone, parent, target_dir)
                    }
                    FingerSolveMode::Incremental => {
                        apply_incremental(host, binding, key, bone, parent, target_dir)
                    }
                };

                if let Some(delta) = delta {
                    log::trace!("{key}: target {target_dir}, delta angle {:.4}", delta.angle_between(Quat::IDENTITY));
                    solves.push(SegmentSolve {
                        key,
                        target_dir,
                        delta,
                    });
                }
            }
        }

        solves
    }
}

/// Rotation = delta * (parent_world * bind_local), with delta measured from
/// the bind-pose forward under the parent's current orientation.
fn apply_bind_relative<H: SkeletonHost>(
    host: &mut H,
    binding: &SkeletonBinding<H::Bone>,
    key: BoneKey,
    bone: H::Bone,
    parent: H::Bone,
    target_dir: Vec3,
) -> Option<Quat> {
    let parent_world = host.world_rotation(parent)?;
    let bind_local = binding.bind_rotation(key)?;
    let rest_world = parent_world * bind_local;

    let rest_forward = (rest_world * binding.axis_for(key)).try_normalize()?;
    let delta = Quat::from_rotation_arc(rest_forward, target_dir);

    host.set_world_rotation(bone, (delta * rest_world).normalize());
    Some(delta)
}

/// Composes the delta onto the bone's current world rotation.
///
/// The current forward is the calibrated axis seen through the parent, so
/// repeated calls with the same landmarks keep rotating the bone.
fn apply_incremental<H: SkeletonHost>(
    host: &mut H,
    binding: &SkeletonBinding<H::Bone>,
    key: BoneKey,
    bone: H::Bone,
    parent: H::Bone,
    target_dir: Vec3,
) -> Option<Quat> {
    let current_forward = host
        .transform_direction(parent, binding.axis_for(key))?
        .try_normalize()?;
    let delta = Quat::from_rotation_arc(current_forward, target_dir);

    let current = host.world_rotation(bone)?;
    host.set_world_rotation(bone, (delta * current).normalize());
    Some(delta)
}
