use glam::{Quat, Vec3};
use marionette_core::{BoneKey, Side};
use rustc_hash::FxHashMap;

use crate::host::SkeletonHost;

/// Where the avatar-wide forward axis came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisSource {
    /// Measured from the reference bone's rest orientation.
    Detected,
    /// Reference bone missing; the configured fallback axis is in use.
    Fallback,
}

/// Per-avatar bone handles plus the calibrated forward axis.
///
/// References the host's nodes without owning them. Rebuilt whenever the
/// active avatar changes. Bones that could not be resolved are simply
/// absent and skipped by the solvers.
#[derive(Debug, Clone)]
pub struct SkeletonBinding<B> {
    pub(crate) root: B,
    pub(crate) hands: FxHashMap<Side, B>,
    pub(crate) bones: FxHashMap<BoneKey, B>,
    /// Local rotations captured at bind time
    pub(crate) bind_rotations: FxHashMap<BoneKey, Quat>,
    pub(crate) forward_axis: Vec3,
    pub(crate) axis_source: AxisSource,
    pub(crate) axis_overrides: FxHashMap<BoneKey, Vec3>,
    pub(crate) missing: Vec<String>,
}

impl<B: Copy> SkeletonBinding<B> {
    /// Avatar root the binding was resolved from.
    #[inline]
    #[must_use]
    pub fn root(&self) -> B {
        self.root
    }

    #[inline]
    #[must_use]
    pub fn hand(&self, side: Side) -> Option<B> {
        self.hands.get(&side).copied()
    }

    #[inline]
    #[must_use]
    pub fn bone(&self, key: BoneKey) -> Option<B> {
        self.bones.get(&key).copied()
    }

    #[inline]
    #[must_use]
    pub fn bind_rotation(&self, key: BoneKey) -> Option<Quat> {
        self.bind_rotations.get(&key).copied()
    }

    /// Avatar-wide bone-local forward axis.
    #[inline]
    #[must_use]
    pub fn forward_axis(&self) -> Vec3 {
        self.forward_axis
    }

    /// Forward axis for one bone, honouring per-bone overrides.
    #[must_use]
    pub fn axis_for(&self, key: BoneKey) -> Vec3 {
        self.axis_overrides
            .get(&key)
            .copied()
            .unwrap_or(self.forward_axis)
    }

    #[inline]
    #[must_use]
    pub fn axis_source(&self) -> AxisSource {
        self.axis_source
    }

    /// Names that were looked up but not found.
    #[must_use]
    pub fn missing(&self) -> &[String] {
        &self.missing
    }

    #[must_use]
    pub fn bound_count(&self) -> usize {
        self.bones.len()
    }

    /// `true` when every looked-up bone was found.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }

    /// Writes the captured bind-pose local rotations back onto the bones.
    pub fn restore_bind_pose<H>(&self, host: &mut H)
    where
        H: SkeletonHost<Bone = B>,
    {
        for (key, &rotation) in &self.bind_rotations {
            if let Some(&bone) = self.bones.get(key) {
                host.set_local_rotation(bone, rotation);
            }
        }
    }
}
