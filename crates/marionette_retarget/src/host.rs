//! Skeleton host seam.
//!
//! The retargeting engine never owns character skeletons. It drives them
//! through [`SkeletonHost`], which any scene graph can implement. The
//! crate ships an implementation for [`marionette_scene::Scene`].

use std::fmt::Debug;
use std::hash::Hash;

use glam::{Quat, Vec3};
use marionette_scene::{NodeHandle, Scene};

/// Bone access the retargeting engine needs from a character hierarchy.
pub trait SkeletonHost {
    /// Opaque bone handle.
    type Bone: Copy + Eq + Hash + Debug;

    /// Recursive name lookup among the descendants of `root`.
    fn find_bone(&self, root: Self::Bone, name: &str) -> Option<Self::Bone>;

    fn parent(&self, bone: Self::Bone) -> Option<Self::Bone>;

    fn local_rotation(&self, bone: Self::Bone) -> Option<Quat>;

    fn set_local_rotation(&mut self, bone: Self::Bone, rotation: Quat);

    fn world_rotation(&self, bone: Self::Bone) -> Option<Quat>;

    fn set_world_rotation(&mut self, bone: Self::Bone, rotation: Quat);

    fn set_world_position(&mut self, bone: Self::Bone, position: Vec3);

    /// Transforms a direction from bone-local to world space.
    ///
    /// Rotation only; unaffected by position and scale.
    fn transform_direction(&self, bone: Self::Bone, direction: Vec3) -> Option<Vec3> {
        self.world_rotation(bone).map(|r| r * direction)
    }
}

impl SkeletonHost for Scene {
    type Bone = NodeHandle;

    fn find_bone(&self, root: NodeHandle, name: &str) -> Option<NodeHandle> {
        self.find_by_name(root, name)
    }

    fn parent(&self, bone: NodeHandle) -> Option<NodeHandle> {
        self.get_node(bone)?.parent()
    }

    fn local_rotation(&self, bone: NodeHandle) -> Option<Quat> {
        self.get_node(bone).map(|n| n.transform.rotation)
    }

    fn set_local_rotation(&mut self, bone: NodeHandle, rotation: Quat) {
        if let Some(node) = self.get_node_mut(bone) {
            node.transform.rotation = rotation;
        }
    }

    fn world_rotation(&self, bone: NodeHandle) -> Option<Quat> {
        Scene::world_rotation(self, bone)
    }

    fn set_world_rotation(&mut self, bone: NodeHandle, rotation: Quat) {
        Scene::set_world_rotation(self, bone, rotation);
    }

    fn set_world_position(&mut self, bone: NodeHandle, position: Vec3) {
        Scene::set_world_position(self, bone, position);
    }
}
