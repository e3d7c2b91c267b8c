//! Transform System
//!
//! Derives world matrices from the node hierarchy. Kept separate from
//! [`Scene`](crate::Scene) so it only borrows the node storage.

use glam::Affine3A;
use slotmap::SlotMap;

use crate::NodeHandle;
use crate::node::Node;

/// Computes a node's world matrix by walking its parent chain.
#[must_use]
pub fn compute_world_matrix(nodes: &SlotMap<NodeHandle, Node>, handle: NodeHandle) -> Option<Affine3A> {
    let mut node = nodes.get(handle)?;
    let mut world = node.transform.compose();
    while let Some(parent) = node.parent.and_then(|p| nodes.get(p)) {
        world = parent.transform.compose() * world;
        node = parent;
    }
    Some(world)
}
