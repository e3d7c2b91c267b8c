use glam::{Affine3A, Quat, Vec3};
use slotmap::{SecondaryMap, SlotMap};

use crate::NodeHandle;
use crate::node::Node;
use crate::transform::Transform;
use crate::transform_system;

/// Node arena holding one or more character skeletons.
///
/// Hierarchy and transforms live in [`Node`]; names are kept in a separate
/// component map since they are only touched when binding.
#[derive(Debug, Default)]
pub struct Scene {
    pub nodes: SlotMap<NodeHandle, Node>,
    pub root_nodes: Vec<NodeHandle>,

    names: SecondaryMap<NodeHandle, String>,
}

impl Scene {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Construction
    // ========================================================================

    /// Adds a node as a new root.
    pub fn add_node(&mut self, node: Node) -> NodeHandle {
        let handle = self.nodes.insert(node);
        self.root_nodes.push(handle);
        handle
    }

    /// Adds a node under `parent`.
    ///
    /// Falls back to a root node if `parent` does not exist.
    pub fn add_to_parent(&mut self, mut child: Node, parent: NodeHandle) -> NodeHandle {
        if !self.nodes.contains_key(parent) {
            log::error!("Parent node not found, adding child as root");
            return self.add_node(child);
        }
        child.parent = Some(parent);
        let handle = self.nodes.insert(child);
        self.nodes[parent].children.push(handle);
        handle
    }

    /// Creates a named root node.
    pub fn create_node_with_name(&mut self, name: &str) -> NodeHandle {
        let handle = self.add_node(Node::new());
        self.set_name(handle, name);
        handle
    }

    /// Creates a named node with a local transform, optionally under a parent.
    pub fn spawn(
        &mut self,
        name: &str,
        transform: Transform,
        parent: Option<NodeHandle>,
    ) -> NodeHandle {
        let node = Node::with_transform(transform);
        let handle = match parent {
            Some(p) => self.add_to_parent(node, p),
            None => self.add_node(node),
        };
        self.set_name(handle, name);
        handle
    }

    /// Re-parents `child` under `parent`.
    pub fn attach(&mut self, child: NodeHandle, parent: NodeHandle) {
        if child == parent {
            log::warn!("Cannot attach node to itself!");
            return;
        }
        if !self.nodes.contains_key(child) || !self.nodes.contains_key(parent) {
            log::error!("Node not found during attach!");
            return;
        }

        self.detach_from_parent(child);
        self.nodes[parent].children.push(child);

        self.nodes[child].parent = Some(parent);
    }

    /// Removes a node and its whole subtree.
    pub fn remove_node(&mut self, handle: NodeHandle) {
        let Some(node) = self.nodes.get(handle) else {
            return;
        };
        for child in node.children.clone() {
            self.remove_node(child);
        }
        self.detach_from_parent(handle);
        self.names.remove(handle);
        self.nodes.remove(handle);
    }

    fn detach_from_parent(&mut self, handle: NodeHandle) {
        match self.nodes.get(handle).and_then(Node::parent) {
            Some(parent) => {
                if let Some(p) = self.nodes.get_mut(parent)
                    && let Some(i) = p.children.iter().position(|&c| c == handle)
                {
                    p.children.remove(i);
                }
            }
            None => {
                if let Some(i) = self.root_nodes.iter().position(|&r| r == handle) {
                    self.root_nodes.remove(i);
                }
            }
        }
    }

    // ========================================================================
    // Queries
    // ========================================================================

    #[must_use]
    pub fn get_node(&self, handle: NodeHandle) -> Option<&Node> {
        self.nodes.get(handle)
    }

    pub fn get_node_mut(&mut self, handle: NodeHandle) -> Option<&mut Node> {
        self.nodes.get_mut(handle)
    }

    #[must_use]
    pub fn get_name(&self, handle: NodeHandle) -> Option<&str> {
        self.names.get(handle).map(String::as_str)
    }

    pub fn set_name(&mut self, handle: NodeHandle, name: &str) {
        if self.nodes.contains_key(handle) {
            self.names.insert(handle, name.to_string());
        }
    }

    /// Depth-first search for a descendant of `root` named `name`.
    ///
    /// `root` itself is not matched.
    #[must_use]
    pub fn find_by_name(&self, root: NodeHandle, name: &str) -> Option<NodeHandle> {
        let node = self.nodes.get(root)?;
        for &child in &node.children {
            if self.get_name(child) == Some(name) {
                return Some(child);
            }
            if let Some(found) = self.find_by_name(child, name) {
                return Some(found);
            }
        }
        None
    }

    // ========================================================================
    // Transforms
    // ========================================================================

    /// Current world matrix, computed from the parent chain.
    #[must_use]
    pub fn world_matrix(&self, handle: NodeHandle) -> Option<Affine3A> {
        transform_system::compute_world_matrix(&self.nodes, handle)
    }

    /// Current world rotation, computed from the parent chain.
    #[must_use]
    pub fn world_rotation(&self, handle: NodeHandle) -> Option<Quat> {
        let mut node = self.nodes.get(handle)?;
        let mut rotation = node.transform.rotation;
        while let Some(parent) = node.parent.and_then(|p| self.nodes.get(p)) {
            rotation = parent.transform.rotation * rotation;
            node = parent;
        }
        Some(rotation.normalize())
    }

    /// Current world position, computed from the parent chain.
    #[must_use]
    pub fn world_position(&self, handle: NodeHandle) -> Option<Vec3> {
        self.world_matrix(handle).map(|m| m.translation.into())
    }

    /// Sets a node's rotation so that its world rotation equals `rotation`.
    pub fn set_world_rotation(&mut self, handle: NodeHandle, rotation: Quat) {
        let parent_rotation = self
            .nodes
            .get(handle)
            .and_then(Node::parent)
            .and_then(|p| self.world_rotation(p))
            .unwrap_or(Quat::IDENTITY);

        if let Some(node) = self.nodes.get_mut(handle) {
            node.transform.rotation = (parent_rotation.inverse() * rotation).normalize();
        }
    }

    /// Moves a node so that its world position equals `position`.
    pub fn set_world_position(&mut self, handle: NodeHandle, position: Vec3) {
        let parent_inv = self
            .nodes
            .get(handle)
            .and_then(Node::parent)
            .and_then(|p| self.world_matrix(p))
            .map_or(Affine3A::IDENTITY, |m| m.inverse());

        if let Some(node) = self.nodes.get_mut(handle) {
            node.transform.position = parent_inv.transform_point3(position);
        }
    }
}
