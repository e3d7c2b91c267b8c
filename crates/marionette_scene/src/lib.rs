//! Marionette Scene
//!
//! A small node hierarchy used as the reference skeleton host:
//! - [`Node`]: parent/child links and a transform
//! - [`Transform`]: local TRS
//! - [`Scene`]: node arena with names, lookup and world-space helpers
//! - [`transform_system`]: world matrices from the parent chain

pub mod node;
pub mod scene;
pub mod transform;
pub mod transform_system;

pub use node::Node;
pub use scene::Scene;
pub use transform::Transform;

use slotmap::new_key_type;

new_key_type! {
    pub struct NodeHandle;
}
