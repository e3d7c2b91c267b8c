use crate::NodeHandle;
use crate::transform::Transform;

/// A skeleton node: hierarchy links and a transform.
///
/// Names live in the owning [`Scene`](crate::Scene)'s component map so the
/// node itself stays small.
#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) parent: Option<NodeHandle>,
    pub(crate) children: Vec<NodeHandle>,

    pub transform: Transform,
}

impl Node {
    #[must_use]
    pub fn new() -> Self {
        Self {
            parent: None,
            children: Vec::new(),
            transform: Transform::new(),
        }
    }

    #[must_use]
    pub fn with_transform(transform: Transform) -> Self {
        Self {
            transform,
            ..Self::new()
        }
    }

    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<NodeHandle> {
        self.parent
    }

    #[inline]
    #[must_use]
    pub fn children(&self) -> &[NodeHandle] {
        &self.children
    }
}

impl Default for Node {
    fn default() -> Self {
        Self::new()
    }
}
