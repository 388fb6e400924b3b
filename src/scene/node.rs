use smallvec::SmallVec;

use crate::scene::NodeHandle;
use crate::scene::transform::Transform;

/// A scene node: hierarchy links plus the transform, the data touched every
/// frame. Other attributes (model, camera, light, scripts) live in the
/// scene's component maps, keeping nodes small and contiguous.
///
/// Children are owned by the parent's handle list; the child holds a
/// non-owning back-handle. Removal cascades parent to children.
#[derive(Debug, Clone, Default)]
pub struct Node {
    pub(crate) parent: Option<NodeHandle>,
    pub(crate) children: SmallVec<[NodeHandle; 4]>,

    /// Transform component (hot data accessed every frame)
    pub transform: Transform,

    /// Visibility flag; invisible nodes are skipped by culling entirely
    pub visible: bool,
}

impl Node {
    #[must_use]
    pub fn new() -> Self {
        Self {
            parent: None,
            children: SmallVec::new(),
            transform: Transform::new(),
            visible: true,
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
