//! `SceneTree` — the node forest behaviours are attached to.
//!
//! Nodes live in an arena indexed by [`NodeId`] and are never freed.  Each
//! node carries an ordered child list and a bag of inert data components
//! (`Box<dyn Any>`); the scheduler ignores the latter.
//!
//! Structure is only edited through [`NodeManager`][crate::NodeManager] so
//! that registration follows every link and unlink.

use std::any::Any;

use cadence_core::{CoreError, NodeId};

use crate::SceneResult;

// ── SceneNode ─────────────────────────────────────────────────────────────────

pub struct SceneNode {
    name:       String,
    parent:     Option<NodeId>,
    children:   Vec<NodeId>,
    data:       Vec<Box<dyn Any>>,
    registered: bool,
}

impl SceneNode {
    fn new(name: String) -> Self {
        Self {
            name,
            parent:     None,
            children:   Vec::new(),
            data:       Vec::new(),
            registered: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// `true` while the node belongs to a manager's live scene.
    pub fn is_registered(&self) -> bool {
        self.registered
    }

    /// First data component of type `T`.
    pub fn data<T: Any>(&self) -> Option<&T> {
        self.data.iter().find_map(|d| d.downcast_ref::<T>())
    }

    pub fn data_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.data.iter_mut().find_map(|d| d.downcast_mut::<T>())
    }
}

// ── SceneTree ─────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct SceneTree {
    nodes: Vec<SceneNode>,
}

impl SceneTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a parentless, unregistered node.
    pub fn create_node(&mut self, name: impl Into<String>) -> NodeId {
        let id = NodeId::from_index(self.nodes.len());
        self.nodes.push(SceneNode::new(name.into()));
        id
    }

    #[inline]
    pub fn get(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(id.index())
    }

    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut SceneNode> {
        self.nodes.get_mut(id.index())
    }

    pub(crate) fn node(&self, id: NodeId) -> SceneResult<&SceneNode> {
        self.get(id).ok_or_else(|| CoreError::NodeNotFound(id).into())
    }

    pub fn contains(&self, id: NodeId) -> bool {
        id.index() < self.nodes.len()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Append a data component to `node`.
    pub fn add_data<T: Any>(&mut self, node: NodeId, value: T) -> SceneResult<()> {
        let entry = self
            .get_mut(node)
            .ok_or(CoreError::NodeNotFound(node))?;
        entry.data.push(Box::new(value));
        Ok(())
    }

    /// `node` followed by all its descendants, depth-first pre-order.
    ///
    /// Reversed, every node comes after all of its descendants.
    pub fn subtree(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![node];
        while let Some(id) = stack.pop() {
            let Some(entry) = self.get(id) else {
                continue;
            };
            out.push(id);
            stack.extend(entry.children.iter().rev());
        }
        out
    }

    /// `true` if `ancestor` is `node` or lies on its parent chain.
    pub fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut cursor = Some(node);
        while let Some(id) = cursor {
            if id == ancestor {
                return true;
            }
            cursor = self.get(id).and_then(SceneNode::parent);
        }
        false
    }

    // ── Structure (manager only) ──────────────────────────────────────────

    pub(crate) fn link(&mut self, parent: NodeId, child: NodeId) {
        if let Some(entry) = self.get_mut(child) {
            entry.parent = Some(parent);
        }
        if let Some(entry) = self.get_mut(parent) {
            entry.children.push(child);
        }
    }

    pub(crate) fn unlink(&mut self, parent: NodeId, child: NodeId) {
        if let Some(entry) = self.get_mut(parent) {
            entry.children.retain(|&c| c != child);
        }
        if let Some(entry) = self.get_mut(child) {
            entry.parent = None;
        }
    }

    pub(crate) fn set_registered(&mut self, node: NodeId, registered: bool) {
        if let Some(entry) = self.get_mut(node) {
            entry.registered = registered;
        }
    }
}
