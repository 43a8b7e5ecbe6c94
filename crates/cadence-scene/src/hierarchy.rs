//! Hierarchy change notifications.

use cadence_core::NodeId;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum HierarchyAction {
    Link,
    Unlink,
}

/// One link or unlink performed by a [`NodeManager`][crate::NodeManager].
///
/// `parent` is `None` when a root was added or removed.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct HierarchyChange {
    pub action: HierarchyAction,
    pub child:  NodeId,
    pub parent: Option<NodeId>,
}

/// Receives every hierarchy change after the affected subtree has been
/// registered (on link) or unregistered (on unlink).
pub trait HierarchyObserver {
    fn on_hierarchy_changed(&mut self, _change: &HierarchyChange) {}
}

/// A [`HierarchyObserver`] that does nothing.
pub struct NoopHierarchyObserver;

impl HierarchyObserver for NoopHierarchyObserver {}
