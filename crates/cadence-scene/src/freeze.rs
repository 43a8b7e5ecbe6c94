//! `NodeFreeze` — a freeze held on a whole subtree.

use std::fmt;

use cadence_core::NodeId;

/// Proof that one node freeze was acquired.
///
/// While it is outstanding every behaviour owned by the node or any of its
/// descendants is frozen, including behaviours attached or linked in later.
/// Hand it back to [`NodeManager::release_node`][crate::NodeManager::release_node];
/// dropping it keeps the subtree frozen.
#[must_use = "a frozen node stays frozen until its freeze is released"]
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct NodeFreeze {
    node:  NodeId,
    token: u64,
}

impl NodeFreeze {
    pub(crate) fn new(node: NodeId, token: u64) -> Self {
        Self { node, token }
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn token(&self) -> u64 {
        self.token
    }
}

impl fmt::Display for NodeFreeze {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node freeze#{} on {}", self.token, self.node)
    }
}
