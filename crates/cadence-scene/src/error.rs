use cadence_core::{CoreError, NodeId};
use cadence_system::SystemError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SceneError {
    #[error(transparent)]
    System(#[from] SystemError),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("{0} is already registered")]
    AlreadyRegistered(NodeId),

    #[error("{0} has a parent; only parentless nodes can be registered directly")]
    HasParent(NodeId),

    #[error("{child} is not a child of {parent}")]
    NotAChild { parent: NodeId, child: NodeId },

    #[error("{0} is not a root")]
    NotARoot(NodeId),

    #[error("linking {child} under {parent} would make it its own ancestor")]
    WouldCycle { parent: NodeId, child: NodeId },

    #[error("node freeze #{token} on {node} was already released")]
    NodeFreezeReleased { node: NodeId, token: u64 },

    #[error("node manager update re-entered while a tick is running")]
    UpdateInProgress,
}

pub type SceneResult<T> = Result<T, SceneError>;
