//! Shared "unknown id" errors.
//!
//! Sub-crates define their own error enums and wrap `CoreError` as one
//! variant via `#[from]`.

use thiserror::Error;

use crate::{BehaviourId, FamilyId, NodeId};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("node {0} not found")]
    NodeNotFound(NodeId),

    #[error("behaviour {0} not found")]
    BehaviourNotFound(BehaviourId),

    #[error("family {0} not found")]
    FamilyNotFound(FamilyId),
}

/// Shorthand result type for `cadence-core`.
pub type CoreResult<T> = Result<T, CoreError>;
