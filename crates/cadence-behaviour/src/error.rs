use cadence_core::{BehaviourId, CoreError};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BehaviourError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("freeze handle #{token} on {behaviour} was already released")]
    FreezeAlreadyReleased {
        behaviour: BehaviourId,
        token:     u64,
    },

    #[error("freeze count of {0} would drop below zero")]
    FreezeUnderflow(BehaviourId),

    #[error("{0} cannot attach behaviours from its stop callback")]
    SpawnDuringStop(BehaviourId),
}

pub type BehaviourResult<T> = Result<T, BehaviourError>;
