use cadence_behaviour::BehaviourError;
use cadence_core::{BehaviourId, CoreError, FamilyId};
use cadence_schedule::ScheduleError;
use thiserror::Error;

/// Everything a `BehaviourSystem` can fail with.
///
/// All variants are programmer errors; the host should abort the frame.
#[derive(Debug, Error)]
pub enum SystemError {
    #[error(transparent)]
    Schedule(#[from] ScheduleError),

    #[error(transparent)]
    Behaviour(#[from] BehaviourError),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("behaviour update re-entered while a tick is running")]
    UpdateInProgress,

    #[error("{0} is already registered")]
    AlreadyRegistered(BehaviourId),

    #[error("{behaviour} records slot {recorded:?} of {family} but the family says {actual:?}")]
    IndexMismatch {
        behaviour: BehaviourId,
        family:    FamilyId,
        recorded:  Option<usize>,
        actual:    Option<usize>,
    },
}

pub type SystemResult<T> = Result<T, SystemError>;
