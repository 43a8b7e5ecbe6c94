use std::fmt;

use cadence_core::{BehaviourTypeId, CoreError};
use thiserror::Error;

/// Circular update-ordering constraints: the families can never be linearised.
///
/// `cycle` is closed: its first and last entries are the same type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CycleError {
    pub cycle: Vec<BehaviourTypeId>,
}

impl fmt::Display for CycleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("circular behaviour update order: ")?;
        for (i, ty) in self.cycle.iter().enumerate() {
            if i > 0 {
                f.write_str(" -> ")?;
            }
            write!(f, "{ty}")?;
        }
        Ok(())
    }
}

impl std::error::Error for CycleError {}

#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error(transparent)]
    Cycle(#[from] CycleError),

    #[error(transparent)]
    Core(#[from] CoreError),
}

pub type ScheduleResult<T> = Result<T, ScheduleError>;
