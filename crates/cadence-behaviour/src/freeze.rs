//! `FreezeHandle` — a scoped, reference-counted suspension token.

use std::fmt;

use cadence_core::BehaviourId;

/// Proof that one freeze was acquired on a behaviour.
///
/// Each handle keeps its behaviour out of `update` calls until it is handed
/// back to [`Scheduler::release`][crate::Scheduler::release].  Handles are
/// neither `Clone` nor `Copy`, so releasing consumes them; the scheduler
/// keeps the set of outstanding tokens and rejects any other.
///
/// Several handles on one behaviour compose: it resumes only after every one
/// of them was released.
///
/// Dropping a handle does not release it.  The behaviour stays frozen for
/// good and the token stays outstanding in the scheduler, even after the
/// behaviour is destroyed.
#[must_use = "a frozen behaviour stays frozen until its handle is released"]
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct FreezeHandle {
    behaviour: BehaviourId,
    token:     u64,
}

impl FreezeHandle {
    /// Scheduler-side constructor.  `token` must be unique per scheduler.
    pub fn new(behaviour: BehaviourId, token: u64) -> Self {
        Self { behaviour, token }
    }

    /// The frozen behaviour.
    pub fn behaviour(&self) -> BehaviourId {
        self.behaviour
    }

    pub fn token(&self) -> u64 {
        self.token
    }
}

impl fmt::Display for FreezeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "freeze#{} on {}", self.token, self.behaviour)
    }
}
