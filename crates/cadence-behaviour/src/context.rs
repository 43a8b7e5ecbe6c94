//! Scheduler access handed to every behaviour callback.

use cadence_core::{BehaviourId, BehaviourTypeId, NodeId};

use crate::{Behaviour, BehaviourError, BehaviourResult, FreezeHandle};

/// Which callback a [`BehaviourContext`] was built for.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Phase {
    Start,
    Update,
    Stop,
}

/// The scheduling operations a behaviour may perform while it runs.
///
/// Implemented by `cadence_system::BehaviourSystem`; behaviours only ever see
/// it through a [`BehaviourContext`].  All effects are immediate: a frozen or
/// destroyed behaviour is skipped by the rest of the current tick.
pub trait Scheduler {
    /// Acquire one freeze on `id`.
    fn freeze(&mut self, id: BehaviourId) -> BehaviourResult<FreezeHandle>;

    /// Give back a freeze acquired with [`freeze`][Self::freeze].
    fn release(&mut self, handle: FreezeHandle) -> BehaviourResult<()>;

    /// Remove `id` from scheduling and its node, then drop it.  `stop` fires
    /// if it had started.
    fn destroy(&mut self, id: BehaviourId) -> BehaviourResult<()>;

    /// Attach a new behaviour to `owner`; it starts on the next drain.
    fn attach_boxed(
        &mut self,
        owner:     NodeId,
        type_id:   BehaviourTypeId,
        behaviour: Box<dyn Behaviour>,
    ) -> BehaviourId;

    /// Node `id` is attached to.
    fn owner_of(&self, id: BehaviourId) -> Option<NodeId>;

    /// `true` while at least one freeze handle on `id` is outstanding.
    fn is_frozen(&self, id: BehaviourId) -> bool;
}

/// Per-callback view of the scheduler.
///
/// Built by the scheduler for exactly one callback invocation on the
/// behaviour `id()`, attached to `owner()`.
pub struct BehaviourContext<'a> {
    scheduler: &'a mut dyn Scheduler,
    this:      BehaviourId,
    owner:     NodeId,
    phase:     Phase,
}

impl<'a> BehaviourContext<'a> {
    #[inline]
    pub fn new(
        scheduler: &'a mut dyn Scheduler,
        this:      BehaviourId,
        owner:     NodeId,
        phase:     Phase,
    ) -> Self {
        Self { scheduler, this, owner, phase }
    }

    /// The behaviour being called.
    pub fn id(&self) -> BehaviourId {
        self.this
    }

    /// Its node (the previous node during `stop`).
    pub fn owner(&self) -> NodeId {
        self.owner
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn freeze(&mut self, id: BehaviourId) -> BehaviourResult<FreezeHandle> {
        self.scheduler.freeze(id)
    }

    /// Freeze the calling behaviour.
    pub fn freeze_self(&mut self) -> BehaviourResult<FreezeHandle> {
        self.scheduler.freeze(self.this)
    }

    pub fn release(&mut self, handle: FreezeHandle) -> BehaviourResult<()> {
        self.scheduler.release(handle)
    }

    pub fn destroy(&mut self, id: BehaviourId) -> BehaviourResult<()> {
        self.scheduler.destroy(id)
    }

    /// Destroy the calling behaviour.  Its `stop` runs once this callback
    /// returns.
    pub fn destroy_self(&mut self) -> BehaviourResult<()> {
        self.scheduler.destroy(self.this)
    }

    /// Attach `behaviour` to the caller's node.
    ///
    /// Not available from `stop`: the node may be leaving the scene.
    pub fn spawn<B: Behaviour>(&mut self, behaviour: B) -> BehaviourResult<BehaviourId> {
        if self.phase == Phase::Stop {
            return Err(BehaviourError::SpawnDuringStop(self.this));
        }
        Ok(self.scheduler.attach_boxed(
            self.owner,
            BehaviourTypeId::of::<B>(),
            Box::new(behaviour),
        ))
    }

    pub fn is_frozen(&self, id: BehaviourId) -> bool {
        self.scheduler.is_frozen(id)
    }

    pub fn owner_of(&self, id: BehaviourId) -> Option<NodeId> {
        self.scheduler.owner_of(id)
    }
}
