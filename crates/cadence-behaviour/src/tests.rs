//! Unit tests for cadence-behaviour.

use cadence_core::{BehaviourId, BehaviourTypeId, NodeId};

use crate::{
    Behaviour, BehaviourContext, BehaviourError, BehaviourResult, FreezeHandle, NoopBehaviour,
    Phase, Scheduler,
};

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Scheduler stand-in that records every call.
#[derive(Default)]
struct RecordingScheduler {
    calls:      Vec<String>,
    next_token: u64,
    attached:   Vec<(NodeId, BehaviourTypeId)>,
}

impl Scheduler for RecordingScheduler {
    fn freeze(&mut self, id: BehaviourId) -> BehaviourResult<FreezeHandle> {
        self.calls.push(format!("freeze {}", id.0));
        self.next_token += 1;
        Ok(FreezeHandle::new(id, self.next_token))
    }

    fn release(&mut self, handle: FreezeHandle) -> BehaviourResult<()> {
        self.calls.push(format!("release {}", handle.token()));
        Ok(())
    }

    fn destroy(&mut self, id: BehaviourId) -> BehaviourResult<()> {
        self.calls.push(format!("destroy {}", id.0));
        Ok(())
    }

    fn attach_boxed(
        &mut self,
        owner:      NodeId,
        type_id:    BehaviourTypeId,
        _behaviour: Box<dyn Behaviour>,
    ) -> BehaviourId {
        self.attached.push((owner, type_id));
        BehaviourId::from_index(100 + self.attached.len())
    }

    fn owner_of(&self, _id: BehaviourId) -> Option<NodeId> {
        Some(NodeId(1))
    }

    fn is_frozen(&self, id: BehaviourId) -> bool {
        id == BehaviourId(9)
    }
}

fn context(sched: &mut RecordingScheduler, phase: Phase) -> BehaviourContext<'_> {
    BehaviourContext::new(sched, BehaviourId(5), NodeId(1), phase)
}

#[derive(Default)]
struct Counter {
    updates: u32,
}

impl Behaviour for Counter {
    fn update(&mut self, _delta: f32, _ctx: &mut BehaviourContext<'_>) {
        self.updates += 1;
    }
}

// ── BehaviourContext ──────────────────────────────────────────────────────────

#[cfg(test)]
mod context_tests {
    use super::*;

    #[test]
    fn exposes_caller_identity() {
        let mut sched = RecordingScheduler::default();
        let ctx = context(&mut sched, Phase::Update);
        assert_eq!(ctx.id(), BehaviourId(5));
        assert_eq!(ctx.owner(), NodeId(1));
        assert_eq!(ctx.phase(), Phase::Update);
        assert!(ctx.is_frozen(BehaviourId(9)));
        assert_eq!(ctx.owner_of(BehaviourId(3)), Some(NodeId(1)));
    }

    #[test]
    fn self_operations_target_caller() {
        let mut sched = RecordingScheduler::default();
        {
            let mut ctx = context(&mut sched, Phase::Update);
            let handle = ctx.freeze_self().unwrap();
            assert_eq!(handle.behaviour(), BehaviourId(5));
            ctx.release(handle).unwrap();
            ctx.destroy_self().unwrap();
        }
        assert_eq!(sched.calls, vec!["freeze 5", "release 1", "destroy 5"]);
    }

    #[test]
    fn spawn_attaches_to_callers_node() {
        let mut sched = RecordingScheduler::default();
        let id = {
            let mut ctx = context(&mut sched, Phase::Start);
            ctx.spawn(Counter::default()).unwrap()
        };
        assert_eq!(id, BehaviourId(101));
        assert_eq!(sched.attached, vec![(NodeId(1), BehaviourTypeId::of::<Counter>())]);
    }

    #[test]
    fn spawn_rejected_during_stop() {
        let mut sched = RecordingScheduler::default();
        let mut ctx = context(&mut sched, Phase::Stop);
        let err = ctx.spawn(NoopBehaviour).unwrap_err();
        assert_eq!(err, BehaviourError::SpawnDuringStop(BehaviourId(5)));
    }
}

// ── Behaviour ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod behaviour_tests {
    use super::*;

    #[test]
    fn noop_callbacks_do_nothing() {
        let mut sched = RecordingScheduler::default();
        let mut ctx = context(&mut sched, Phase::Update);
        let mut b = NoopBehaviour;
        b.start(&mut ctx);
        b.update(0.016, &mut ctx);
        b.stop(&mut ctx);
        drop(ctx);
        assert!(sched.calls.is_empty());
    }

    #[test]
    fn boxed_behaviour_downcasts_to_concrete_type() {
        let mut boxed: Box<dyn Behaviour> = Box::new(Counter::default());
        let mut sched = RecordingScheduler::default();
        let mut ctx = context(&mut sched, Phase::Update);
        boxed.update(0.1, &mut ctx);
        boxed.update(0.1, &mut ctx);

        assert_eq!(boxed.downcast_ref::<Counter>().unwrap().updates, 2);
        assert!(boxed.downcast_ref::<NoopBehaviour>().is_none());
        boxed.downcast_mut::<Counter>().unwrap().updates = 0;
        assert_eq!(boxed.downcast_ref::<Counter>().unwrap().updates, 0);
    }
}

// ── FreezeHandle ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod freeze_tests {
    use super::*;

    #[test]
    fn accessors_and_display() {
        let handle = FreezeHandle::new(BehaviourId(3), 7);
        assert_eq!(handle.behaviour(), BehaviourId(3));
        assert_eq!(handle.token(), 7);
        assert_eq!(handle.to_string(), "freeze#7 on BehaviourId(3)");
    }

    #[test]
    fn error_messages_name_the_behaviour() {
        let err = BehaviourError::FreezeAlreadyReleased { behaviour: BehaviourId(3), token: 7 };
        assert_eq!(err.to_string(), "freeze handle #7 on BehaviourId(3) was already released");
        assert_eq!(
            BehaviourError::FreezeUnderflow(BehaviourId(2)).to_string(),
            "freeze count of BehaviourId(2) would drop below zero",
        );
    }
}
