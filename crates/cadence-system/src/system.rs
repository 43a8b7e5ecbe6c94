//! The `BehaviourSystem` and its tick pass.

use cadence_behaviour::{
    Behaviour, BehaviourContext, BehaviourError, BehaviourResult, FreezeHandle, Phase, Scheduler,
};
use cadence_core::{BehaviourId, BehaviourTypeId, CoreError, FamilyId, NodeId, SchedulerConfig};
use cadence_schedule::{BehaviourFamily, FamilyRegistry, OrderingLookup, PendingSet};
use log::trace;
use rustc_hash::FxHashMap;

use crate::{
    BehaviourRecord, BehaviourStore, Lifecycle, SystemError, SystemObserver, SystemResult,
    TickStats,
};

// ── BehaviourSystem ───────────────────────────────────────────────────────────

/// Owns every behaviour record, the family registry and the pending set,
/// and runs the per-tick pass:
///
/// 1. **Start**: drain the pending set.  Each behaviour is placed in its
///    family (unless frozen) and `start` is called.  Behaviours attached by
///    a `start` callback are drained in the same tick.
/// 2. **Order**: rebuild the family order if a family or edge was added.
///    A cycle fails the tick.
/// 3. **Update**: walk the families in order, each one from its last slot
///    to its first, calling `update` on live slots and compacting empty ones.
///
/// Create via [`SystemBuilder`][crate::SystemBuilder].
pub struct BehaviourSystem {
    config:     SchedulerConfig,
    store:      BehaviourStore,
    registry:   FamilyRegistry,
    pending:    PendingSet,
    lookup:     Box<dyn OrderingLookup>,
    observer:   Box<dyn SystemObserver>,
    /// Outstanding freeze tokens → frozen behaviour.
    freezes:    FxHashMap<u64, BehaviourId>,
    next_token: u64,
    /// Family being walked and the slot the walk is on.
    walking:    Option<(FamilyId, usize)>,
    updating:   bool,
    tick:       u64,
}

impl BehaviourSystem {
    pub(crate) fn from_parts(
        config:   SchedulerConfig,
        lookup:   Box<dyn OrderingLookup>,
        observer: Box<dyn SystemObserver>,
    ) -> Self {
        Self {
            store: BehaviourStore::new(),
            registry: FamilyRegistry::new(&config),
            pending: PendingSet::with_capacity(config.pending_capacity),
            config,
            lookup,
            observer,
            freezes: FxHashMap::default(),
            next_token: 0,
            walking: None,
            updating: false,
            tick: 0,
        }
    }

    // ── Attach / register ─────────────────────────────────────────────────

    /// Store `behaviour` as attached to `owner`.  It is not scheduled until
    /// [`register`][Self::register] is called.
    pub fn attach<B: Behaviour>(&mut self, owner: NodeId, behaviour: B) -> BehaviourId {
        self.store
            .insert(BehaviourTypeId::of::<B>(), Box::new(behaviour), owner)
    }

    /// Queue an attached behaviour for starting on the next tick.
    pub fn register(&mut self, id: BehaviourId) -> SystemResult<()> {
        let record = self
            .store
            .get_mut(id)
            .ok_or(CoreError::BehaviourNotFound(id))?;
        if record.lifecycle != Lifecycle::Idle {
            return Err(SystemError::AlreadyRegistered(id));
        }
        self.enqueue(id);
        Ok(())
    }

    /// Take `id` out of scheduling; it stays attached to its node.
    ///
    /// Pending behaviours are dropped from the queue silently.  Started ones
    /// leave their family and get `stop`.  Unregistered ones are a no-op.
    pub fn unregister(&mut self, id: BehaviourId) -> SystemResult<()> {
        if !self.unschedule(id) {
            return Err(CoreError::BehaviourNotFound(id).into());
        }
        Ok(())
    }

    /// Unregister `id` and hand its behaviour back to the caller.
    pub fn detach(&mut self, id: BehaviourId) -> SystemResult<Box<dyn Behaviour>> {
        if !self.unschedule(id) {
            return Err(CoreError::BehaviourNotFound(id).into());
        }
        self.store
            .remove(id)
            .and_then(|record| record.behaviour)
            .ok_or_else(|| CoreError::BehaviourNotFound(id).into())
    }

    /// Unregister and drop `id`.
    ///
    /// Destroying a behaviour from inside one of its own callbacks is
    /// deferred until that callback returns.
    pub fn destroy(&mut self, id: BehaviourId) -> BehaviourResult<()> {
        if !self.unschedule(id) {
            return Err(CoreError::BehaviourNotFound(id).into());
        }
        let Some(record) = self.store.get_mut(id) else {
            return Ok(());
        };
        if record.is_checked_out() {
            record.destroy_deferred = true;
        } else {
            self.store.remove(id);
        }
        Ok(())
    }

    fn enqueue(&mut self, id: BehaviourId) {
        if let Some(record) = self.store.get_mut(id) {
            record.lifecycle = Lifecycle::Pending;
            self.pending.insert(id);
            trace!("{id} pending");
        }
    }

    /// Shared removal path.  `false` if `id` is unknown.
    fn unschedule(&mut self, id: BehaviourId) -> bool {
        let Some(record) = self.store.get_mut(id) else {
            return false;
        };
        match record.lifecycle {
            Lifecycle::Idle => {}
            Lifecycle::Pending => {
                record.lifecycle = Lifecycle::Idle;
                self.pending.remove(id);
                trace!("{id} dropped before start");
            }
            Lifecycle::Running => {
                record.lifecycle = Lifecycle::Idle;
                let family = record.family.take();
                let slot = record.index_in_family.take();
                if let (Some(family), Some(index)) = (family, slot) {
                    self.leave_family(family, index);
                }
                self.stop(id);
            }
        }
        true
    }

    /// Take slot `index` out of `family`.
    ///
    /// Slots the current walk has yet to reach are only emptied: the tail
    /// has already been updated, and swapping it down would update it twice.
    /// The walk compacts the hole when it gets there.
    fn leave_family(&mut self, family: FamilyId, index: usize) {
        match self.walking {
            Some((walked, cursor)) if walked == family && index < cursor => {
                if let Some(members) = self.registry.get_mut(family) {
                    members.vacate(index);
                }
            }
            _ => self.swap_out(family, index),
        }
    }

    /// Swap-with-last removal of slot `index`, fixing the moved member.
    fn swap_out(&mut self, family: FamilyId, index: usize) {
        let Some(members) = self.registry.get_mut(family) else {
            return;
        };
        if let Some(moved) = members.swap_remove(index) {
            if let Some(record) = self.store.get_mut(moved) {
                record.index_in_family = Some(index);
            }
        }
    }

    // ── Freeze ────────────────────────────────────────────────────────────

    /// Acquire one freeze on `id`.
    ///
    /// The first freeze empties the behaviour's slot in place; the slot is
    /// compacted by the next walk of its family.
    pub fn freeze(&mut self, id: BehaviourId) -> BehaviourResult<FreezeHandle> {
        let record = self
            .store
            .get_mut(id)
            .ok_or(CoreError::BehaviourNotFound(id))?;
        record.freeze_count += 1;
        if record.freeze_count == 1 {
            if let (Some(family), Some(index)) = (record.family, record.index_in_family.take()) {
                if let Some(members) = self.registry.get_mut(family) {
                    members.vacate(index);
                }
            }
        }
        trace!("{id} frozen ({})", record.freeze_count);

        self.next_token += 1;
        let token = self.next_token;
        self.freezes.insert(token, id);
        Ok(FreezeHandle::new(id, token))
    }

    /// Release one freeze.  The last release re-appends the behaviour to its
    /// family with a fresh index.
    ///
    /// Releasing a handle whose behaviour was destroyed meanwhile succeeds
    /// and does nothing else.
    pub fn release(&mut self, handle: FreezeHandle) -> BehaviourResult<()> {
        let (id, token) = (handle.behaviour(), handle.token());
        if self.freezes.get(&token) != Some(&id) {
            return Err(BehaviourError::FreezeAlreadyReleased { behaviour: id, token });
        }
        self.freezes.remove(&token);

        let Some(record) = self.store.get_mut(id) else {
            return Ok(());
        };
        record.freeze_count = record
            .freeze_count
            .checked_sub(1)
            .ok_or(BehaviourError::FreezeUnderflow(id))?;
        trace!("{id} released ({})", record.freeze_count);

        if record.freeze_count == 0
            && record.lifecycle == Lifecycle::Running
            && record.index_in_family.is_none()
        {
            if let Some(members) = record.family.and_then(|f| self.registry.get_mut(f)) {
                record.index_in_family = Some(members.push(id));
            }
        }
        Ok(())
    }

    // ── Ordering ──────────────────────────────────────────────────────────

    /// Require every `Earlier` to update before every `Later`, in addition
    /// to the lookup's constraints.  A cycle surfaces on the next tick.
    pub fn declare_order<Earlier, Later>(&mut self) -> SystemResult<()>
    where
        Earlier: ?Sized + 'static,
        Later: ?Sized + 'static,
    {
        let earlier = self
            .registry
            .family_for(BehaviourTypeId::of::<Earlier>(), self.lookup.as_ref());
        let later = self
            .registry
            .family_for(BehaviourTypeId::of::<Later>(), self.lookup.as_ref());
        self.registry.require_order(earlier, later)?;
        Ok(())
    }

    /// Family types in execution order, rebuilding it if needed.
    pub fn execution_order(&mut self) -> SystemResult<Vec<BehaviourTypeId>> {
        self.refresh_order()?;
        Ok(self.ordered_types())
    }

    fn refresh_order(&mut self) -> SystemResult<()> {
        let rebuild = self.registry.is_dirty();
        self.registry.execution_order()?;
        if rebuild {
            let types = self.ordered_types();
            self.observer.on_order_rebuilt(&types);
        }
        Ok(())
    }

    fn ordered_types(&self) -> Vec<BehaviourTypeId> {
        self.registry
            .cached_order()
            .iter()
            .filter_map(|&f| self.registry.get(f))
            .map(BehaviourFamily::type_id)
            .collect()
    }

    // ── Tick ──────────────────────────────────────────────────────────────

    /// Run one tick.
    ///
    /// Fails with [`SystemError::UpdateInProgress`] if a previous tick never
    /// finished (a callback panicked through it), and with a cycle error if
    /// the ordering constraints loop.
    pub fn update(&mut self, delta: f32) -> SystemResult<TickStats> {
        if self.updating {
            return Err(SystemError::UpdateInProgress);
        }
        self.updating = true;
        let result = self.run_tick(delta);
        self.updating = false;
        result
    }

    fn run_tick(&mut self, delta: f32) -> SystemResult<TickStats> {
        self.tick += 1;
        let mut stats = TickStats { tick: self.tick, ..TickStats::default() };
        self.observer.on_tick_start(self.tick);

        stats.started = self.start_pending();
        self.refresh_order()?;

        let mut position = 0;
        while let Some(&family) = self.registry.cached_order().get(position) {
            self.update_family(family, delta, &mut stats);
            position += 1;
        }

        if self.config.validate_families {
            self.validate()?;
        }
        self.observer.on_tick_end(&stats);
        Ok(stats)
    }

    /// Start everything pending, including behaviours attached by the
    /// `start` callbacks themselves.
    fn start_pending(&mut self) -> usize {
        let mut started = 0;
        loop {
            let batch = self.pending.begin_drain();
            if batch.is_empty() {
                self.pending.end_drain(batch);
                return started;
            }
            for &id in &batch {
                if self.pending.claim(id) && self.start(id) {
                    started += 1;
                }
            }
            self.pending.end_drain(batch);
        }
    }

    fn start(&mut self, id: BehaviourId) -> bool {
        let Some(record) = self.store.get_mut(id) else {
            return false;
        };
        if record.lifecycle != Lifecycle::Pending {
            return false;
        }
        let ty = record.type_id;
        let family = self.registry.family_for(ty, self.lookup.as_ref());
        record.lifecycle = Lifecycle::Running;
        record.family = Some(family);
        if record.freeze_count == 0 {
            if let Some(members) = self.registry.get_mut(family) {
                record.index_in_family = Some(members.push(id));
            }
        }

        self.observer.on_started(id, ty);
        trace!("start {id} ({ty})");
        self.invoke(id, Phase::Start, |b, ctx| b.start(ctx));
        true
    }

    /// Walk one family from its last slot down to slot 0.
    fn update_family(&mut self, family: FamilyId, delta: f32, stats: &mut TickStats) {
        let Some(mut index) = self.registry.get(family).map(BehaviourFamily::len) else {
            return;
        };
        while index > 0 {
            index -= 1;
            let Some(members) = self.registry.get_mut(family) else {
                break;
            };
            // Callbacks may have shrunk the family below the cursor.
            if index >= members.len() {
                continue;
            }
            match members.get(index) {
                Some(id) => {
                    self.walking = Some((family, index));
                    if self.invoke(id, Phase::Update, |b, ctx| b.update(delta, ctx)) {
                        stats.updated += 1;
                    }
                }
                None => {
                    if let Some(moved) = members.swap_remove(index) {
                        if let Some(record) = self.store.get_mut(moved) {
                            record.index_in_family = Some(index);
                        }
                    }
                    stats.compacted += 1;
                }
            }
        }
        self.walking = None;
    }

    fn stop(&mut self, id: BehaviourId) {
        let Some(record) = self.store.get_mut(id) else {
            return;
        };
        if record.is_checked_out() {
            record.stop_deferred = true;
            return;
        }
        let ty = record.type_id;
        self.observer.on_stopped(id, ty);
        trace!("stop {id} ({ty})");
        self.invoke(id, Phase::Stop, |b, ctx| b.stop(ctx));
    }

    // ── Callbacks ─────────────────────────────────────────────────────────

    /// Check the behaviour out, run `f` with a context over `self`, check it
    /// back in.  `false` if there was nothing to call.
    fn invoke<F>(&mut self, id: BehaviourId, phase: Phase, f: F) -> bool
    where
        F: FnOnce(&mut dyn Behaviour, &mut BehaviourContext<'_>),
    {
        let Some(owner) = self.store.get(id).map(BehaviourRecord::owner) else {
            return false;
        };
        let Some(mut behaviour) = self.store.check_out(id) else {
            return false;
        };
        {
            let mut ctx = BehaviourContext::new(self, id, owner, phase);
            f(behaviour.as_mut(), &mut ctx);
        }
        self.check_in(id, owner, behaviour);
        true
    }

    /// Run any stop requested while `behaviour` was out, then put it back or
    /// drop it.
    fn check_in(&mut self, id: BehaviourId, owner: NodeId, mut behaviour: Box<dyn Behaviour>) {
        while let Some(record) = self.store.get_mut(id) {
            if !record.stop_deferred {
                break;
            }
            record.stop_deferred = false;
            let ty = record.type_id;
            self.observer.on_stopped(id, ty);
            trace!("stop {id} ({ty}), deferred");
            let mut ctx = BehaviourContext::new(self, id, owner, Phase::Stop);
            behaviour.stop(&mut ctx);
        }

        let Some(record) = self.store.get_mut(id) else {
            return;
        };
        if record.destroy_deferred {
            self.store.remove(id);
        } else {
            record.behaviour = Some(behaviour);
        }
    }

    // ── Validation ────────────────────────────────────────────────────────

    /// Check both directions of the slot ↔ record link.
    pub fn validate(&self) -> SystemResult<()> {
        for (family, members) in self.registry.iter() {
            for (index, slot) in members.slots().iter().enumerate() {
                let Some(id) = *slot else {
                    continue;
                };
                let recorded = self
                    .store
                    .get(id)
                    .filter(|r| r.family == Some(family))
                    .and_then(BehaviourRecord::index_in_family);
                if recorded != Some(index) {
                    return Err(SystemError::IndexMismatch {
                        behaviour: id,
                        family,
                        recorded,
                        actual: Some(index),
                    });
                }
            }
        }
        for (id, record) in self.store.iter() {
            let Some(index) = record.index_in_family else {
                continue;
            };
            let family = record.family.unwrap_or(FamilyId::INVALID);
            let occupant = self.registry.get(family).and_then(|m| m.get(index));
            if occupant != Some(id) || record.is_frozen() {
                return Err(SystemError::IndexMismatch {
                    behaviour: id,
                    family,
                    recorded: Some(index),
                    actual: None,
                });
            }
        }
        Ok(())
    }

    // ── Queries ───────────────────────────────────────────────────────────

    pub fn owner_of(&self, id: BehaviourId) -> Option<NodeId> {
        self.store.get(id).map(BehaviourRecord::owner)
    }

    pub fn is_frozen(&self, id: BehaviourId) -> bool {
        self.store.get(id).is_some_and(BehaviourRecord::is_frozen)
    }

    pub fn record(&self, id: BehaviourId) -> Option<&BehaviourRecord> {
        self.store.get(id)
    }

    /// Typed view of behaviour `id`.
    pub fn behaviour<T: Behaviour>(&self, id: BehaviourId) -> Option<&T> {
        self.store.behaviour::<T>(id)
    }

    pub fn behaviour_mut<T: Behaviour>(&mut self, id: BehaviourId) -> Option<&mut T> {
        self.store.behaviour_mut::<T>(id)
    }

    /// Behaviours attached to `node`, in attach order.
    pub fn owned_by(&self, node: NodeId) -> &[BehaviourId] {
        self.store.owned_by(node)
    }

    /// The family holding `T`, once a `T` has started or been referenced.
    pub fn family_of<T: ?Sized + 'static>(&self) -> Option<&BehaviourFamily> {
        self.registry
            .family_of(BehaviourTypeId::of::<T>())
            .and_then(|f| self.registry.get(f))
    }

    pub fn store(&self) -> &BehaviourStore {
        &self.store
    }

    pub fn registry(&self) -> &FamilyRegistry {
        &self.registry
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Freeze tokens handed out and not yet released, including those whose
    /// behaviour has since been destroyed.
    pub fn outstanding_freezes(&self) -> usize {
        self.freezes.len()
    }

    /// Behaviours registered but not yet started.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Number of ticks run so far.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn is_updating(&self) -> bool {
        self.updating
    }
}

// ── Scheduler seam ────────────────────────────────────────────────────────────

impl Scheduler for BehaviourSystem {
    fn freeze(&mut self, id: BehaviourId) -> BehaviourResult<FreezeHandle> {
        BehaviourSystem::freeze(self, id)
    }

    fn release(&mut self, handle: FreezeHandle) -> BehaviourResult<()> {
        BehaviourSystem::release(self, handle)
    }

    fn destroy(&mut self, id: BehaviourId) -> BehaviourResult<()> {
        BehaviourSystem::destroy(self, id)
    }

    fn attach_boxed(
        &mut self,
        owner:     NodeId,
        type_id:   BehaviourTypeId,
        behaviour: Box<dyn Behaviour>,
    ) -> BehaviourId {
        let id = self.store.insert(type_id, behaviour, owner);
        self.enqueue(id);
        id
    }

    fn owner_of(&self, id: BehaviourId) -> Option<NodeId> {
        BehaviourSystem::owner_of(self, id)
    }

    fn is_frozen(&self, id: BehaviourId) -> bool {
        BehaviourSystem::is_frozen(self, id)
    }
}
