//! `PendingSet` — behaviours registered but not yet started.
//!
//! # Double buffering
//!
//! `start` callbacks may register further behaviours (or remove pending
//! ones) while a batch is being drained.  The set therefore keeps two
//! buffers: [`begin_drain`][PendingSet::begin_drain] hands the current one
//! out as a batch and swaps the spare in to receive new registrations.  The
//! drained buffer is given back with [`end_drain`][PendingSet::end_drain] so
//! its allocation is reused on the next swap.
//!
//! # Removal
//!
//! Membership lives in a hash set; removal is O(1) and simply forgets the id.
//! Buffers may still hold the id; [`claim`][PendingSet::claim] is how the
//! drainer checks an id is still pending, and it succeeds at most once, so
//! stale or duplicate buffer entries are skipped.

use cadence_core::BehaviourId;
use rustc_hash::FxHashSet;

/// Insertion-ordered, double-buffered set of pending behaviours.
#[derive(Default)]
pub struct PendingSet {
    front:   Vec<BehaviourId>,
    spare:   Vec<BehaviourId>,
    members: FxHashSet<BehaviourId>,
}

impl PendingSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            front:   Vec::with_capacity(capacity),
            spare:   Vec::with_capacity(capacity),
            members: FxHashSet::default(),
        }
    }

    /// Queue `id` for starting.  Returns `false` if it was already pending.
    pub fn insert(&mut self, id: BehaviourId) -> bool {
        if !self.members.insert(id) {
            return false;
        }
        self.front.push(id);
        true
    }

    /// Forget `id`.  Returns `true` if it was pending.
    pub fn remove(&mut self, id: BehaviourId) -> bool {
        self.members.remove(&id)
    }

    pub fn contains(&self, id: BehaviourId) -> bool {
        self.members.contains(&id)
    }

    /// Number of behaviours currently pending.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Take the current buffer as a batch and start filling the spare one.
    pub fn begin_drain(&mut self) -> Vec<BehaviourId> {
        let spare = std::mem::take(&mut self.spare);
        std::mem::replace(&mut self.front, spare)
    }

    /// Mark `id` as no longer pending.  `false` if it was removed meanwhile
    /// or already claimed.
    pub fn claim(&mut self, id: BehaviourId) -> bool {
        self.members.remove(&id)
    }

    /// Return a drained batch so its allocation becomes the next spare.
    pub fn end_drain(&mut self, mut batch: Vec<BehaviourId>) {
        batch.clear();
        if batch.capacity() > self.spare.capacity() {
            self.spare = batch;
        }
    }
}
