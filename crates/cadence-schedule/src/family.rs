//! `BehaviourFamily` — the live instances of one concrete behaviour type.
//!
//! # Slot model
//!
//! A family is a growable array of `Option<BehaviourId>` plus, on the record
//! side, each member's own `index_in_family`.  Order inside a family carries
//! no meaning, which buys O(1) removal:
//!
//! ```text
//! swap_remove(1):   [a, b, c, d]  →  [a, d, c]     (d.index_in_family = 1)
//! vacate(1):        [a, b, c, d]  →  [a, _, c, d]  (compacted later)
//! ```
//!
//! `vacate` is what freezing uses: nothing shifts, so indices of members not
//! yet visited by the current back-to-front tick walk stay valid.  The walk
//! itself calls `swap_remove` on every empty slot it meets.
//!
//! The family never touches records; whenever a live member moves, the moved
//! id is returned so the caller can rewrite its `index_in_family`.

use cadence_core::{BehaviourId, BehaviourTypeId};

/// Live slot list for one behaviour type.
#[derive(Clone, Debug)]
pub struct BehaviourFamily {
    type_id: BehaviourTypeId,
    slots:   Vec<Option<BehaviourId>>,
}

impl BehaviourFamily {
    pub fn new(type_id: BehaviourTypeId, capacity: usize) -> Self {
        Self {
            type_id,
            slots: Vec::with_capacity(capacity),
        }
    }

    /// The concrete behaviour type this family holds.
    pub fn type_id(&self) -> BehaviourTypeId {
        self.type_id
    }

    /// Slot count, including empty slots awaiting compaction.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Number of occupied slots.
    pub fn live_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Raw slot view.
    pub fn slots(&self) -> &[Option<BehaviourId>] {
        &self.slots
    }

    /// Occupant of `index`, `None` for an empty or out-of-range slot.
    #[inline]
    pub fn get(&self, index: usize) -> Option<BehaviourId> {
        self.slots.get(index).copied().flatten()
    }

    /// Append `id` and return its slot index.
    #[inline]
    pub fn push(&mut self, id: BehaviourId) -> usize {
        self.slots.push(Some(id));
        self.slots.len() - 1
    }

    /// Empty slot `index` in place, returning its previous occupant.
    pub fn vacate(&mut self, index: usize) -> Option<BehaviourId> {
        self.slots.get_mut(index).and_then(Option::take)
    }

    /// Remove slot `index` by moving the last slot into it.
    ///
    /// Returns the id that now lives at `index`, if a live member moved.
    /// Removing the last slot just truncates.  Out-of-range is a no-op.
    pub fn swap_remove(&mut self, index: usize) -> Option<BehaviourId> {
        if index >= self.slots.len() {
            return None;
        }
        self.slots.swap_remove(index);
        self.slots.get(index).copied().flatten()
    }
}
