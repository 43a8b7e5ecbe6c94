//! `BehaviourStore` — arena of behaviour records.
//!
//! # Records
//!
//! Each attached behaviour owns one [`BehaviourRecord`]: the boxed
//! behaviour plus the scheduling bookkeeping the families refer to by index.
//!
//! ```text
//! records[id]  ─▶  behaviour, type_id, owner,
//!                  family, index_in_family, freeze_count, lifecycle
//! ```
//!
//! While a callback runs, its box is *checked out* (`behaviour == None`):
//! the system can then pass `&mut self` to the callback without aliasing the
//! behaviour.  Stops and destruction requested against a checked-out record
//! are deferred until the box is checked back in.
//!
//! Ids are never reused; a removed slot stays `None`.

use cadence_behaviour::Behaviour;
use cadence_core::{BehaviourId, BehaviourTypeId, FamilyId, NodeId};
use rustc_hash::FxHashMap;

// ── Lifecycle ─────────────────────────────────────────────────────────────────

/// Where a record stands with respect to scheduling.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Lifecycle {
    /// Not registered: owned by a node outside the scene, or unregistered.
    Idle,
    /// Registered, waiting for the next drain to call `start`.
    Pending,
    /// Started.  Placed in its family unless frozen.
    Running,
}

// ── BehaviourRecord ───────────────────────────────────────────────────────────

/// Scheduling state of one behaviour.
///
/// Invariants (checked by `SchedulerConfig::validate_families`):
/// - `index_in_family.is_some()` iff the record occupies that slot of
///   `family`;
/// - `freeze_count > 0` ⇒ `index_in_family.is_none()`.
pub struct BehaviourRecord {
    pub(crate) behaviour:        Option<Box<dyn Behaviour>>,
    pub(crate) type_id:          BehaviourTypeId,
    pub(crate) owner:            NodeId,
    pub(crate) family:           Option<FamilyId>,
    pub(crate) index_in_family:  Option<usize>,
    pub(crate) freeze_count:     u32,
    pub(crate) lifecycle:        Lifecycle,
    pub(crate) stop_deferred:    bool,
    pub(crate) destroy_deferred: bool,
}

impl BehaviourRecord {
    fn new(type_id: BehaviourTypeId, behaviour: Box<dyn Behaviour>, owner: NodeId) -> Self {
        Self {
            behaviour: Some(behaviour),
            type_id,
            owner,
            family: None,
            index_in_family: None,
            freeze_count: 0,
            lifecycle: Lifecycle::Idle,
            stop_deferred: false,
            destroy_deferred: false,
        }
    }

    pub fn type_id(&self) -> BehaviourTypeId {
        self.type_id
    }

    pub fn owner(&self) -> NodeId {
        self.owner
    }

    pub fn family(&self) -> Option<FamilyId> {
        self.family
    }

    /// Live slot, `None` when pending, frozen or unregistered.
    pub fn index_in_family(&self) -> Option<usize> {
        self.index_in_family
    }

    pub fn freeze_count(&self) -> u32 {
        self.freeze_count
    }

    pub fn is_frozen(&self) -> bool {
        self.freeze_count > 0
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    /// `true` while one of this behaviour's callbacks is on the stack.
    pub fn is_checked_out(&self) -> bool {
        self.behaviour.is_none()
    }
}

// ── BehaviourStore ────────────────────────────────────────────────────────────

/// Arena of [`BehaviourRecord`]s with a per-node index.
#[derive(Default)]
pub struct BehaviourStore {
    records:  Vec<Option<BehaviourRecord>>,
    by_owner: FxHashMap<NodeId, Vec<BehaviourId>>,
    live:     usize,
}

impl BehaviourStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a behaviour attached to `owner`.  Starts `Idle`.
    pub fn insert(
        &mut self,
        type_id:   BehaviourTypeId,
        behaviour: Box<dyn Behaviour>,
        owner:     NodeId,
    ) -> BehaviourId {
        let id = BehaviourId::from_index(self.records.len());
        self.records.push(Some(BehaviourRecord::new(type_id, behaviour, owner)));
        self.by_owner.entry(owner).or_default().push(id);
        self.live += 1;
        id
    }

    /// Drop the record, returning it (with its box unless checked out).
    pub fn remove(&mut self, id: BehaviourId) -> Option<BehaviourRecord> {
        let record = self.records.get_mut(id.index())?.take()?;
        self.unlink_owner(record.owner, id);
        self.live -= 1;
        Some(record)
    }

    fn unlink_owner(&mut self, node: NodeId, id: BehaviourId) {
        if let Some(ids) = self.by_owner.get_mut(&node) {
            ids.retain(|&b| b != id);
            if ids.is_empty() {
                self.by_owner.remove(&node);
            }
        }
    }

    #[inline]
    pub fn get(&self, id: BehaviourId) -> Option<&BehaviourRecord> {
        self.records.get(id.index()).and_then(Option::as_ref)
    }

    #[inline]
    pub fn get_mut(&mut self, id: BehaviourId) -> Option<&mut BehaviourRecord> {
        self.records.get_mut(id.index()).and_then(Option::as_mut)
    }

    pub fn contains(&self, id: BehaviourId) -> bool {
        self.get(id).is_some()
    }

    /// Behaviours attached to `node`, in attach order.
    pub fn owned_by(&self, node: NodeId) -> &[BehaviourId] {
        self.by_owner.get(&node).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// All records with their ids, ascending.
    pub fn iter(&self) -> impl Iterator<Item = (BehaviourId, &BehaviourRecord)> + '_ {
        self.records
            .iter()
            .enumerate()
            .filter_map(|(i, r)| r.as_ref().map(|r| (BehaviourId::from_index(i), r)))
    }

    // ── Behaviour access ──────────────────────────────────────────────────

    /// Typed view of behaviour `id`.  `None` if missing, checked out, or
    /// not a `T`.
    pub fn behaviour<T: Behaviour>(&self, id: BehaviourId) -> Option<&T> {
        self.get(id)?.behaviour.as_deref()?.downcast_ref::<T>()
    }

    pub fn behaviour_mut<T: Behaviour>(&mut self, id: BehaviourId) -> Option<&mut T> {
        self.get_mut(id)?.behaviour.as_deref_mut()?.downcast_mut::<T>()
    }

    /// Take the box out for a callback.
    pub(crate) fn check_out(&mut self, id: BehaviourId) -> Option<Box<dyn Behaviour>> {
        self.get_mut(id)?.behaviour.take()
    }
}
