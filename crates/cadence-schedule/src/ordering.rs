//! Declarative ordering metadata between behaviour types.
//!
//! The scheduler never inspects behaviour types itself.  The first time it
//! meets a new type it asks an [`OrderingLookup`] for two lists:
//!
//! - **after**: types that must update *before* this one;
//! - **before**: types that must update *after* this one.
//!
//! [`OrderingTable`] is the stock lookup: a static table filled once at
//! startup through a small builder API.
//!
//! ```rust
//! use cadence_schedule::OrderingTable;
//!
//! struct Physics;
//! struct Render;
//! struct Input;
//!
//! let mut table = OrderingTable::new();
//! table.entry::<Render>().after::<Physics>();
//! table.entry::<Input>().before::<Physics>();
//! assert_eq!(table.len(), 2);
//! ```

use cadence_core::BehaviourTypeId;
use rustc_hash::FxHashMap;

// ── Constraints ───────────────────────────────────────────────────────────────

/// The ordering constraints declared for one behaviour type.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OrderingConstraints {
    /// This type updates after every type listed here.
    pub after:  Vec<BehaviourTypeId>,
    /// This type updates before every type listed here.
    pub before: Vec<BehaviourTypeId>,
}

impl OrderingConstraints {
    pub fn is_empty(&self) -> bool {
        self.after.is_empty() && self.before.is_empty()
    }
}

// ── Trait ─────────────────────────────────────────────────────────────────────

/// Source of ordering constraints, queried lazily once per behaviour type.
///
/// # Contract
///
/// - Must return the same answer every time for the same type.
/// - `None` means "no constraints".
pub trait OrderingLookup {
    fn constraints(&self, ty: BehaviourTypeId) -> Option<&OrderingConstraints>;
}

/// A lookup that declares no constraints for any type.
pub struct NoOrdering;

impl OrderingLookup for NoOrdering {
    #[inline]
    fn constraints(&self, _ty: BehaviourTypeId) -> Option<&OrderingConstraints> {
        None
    }
}

// ── Static table ──────────────────────────────────────────────────────────────

/// Explicit registration table mapping behaviour types to their constraints.
#[derive(Clone, Debug, Default)]
pub struct OrderingTable {
    entries: FxHashMap<BehaviourTypeId, OrderingConstraints>,
}

impl OrderingTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start (or continue) declaring constraints for `T`.
    pub fn entry<T: ?Sized + 'static>(&mut self) -> OrderingEntry<'_> {
        self.entry_for(BehaviourTypeId::of::<T>())
    }

    /// Same as [`entry`][Self::entry] for a runtime type key.
    pub fn entry_for(&mut self, ty: BehaviourTypeId) -> OrderingEntry<'_> {
        OrderingEntry {
            constraints: self.entries.entry(ty).or_default(),
        }
    }

    /// Number of types with at least one declared entry.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl OrderingLookup for OrderingTable {
    fn constraints(&self, ty: BehaviourTypeId) -> Option<&OrderingConstraints> {
        self.entries.get(&ty)
    }
}

/// Builder handle returned by [`OrderingTable::entry`].
///
/// Duplicate declarations are ignored.
pub struct OrderingEntry<'a> {
    constraints: &'a mut OrderingConstraints,
}

impl OrderingEntry<'_> {
    /// Declare that the entry's type updates after `T`.
    pub fn after<T: ?Sized + 'static>(self) -> Self {
        self.after_type(BehaviourTypeId::of::<T>())
    }

    /// Declare that the entry's type updates before `T`.
    pub fn before<T: ?Sized + 'static>(self) -> Self {
        self.before_type(BehaviourTypeId::of::<T>())
    }

    pub fn after_type(self, ty: BehaviourTypeId) -> Self {
        if !self.constraints.after.contains(&ty) {
            self.constraints.after.push(ty);
        }
        self
    }

    pub fn before_type(self, ty: BehaviourTypeId) -> Self {
        if !self.constraints.before.contains(&ty) {
            self.constraints.before.push(ty);
        }
        self
    }
}
