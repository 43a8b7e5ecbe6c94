//! `cadence-schedule` — the ordering half of the behaviour scheduler.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                     |
//! |--------------|--------------------------------------------------------------|
//! | [`ordering`] | `OrderingLookup` trait, `OrderingTable`, `NoOrdering`        |
//! | [`family`]   | `BehaviourFamily` (slot list with swap-with-last removal)    |
//! | [`graph`]    | `DependencyGraph` + depth-first topological order            |
//! | [`registry`] | `FamilyRegistry` (type → family, order cache)                |
//! | [`pending`]  | `PendingSet` (double-buffered start queue)                   |
//! | [`error`]    | `CycleError`, `ScheduleError`, `ScheduleResult<T>`           |
//!
//! # Tick model (summary)
//!
//! ```text
//! drain PendingSet        → place each behaviour in its family, start it
//! registry.execution_order()  (rebuilt only if a family/edge was added)
//! for family in order:
//!     for slot in family.slots (last → first):
//!         live  → update
//!         empty → swap_remove (lazy compaction)
//! ```
//!
//! This crate only stores ids; the records and callbacks live in
//! `cadence-system`.

pub mod error;
pub mod family;
pub mod graph;
pub mod ordering;
pub mod pending;
pub mod registry;


pub use error::{CycleError, ScheduleError, ScheduleResult};
pub use family::BehaviourFamily;
pub use graph::DependencyGraph;
pub use ordering::{NoOrdering, OrderingConstraints, OrderingEntry, OrderingLookup, OrderingTable};
pub use pending::PendingSet;
pub use registry::FamilyRegistry;
