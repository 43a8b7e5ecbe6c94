//! `cadence-system` — the behaviour scheduler proper.
//!
//! # Tick
//!
//! ```text
//! update(delta):
//!   ① Start   — drain the pending set; place each behaviour in its family
//!               and call `start`.  Spawns from `start` join the drain.
//!   ② Order   — rebuild the family order if families or edges were added.
//!   ③ Update  — for each family in order, walk slots last → first:
//!                 live slot  → `update(delta)`
//!                 empty slot → swap-with-last compaction
//! ```
//!
//! Freezing empties a slot in place and never shifts other members, so a
//! walk in progress is never disturbed.
//!
//! # Modules
//!
//! | Module     | Contents                                          |
//! |------------|---------------------------------------------------|
//! | `store`    | `BehaviourStore`, `BehaviourRecord`, `Lifecycle`  |
//! | `system`   | `BehaviourSystem`                                 |
//! | `builder`  | `SystemBuilder`                                   |
//! | `observer` | `SystemObserver`, `NoopObserver`, `TickStats`     |
//! | `error`    | `SystemError`, `SystemResult`                     |

pub mod builder;
pub mod error;
pub mod observer;
pub mod store;
pub mod system;


pub use builder::SystemBuilder;
pub use error::{SystemError, SystemResult};
pub use observer::{NoopObserver, SystemObserver, TickStats};
pub use store::{BehaviourRecord, BehaviourStore, Lifecycle};
pub use system::BehaviourSystem;
