//! `cadence-core` — foundational types for the cadence behaviour scheduler.
//!
//! This crate is a dependency of every other `cadence-*` crate.  It has no
//! `cadence-*` dependencies and minimal external ones (only `thiserror`,
//! plus optional `serde`).
//!
//! # What lives here
//!
//! | Module        | Contents                                          |
//! |---------------|---------------------------------------------------|
//! | [`ids`]       | `NodeId`, `BehaviourId`, `FamilyId`               |
//! | [`type_key`]  | `BehaviourTypeId` (concrete-type scheduling key)  |
//! | [`config`]    | `SchedulerConfig`                                 |
//! | [`error`]     | `CoreError`, `CoreResult`                         |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to ids and `SchedulerConfig`. |

pub mod config;
pub mod error;
pub mod ids;
pub mod type_key;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::SchedulerConfig;
pub use error::{CoreError, CoreResult};
pub use ids::{BehaviourId, FamilyId, NodeId};
pub use type_key::BehaviourTypeId;
