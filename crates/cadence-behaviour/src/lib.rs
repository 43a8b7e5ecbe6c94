//! `cadence-behaviour` — the behaviour trait and what its callbacks can do.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                       |
//! |-------------|----------------------------------------------------------------|
//! | [`model`]   | `Behaviour` trait (`start` / `update` / `stop`), `AsAny`       |
//! | [`context`] | `Scheduler` seam trait, `BehaviourContext<'a>`, `Phase`        |
//! | [`freeze`]  | `FreezeHandle`                                                 |
//! | [`noop`]    | `NoopBehaviour`                                                |
//! | [`error`]   | `BehaviourError`, `BehaviourResult<T>`                         |
//!
//! # Design notes
//!
//! The scheduler (`cadence-system`) sits above this crate.  Callbacks reach
//! it through the object-safe [`Scheduler`] trait, so behaviour code depends
//! only on this crate and `cadence-core`.
//!
//! While a callback runs, the scheduler has taken that one behaviour out of
//! its store; everything else is reachable through the context.

pub mod context;
pub mod error;
pub mod freeze;
pub mod model;
pub mod noop;

#[cfg(test)]
mod tests;

pub use context::{BehaviourContext, Phase, Scheduler};
pub use error::{BehaviourError, BehaviourResult};
pub use freeze::FreezeHandle;
pub use model::{AsAny, Behaviour};
pub use noop::NoopBehaviour;
