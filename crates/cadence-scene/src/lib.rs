//! `cadence-scene` — node tree and the `NodeManager` facade.
//!
//! The host owns one [`NodeManager`] per scene.  It keeps the node forest
//! and the behaviour scheduler in step: linking a subtree into the live
//! scene registers its behaviours, unlinking it unregisters them, and
//! [`NodeManager::update`] runs one scheduler tick per frame.
//!
//! ```rust,ignore
//! let system = SystemBuilder::new().ordering(table).build();
//! let mut manager = NodeManager::new(system);
//!
//! let root = manager.create_node("root");
//! manager.add_behaviour(root, Spinner::default())?;
//! manager.add_root(root)?;
//!
//! loop {
//!     manager.update(frame_delta)?;
//! }
//! ```
//!
//! # Modules
//!
//! | Module      | Contents                                                  |
//! |-------------|-----------------------------------------------------------|
//! | `tree`      | `SceneTree`, `SceneNode`                                  |
//! | `manager`   | `NodeManager`                                             |
//! | `freeze`    | `NodeFreeze`                                              |
//! | `hierarchy` | `HierarchyObserver`, `HierarchyChange`, `HierarchyAction` |
//! | `error`     | `SceneError`, `SceneResult`                               |

pub mod error;
pub mod freeze;
pub mod hierarchy;
pub mod manager;
pub mod tree;

#[cfg(test)]
mod tests;

pub use error::{SceneError, SceneResult};
pub use freeze::NodeFreeze;
pub use hierarchy::{HierarchyAction, HierarchyChange, HierarchyObserver, NoopHierarchyObserver};
pub use manager::NodeManager;
pub use tree::{SceneNode, SceneTree};
