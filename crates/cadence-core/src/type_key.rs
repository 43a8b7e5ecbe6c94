//! `BehaviourTypeId` — the scheduling key for a concrete behaviour type.
//!
//! Families are keyed by the *concrete* runtime type of a behaviour, never by
//! a trait or base type.  `std::any::TypeId` provides the identity; the type
//! name is carried alongside purely for diagnostics (cycle errors, logs).

use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Stable token identifying one concrete behaviour type.
///
/// Equality and hashing use only the `TypeId`; the name never participates.
#[derive(Copy, Clone, Debug)]
pub struct BehaviourTypeId {
    id:   TypeId,
    name: &'static str,
}

impl BehaviourTypeId {
    /// The key for type `T`.
    #[inline]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id:   TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// Fully qualified type name, e.g. `my_game::physics::Physics`.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Last path segment of the type name, e.g. `Physics`.
    ///
    /// Generic arguments are kept: `Tween<f32>` stays `Tween<f32>`.
    pub fn short_name(&self) -> &'static str {
        let base_end = self.name.find('<').unwrap_or(self.name.len());
        match self.name[..base_end].rfind("::") {
            Some(pos) => &self.name[pos + 2..],
            None => self.name,
        }
    }

    /// The underlying `TypeId`.
    pub fn type_id(&self) -> TypeId {
        self.id
    }
}

impl PartialEq for BehaviourTypeId {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for BehaviourTypeId {}

impl Hash for BehaviourTypeId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for BehaviourTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}
