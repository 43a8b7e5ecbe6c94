//! The `Behaviour` trait — the main extension point for user code.

use std::any::Any;

use crate::BehaviourContext;

/// Pluggable per-frame logic attached to one scene node.
///
/// Every callback receives a [`BehaviourContext`] through which the
/// behaviour can freeze, destroy or attach behaviours while it runs.
///
/// # Lifecycle
///
/// ```text
/// attach to live node ─▶ pending ─▶ start ─▶ update × N ─▶ stop
///            └──── removed while pending: neither start nor stop ───┘
/// ```
///
/// `start` and `stop` fire exactly once per registration.  `update` runs
/// once per tick while the behaviour is started and not frozen, in the order
/// of its type's family.
///
/// # Threading
///
/// The scheduler is single-threaded, so there is no `Send`/`Sync` bound.
///
/// # Example
///
/// ```rust,ignore
/// struct Spin { angle: f32 }
///
/// impl Behaviour for Spin {
///     fn update(&mut self, delta: f32, _ctx: &mut BehaviourContext<'_>) {
///         self.angle += delta * 90.0;
///     }
/// }
/// ```
pub trait Behaviour: AsAny + 'static {
    /// Called once, on the first tick after registration, just before the
    /// first `update`.
    fn start(&mut self, _ctx: &mut BehaviourContext<'_>) {}

    /// Called once per tick.  `delta` is the host's frame delta.
    fn update(&mut self, _delta: f32, _ctx: &mut BehaviourContext<'_>) {}

    /// Called once when the behaviour leaves scheduling for good.
    /// `ctx.owner()` is the node it was attached to.
    fn stop(&mut self, _ctx: &mut BehaviourContext<'_>) {}
}

/// Downcasting support for `dyn Behaviour`.
///
/// Implemented for every `'static` type; never implement it by hand.
pub trait AsAny {
    #[doc(hidden)]
    fn as_any(&self) -> &dyn Any;

    #[doc(hidden)]
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl dyn Behaviour {
    /// `Some` if the boxed behaviour is a `T`.
    pub fn downcast_ref<T: Behaviour>(&self) -> Option<&T> {
        <dyn Behaviour as AsAny>::as_any(self).downcast_ref::<T>()
    }

    pub fn downcast_mut<T: Behaviour>(&mut self) -> Option<&mut T> {
        <dyn Behaviour as AsAny>::as_any_mut(self).downcast_mut::<T>()
    }
}
