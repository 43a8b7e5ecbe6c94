//! System observer trait for diagnostics and tooling.

use cadence_core::{BehaviourId, BehaviourTypeId};

/// Counters for one completed tick.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TickStats {
    /// 1-based tick number.
    pub tick:      u64,
    /// `start` calls made while draining the pending set.
    pub started:   usize,
    /// `update` calls made.
    pub updated:   usize,
    /// Empty slots compacted during the family walks.
    pub compacted: usize,
}

/// Callbacks invoked by a [`BehaviourSystem`][crate::BehaviourSystem] at
/// key points of its tick.
///
/// All methods default to no-ops so implementors only override what they
/// care about.
///
/// # Example — order printer
///
/// ```rust,ignore
/// struct OrderPrinter;
///
/// impl SystemObserver for OrderPrinter {
///     fn on_order_rebuilt(&mut self, order: &[BehaviourTypeId]) {
///         for (i, ty) in order.iter().enumerate() {
///             println!("{i:>3}: {ty}");
///         }
///     }
/// }
/// ```
pub trait SystemObserver {
    /// Before the pending set is drained.
    fn on_tick_start(&mut self, _tick: u64) {}

    /// After the last family was walked.
    fn on_tick_end(&mut self, _stats: &TickStats) {}

    /// The execution order was rebuilt; `order` lists family types first to
    /// last.
    fn on_order_rebuilt(&mut self, _order: &[BehaviourTypeId]) {}

    /// Right before `start` is called on `id`.
    fn on_started(&mut self, _id: BehaviourId, _ty: BehaviourTypeId) {}

    /// Right before `stop` is called on `id`.
    fn on_stopped(&mut self, _id: BehaviourId, _ty: BehaviourTypeId) {}
}

/// A [`SystemObserver`] that does nothing.
pub struct NoopObserver;

impl SystemObserver for NoopObserver {}
