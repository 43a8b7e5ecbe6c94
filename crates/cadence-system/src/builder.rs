//! Fluent builder for constructing a [`BehaviourSystem`].

use cadence_core::SchedulerConfig;
use cadence_schedule::{NoOrdering, OrderingLookup};

use crate::{BehaviourSystem, NoopObserver, SystemObserver};

/// Fluent builder for [`BehaviourSystem`].
///
/// # Optional inputs (have defaults)
///
/// | Method            | Default                        |
/// |-------------------|--------------------------------|
/// | `.config(c)`      | `SchedulerConfig::default()`   |
/// | `.ordering(l)`    | `NoOrdering`                   |
/// | `.observer(o)`    | `NoopObserver`                 |
///
/// # Example
///
/// ```rust,ignore
/// let mut table = OrderingTable::new();
/// table.entry::<Render>().after::<Physics>();
///
/// let mut system = SystemBuilder::new()
///     .config(SchedulerConfig::debug())
///     .ordering(table)
///     .build();
/// system.update(1.0 / 60.0)?;
/// ```
pub struct SystemBuilder {
    config:   SchedulerConfig,
    lookup:   Box<dyn OrderingLookup>,
    observer: Box<dyn SystemObserver>,
}

impl SystemBuilder {
    pub fn new() -> Self {
        Self {
            config:   SchedulerConfig::default(),
            lookup:   Box::new(NoOrdering),
            observer: Box::new(NoopObserver),
        }
    }

    pub fn config(mut self, config: SchedulerConfig) -> Self {
        self.config = config;
        self
    }

    /// Source of the per-type `after`/`before` constraints, consulted once
    /// per type when its family is created.
    pub fn ordering(mut self, lookup: impl OrderingLookup + 'static) -> Self {
        self.lookup = Box::new(lookup);
        self
    }

    pub fn observer(mut self, observer: impl SystemObserver + 'static) -> Self {
        self.observer = Box::new(observer);
        self
    }

    pub fn build(self) -> BehaviourSystem {
        BehaviourSystem::from_parts(self.config, self.lookup, self.observer)
    }
}

impl Default for SystemBuilder {
    fn default() -> Self {
        Self::new()
    }
}
