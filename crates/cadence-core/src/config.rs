//! Scheduler configuration.

/// Tuning and diagnostics switches for a `BehaviourSystem`.
///
/// Typically built in code by the host; with the `serde` feature it can also
/// be loaded from a TOML/JSON file.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SchedulerConfig {
    /// Initial slot capacity reserved for each newly created family.
    pub family_capacity: usize,

    /// Initial capacity of each of the two pending-start buffers.
    pub pending_capacity: usize,

    /// After every tick, check that each placed behaviour's
    /// `index_in_family` points at its own slot.  O(live behaviours).
    pub validate_families: bool,

    /// Log the complete family order at `debug` level whenever it is rebuilt.
    pub log_execution_order: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            family_capacity:     16,
            pending_capacity:    64,
            validate_families:   cfg!(debug_assertions),
            log_execution_order: false,
        }
    }
}

impl SchedulerConfig {
    /// Same as `default()` with family validation and order logging on.
    pub fn debug() -> Self {
        Self {
            validate_families:   true,
            log_execution_order: true,
            ..Self::default()
        }
    }
}
