//! `FamilyRegistry` — one family per behaviour type, the dependency graph
//! between them, and the cached execution order.
//!
//! # Discovery
//!
//! The first time a type is seen it receives the next free [`FamilyId`] and
//! its declared constraints become graph edges:
//!
//! ```text
//! "A after B"   →  edge A → B
//! "A before B"  →  edge B → A
//! ```
//!
//! Types referenced by a constraint get their own family on the spot, so the
//! walk is recursive.  The new family is inserted before recursing, which
//! terminates mutual references.
//!
//! # Order cache
//!
//! The order is rebuilt from scratch whenever a family or an edge was added
//! since the last build, and reused unchanged otherwise.  A cycle is only
//! reported when the order is built, never at declaration time.

use cadence_core::{BehaviourTypeId, CoreError, FamilyId, SchedulerConfig};
use log::{debug, warn};
use rustc_hash::FxHashMap;

use crate::{
    BehaviourFamily, CycleError, DependencyGraph, OrderingLookup, ScheduleResult,
};

pub struct FamilyRegistry {
    by_type:         FxHashMap<BehaviourTypeId, FamilyId>,
    families:        Vec<BehaviourFamily>,
    graph:           DependencyGraph,
    order:           Vec<FamilyId>,
    dirty:           bool,
    family_capacity: usize,
    log_order:       bool,
}

impl FamilyRegistry {
    pub fn new(config: &SchedulerConfig) -> Self {
        Self {
            by_type:         FxHashMap::default(),
            families:        Vec::new(),
            graph:           DependencyGraph::new(),
            order:           Vec::new(),
            dirty:           false,
            family_capacity: config.family_capacity,
            log_order:       config.log_execution_order,
        }
    }

    /// Family for `ty`, creating it (and any family its constraints
    /// reference) on first sight.
    pub fn family_for<L>(&mut self, ty: BehaviourTypeId, lookup: &L) -> FamilyId
    where
        L: OrderingLookup + ?Sized,
    {
        if let Some(&id) = self.by_type.get(&ty) {
            return id;
        }

        let id = self.graph.add_node();
        self.families.push(BehaviourFamily::new(ty, self.family_capacity));
        self.by_type.insert(ty, id);
        self.dirty = true;
        debug!("behaviour family {id} created for {ty}");

        if let Some(constraints) = lookup.constraints(ty) {
            for &other in &constraints.after {
                let other = self.family_for(other, lookup);
                self.graph.add_edge(id, other);
            }
            for &other in &constraints.before {
                let other = self.family_for(other, lookup);
                self.graph.add_edge(other, id);
            }
        }
        id
    }

    /// Require `earlier` to update before `later`, after discovery.
    ///
    /// Returns `true` if the edge is new (and the order therefore dirty).
    pub fn require_order(&mut self, earlier: FamilyId, later: FamilyId) -> ScheduleResult<bool> {
        for id in [earlier, later] {
            if id.index() >= self.families.len() {
                return Err(CoreError::FamilyNotFound(id).into());
            }
        }
        let added = self.graph.add_edge(later, earlier);
        self.dirty |= added;
        Ok(added)
    }

    /// The execution order, rebuilt first if the graph changed.
    pub fn execution_order(&mut self) -> ScheduleResult<&[FamilyId]> {
        if self.dirty {
            self.rebuild()?;
        }
        Ok(&self.order)
    }

    /// The order as of the last successful build, without rebuilding.
    pub fn cached_order(&self) -> &[FamilyId] {
        &self.order
    }

    fn rebuild(&mut self) -> ScheduleResult<()> {
        match self.graph.topological_order() {
            Ok(order) => {
                self.order = order;
                self.dirty = false;
                debug!(
                    "execution order rebuilt: {} families, {} edges",
                    self.families.len(),
                    self.graph.edge_count(),
                );
                if self.log_order {
                    let names: Vec<String> = self
                        .order
                        .iter()
                        .map(|&f| self.families[f.index()].type_id().to_string())
                        .collect();
                    debug!("execution order: {}", names.join(", "));
                }
                Ok(())
            }
            Err(path) => {
                let cycle = path
                    .iter()
                    .map(|&f| self.families[f.index()].type_id())
                    .collect();
                let err = CycleError { cycle };
                warn!("{err}");
                Err(err.into())
            }
        }
    }

    // ── Access ────────────────────────────────────────────────────────────

    pub fn get(&self, id: FamilyId) -> Option<&BehaviourFamily> {
        self.families.get(id.index())
    }

    pub fn get_mut(&mut self, id: FamilyId) -> Option<&mut BehaviourFamily> {
        self.families.get_mut(id.index())
    }

    /// Family already assigned to `ty`, if any.
    pub fn family_of(&self, ty: BehaviourTypeId) -> Option<FamilyId> {
        self.by_type.get(&ty).copied()
    }

    /// `true` if the next `execution_order` call will rebuild.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn len(&self) -> usize {
        self.families.len()
    }

    pub fn is_empty(&self) -> bool {
        self.families.is_empty()
    }

    pub fn graph(&self) -> &DependencyGraph {
        &self.graph
    }

    /// All families with their ids, in discovery order.
    pub fn iter(&self) -> impl Iterator<Item = (FamilyId, &BehaviourFamily)> + '_ {
        self.families
            .iter()
            .enumerate()
            .map(|(i, f)| (FamilyId::from_index(i), f))
    }
}
