//! `NodeManager` — ties a [`SceneTree`] to one [`BehaviourSystem`].
//!
//! # Registration
//!
//! A node is *registered* while it is part of the manager's live scene: a
//! root, or a descendant of one.  Registering a node registers its whole
//! subtree depth-first along with every behaviour attached to it; data
//! components are ignored.  Unregistering walks the subtree children-first
//! and unregisters each behaviour (pending ones are dropped silently,
//! started ones get `stop`).
//!
//! Behaviours added to a registered node are queued for starting at once;
//! behaviours added to an unregistered node wait until it joins the scene.
//!
//! # Node freeze
//!
//! [`NodeManager::freeze_node`] holds one behaviour freeze on every
//! behaviour in a subtree.  The set is kept in step with the tree: behaviours
//! attached or linked in under the node are frozen as well, and those that
//! leave the subtree are released.  Registration does not touch freezes, so
//! a frozen subtree joining the scene starts its behaviours but never
//! updates them.

use cadence_behaviour::{Behaviour, FreezeHandle};
use cadence_core::{BehaviourId, CoreError, NodeId};
use cadence_system::{BehaviourSystem, Lifecycle, SystemError, TickStats};
use log::debug;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::{
    HierarchyAction, HierarchyChange, HierarchyObserver, NodeFreeze, NoopHierarchyObserver,
    SceneError, SceneResult, SceneTree,
};

/// Behaviour freezes held on behalf of one [`NodeFreeze`].
struct HeldFreeze {
    node:    NodeId,
    handles: FxHashMap<BehaviourId, FreezeHandle>,
}

pub struct NodeManager {
    tree:        SceneTree,
    system:      BehaviourSystem,
    roots:       Vec<NodeId>,
    observer:    Box<dyn HierarchyObserver>,
    held:        FxHashMap<u64, HeldFreeze>,
    next_freeze: u64,
}

impl NodeManager {
    pub fn new(system: BehaviourSystem) -> Self {
        Self {
            tree: SceneTree::new(),
            system,
            roots: Vec::new(),
            observer: Box::new(NoopHierarchyObserver),
            held: FxHashMap::default(),
            next_freeze: 0,
        }
    }

    /// Replace the hierarchy observer.
    pub fn with_observer(mut self, observer: impl HierarchyObserver + 'static) -> Self {
        self.observer = Box::new(observer);
        self
    }

    pub fn tree(&self) -> &SceneTree {
        &self.tree
    }

    pub fn system(&self) -> &BehaviourSystem {
        &self.system
    }

    pub fn system_mut(&mut self) -> &mut BehaviourSystem {
        &mut self.system
    }

    pub fn create_node(&mut self, name: impl Into<String>) -> NodeId {
        self.tree.create_node(name)
    }

    /// Append an inert data component to `node`.
    pub fn add_data<T: 'static>(&mut self, node: NodeId, value: T) -> SceneResult<()> {
        self.tree.add_data(node, value)
    }

    // ── Registration ──────────────────────────────────────────────────────

    /// Register a parentless node and everything below it.
    pub fn register_node(&mut self, node: NodeId) -> SceneResult<()> {
        let entry = self.tree.node(node)?;
        if entry.parent().is_some() {
            return Err(SceneError::HasParent(node));
        }
        if entry.is_registered() {
            return Err(SceneError::AlreadyRegistered(node));
        }
        self.register_subtree(node)?;
        self.notify(HierarchyAction::Link, node, None);
        Ok(())
    }

    /// Unregister `node` and everything below it, dropping it from the roots
    /// if it is one.  A node that is not registered is left alone.
    pub fn unregister_node(&mut self, node: NodeId) -> SceneResult<()> {
        if !self.tree.node(node)?.is_registered() {
            return Ok(());
        }
        self.unregister_subtree(node)?;
        self.roots.retain(|&r| r != node);
        self.notify(HierarchyAction::Unlink, node, None);
        Ok(())
    }

    fn register_subtree(&mut self, node: NodeId) -> SceneResult<()> {
        let nodes = self.tree.subtree(node);
        for &id in &nodes {
            self.tree.set_registered(id, true);
            for behaviour in self.system.owned_by(id).to_vec() {
                let idle = self
                    .system
                    .record(behaviour)
                    .is_some_and(|r| r.lifecycle() == Lifecycle::Idle);
                if idle {
                    self.system.register(behaviour)?;
                }
            }
        }
        debug!("registered {} node(s) under {node}", nodes.len());
        Ok(())
    }

    fn unregister_subtree(&mut self, node: NodeId) -> SceneResult<()> {
        let nodes = self.tree.subtree(node);
        for &id in nodes.iter().rev() {
            for behaviour in self.system.owned_by(id).to_vec() {
                self.system.unregister(behaviour)?;
            }
            self.tree.set_registered(id, false);
        }
        debug!("unregistered {} node(s) under {node}", nodes.len());
        Ok(())
    }

    fn notify(&mut self, action: HierarchyAction, child: NodeId, parent: Option<NodeId>) {
        self.observer
            .on_hierarchy_changed(&HierarchyChange { action, child, parent });
    }

    // ── Roots ─────────────────────────────────────────────────────────────

    /// Make `node` a root of the live scene.
    pub fn add_root(&mut self, node: NodeId) -> SceneResult<()> {
        self.register_node(node)?;
        self.roots.push(node);
        Ok(())
    }

    pub fn remove_root(&mut self, node: NodeId) -> SceneResult<()> {
        if !self.roots.contains(&node) {
            return Err(SceneError::NotARoot(node));
        }
        self.unregister_node(node)
    }

    /// Roots in the order they were added.
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    // ── Children ──────────────────────────────────────────────────────────

    /// Link `child` under `parent`.  If `parent` is live, `child`'s subtree
    /// is registered.
    pub fn attach_child(&mut self, parent: NodeId, child: NodeId) -> SceneResult<()> {
        let live = self.tree.node(parent)?.is_registered();
        let entry = self.tree.node(child)?;
        if entry.parent().is_some() {
            return Err(SceneError::HasParent(child));
        }
        if entry.is_registered() {
            return Err(SceneError::AlreadyRegistered(child));
        }
        if self.tree.is_ancestor(child, parent) {
            return Err(SceneError::WouldCycle { parent, child });
        }

        self.tree.link(parent, child);
        self.sync_node_freezes()?;
        if live {
            self.register_subtree(child)?;
        }
        self.notify(HierarchyAction::Link, child, Some(parent));
        Ok(())
    }

    /// Unlink `child` from `parent`, unregistering its subtree first.
    pub fn detach_child(&mut self, parent: NodeId, child: NodeId) -> SceneResult<()> {
        let entry = self.tree.node(child)?;
        if entry.parent() != Some(parent) {
            return Err(SceneError::NotAChild { parent, child });
        }
        if entry.is_registered() {
            self.unregister_subtree(child)?;
        }
        self.tree.unlink(parent, child);
        self.sync_node_freezes()?;
        self.notify(HierarchyAction::Unlink, child, Some(parent));
        Ok(())
    }

    // ── Behaviours ────────────────────────────────────────────────────────

    /// Attach `behaviour` to `node`, queueing it for start if `node` is live.
    /// Under a frozen node it starts frozen.
    pub fn add_behaviour<B: Behaviour>(&mut self, node: NodeId, behaviour: B) -> SceneResult<BehaviourId> {
        let live = self.tree.node(node)?.is_registered();
        let id = self.system.attach(node, behaviour);
        self.sync_node_freezes()?;
        if live {
            self.system.register(id)?;
        }
        Ok(id)
    }

    /// Remove a behaviour from its node and return it.
    pub fn detach_behaviour(&mut self, id: BehaviourId) -> SceneResult<Box<dyn Behaviour>> {
        let behaviour = self.system.detach(id)?;
        self.sync_node_freezes()?;
        Ok(behaviour)
    }

    pub fn destroy_behaviour(&mut self, id: BehaviourId) -> SceneResult<()> {
        self.system.destroy(id).map_err(SystemError::from)?;
        Ok(())
    }

    /// Behaviours attached to `node`, in attach order.
    pub fn behaviours_of(&self, node: NodeId) -> SceneResult<&[BehaviourId]> {
        if !self.tree.contains(node) {
            return Err(CoreError::NodeNotFound(node).into());
        }
        Ok(self.system.owned_by(node))
    }

    pub fn behaviour<T: Behaviour>(&self, id: BehaviourId) -> Option<&T> {
        self.system.behaviour::<T>(id)
    }

    pub fn behaviour_mut<T: Behaviour>(&mut self, id: BehaviourId) -> Option<&mut T> {
        self.system.behaviour_mut::<T>(id)
    }

    // ── Freeze ────────────────────────────────────────────────────────────

    pub fn freeze(&mut self, id: BehaviourId) -> SceneResult<FreezeHandle> {
        Ok(self.system.freeze(id).map_err(SystemError::from)?)
    }

    pub fn release(&mut self, handle: FreezeHandle) -> SceneResult<()> {
        self.system.release(handle).map_err(SystemError::from)?;
        Ok(())
    }

    /// Freeze every behaviour in `node`'s subtree, now and as it changes,
    /// until the returned freeze is released.  Node freezes nest.
    pub fn freeze_node(&mut self, node: NodeId) -> SceneResult<NodeFreeze> {
        self.tree.node(node)?;
        self.next_freeze += 1;
        let token = self.next_freeze;
        self.held.insert(token, HeldFreeze { node, handles: FxHashMap::default() });
        self.sync_node_freezes()?;
        debug!("{node} frozen (node freeze #{token})");
        Ok(NodeFreeze::new(node, token))
    }

    /// Release one node freeze.  Behaviours still held by another freeze
    /// stay frozen.
    pub fn release_node(&mut self, freeze: NodeFreeze) -> SceneResult<()> {
        let (node, token) = (freeze.node(), freeze.token());
        let Some(held) = self.held.remove(&token) else {
            return Err(SceneError::NodeFreezeReleased { node, token });
        };
        for handle in held.handles.into_values() {
            self.system.release(handle).map_err(SystemError::from)?;
        }
        debug!("{node} released (node freeze #{token})");
        Ok(())
    }

    /// `true` while `node` or one of its ancestors holds a node freeze.
    pub fn is_node_frozen(&self, node: NodeId) -> bool {
        self.held
            .values()
            .any(|held| self.tree.is_ancestor(held.node, node))
    }

    /// Make each node freeze hold exactly the behaviours now in its subtree.
    fn sync_node_freezes(&mut self) -> SceneResult<()> {
        for held in self.held.values_mut() {
            let inside: FxHashSet<BehaviourId> = self
                .tree
                .subtree(held.node)
                .into_iter()
                .flat_map(|n| self.system.owned_by(n).iter().copied())
                .collect();

            let left: Vec<BehaviourId> = held
                .handles
                .keys()
                .filter(|id| !inside.contains(id))
                .copied()
                .collect();
            for id in left {
                if let Some(handle) = held.handles.remove(&id) {
                    self.system.release(handle).map_err(SystemError::from)?;
                }
            }
            for id in inside {
                if !held.handles.contains_key(&id) {
                    let handle = self.system.freeze(id).map_err(SystemError::from)?;
                    held.handles.insert(id, handle);
                }
            }
        }
        Ok(())
    }

    // ── Tick ──────────────────────────────────────────────────────────────

    /// Run one scheduler tick.  Call once per frame.
    ///
    /// Behaviours spawned by callbacks under a frozen node are frozen when
    /// the tick ends.
    pub fn update(&mut self, delta: f32) -> SceneResult<TickStats> {
        if self.system.is_updating() {
            return Err(SceneError::UpdateInProgress);
        }
        self.sync_node_freezes()?;
        let stats = self.system.update(delta)?;
        self.sync_node_freezes()?;
        Ok(stats)
    }
}
