//! Unit tests for cadence-scene.

use std::cell::RefCell;
use std::rc::Rc;

use cadence_behaviour::{Behaviour, BehaviourContext};
use cadence_core::{BehaviourId, CoreError, NodeId, SchedulerConfig};
use cadence_schedule::OrderingTable;
use cadence_system::{Lifecycle, SystemBuilder};

use crate::{
    HierarchyAction, HierarchyChange, HierarchyObserver, NodeFreeze, NodeManager, SceneError,
};

// ── Helpers ───────────────────────────────────────────────────────────────────

type Log = Rc<RefCell<Vec<String>>>;

fn new_log() -> Log {
    Rc::new(RefCell::new(Vec::new()))
}

fn take(log: &Log) -> Vec<String> {
    std::mem::take(&mut *log.borrow_mut())
}

/// Logs `tag.start` / `tag.update` / `tag.stop`.
struct Tagged {
    tag: &'static str,
    log: Log,
}

impl Tagged {
    fn new(tag: &'static str, log: &Log) -> Self {
        Self { tag, log: Rc::clone(log) }
    }

    fn push(&self, what: &str) {
        self.log.borrow_mut().push(format!("{}.{what}", self.tag));
    }
}

impl Behaviour for Tagged {
    fn start(&mut self, _ctx: &mut BehaviourContext<'_>) {
        self.push("start");
    }

    fn update(&mut self, _delta: f32, _ctx: &mut BehaviourContext<'_>) {
        self.push("update");
    }

    fn stop(&mut self, _ctx: &mut BehaviourContext<'_>) {
        self.push("stop");
    }
}

macro_rules! marker {
    ($name:ident) => {
        struct $name(Tagged);

        impl Behaviour for $name {
            fn update(&mut self, delta: f32, ctx: &mut BehaviourContext<'_>) {
                self.0.update(delta, ctx);
            }
        }
    };
}

marker!(Audio);
marker!(Physics);
marker!(Render);

fn manager() -> NodeManager {
    let system = SystemBuilder::new().config(SchedulerConfig::debug()).build();
    NodeManager::new(system)
}

struct ChangeLog(Rc<RefCell<Vec<HierarchyChange>>>);

impl HierarchyObserver for ChangeLog {
    fn on_hierarchy_changed(&mut self, change: &HierarchyChange) {
        self.0.borrow_mut().push(*change);
    }
}

// ── Registration ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod registration_tests {
    use super::*;

    #[test]
    fn register_node_starts_subtree_depth_first() {
        let log = new_log();
        let mut m = manager();
        let root = m.create_node("root");
        let a = m.create_node("a");
        let a1 = m.create_node("a1");
        let b = m.create_node("b");
        m.attach_child(root, a).unwrap();
        m.attach_child(a, a1).unwrap();
        m.attach_child(root, b).unwrap();
        m.add_behaviour(b, Tagged::new("b", &log)).unwrap();
        m.add_behaviour(a1, Tagged::new("a1", &log)).unwrap();
        m.add_behaviour(root, Tagged::new("root", &log)).unwrap();
        m.add_behaviour(a, Tagged::new("a", &log)).unwrap();

        m.register_node(root).unwrap();
        for node in [root, a, a1, b] {
            assert!(m.tree().get(node).unwrap().is_registered());
        }
        let stats = m.update(0.016).unwrap();
        assert_eq!(stats.started, 4);
        let starts: Vec<String> = take(&log).into_iter().filter(|e| e.ends_with(".start")).collect();
        assert_eq!(starts, vec!["root.start", "a.start", "a1.start", "b.start"]);
    }

    #[test]
    fn unregister_node_stops_children_first() {
        let log = new_log();
        let mut m = manager();
        let root = m.create_node("root");
        let child = m.create_node("child");
        m.attach_child(root, child).unwrap();
        m.add_behaviour(root, Tagged::new("root", &log)).unwrap();
        m.add_behaviour(child, Tagged::new("child", &log)).unwrap();
        m.register_node(root).unwrap();
        m.update(0.016).unwrap();
        take(&log);

        m.unregister_node(root).unwrap();
        assert_eq!(take(&log), vec!["child.stop", "root.stop"]);
        assert!(!m.tree().get(child).unwrap().is_registered());

        m.update(0.016).unwrap();
        assert!(take(&log).is_empty());
    }

    #[test]
    fn register_rejects_children_and_duplicates() {
        let mut m = manager();
        let root = m.create_node("root");
        let child = m.create_node("child");
        m.attach_child(root, child).unwrap();

        assert!(matches!(m.register_node(child), Err(SceneError::HasParent(n)) if n == child));
        m.register_node(root).unwrap();
        assert!(matches!(m.register_node(root), Err(SceneError::AlreadyRegistered(n)) if n == root));
        assert!(matches!(
            m.register_node(NodeId(99)),
            Err(SceneError::Core(CoreError::NodeNotFound(n))) if n == NodeId(99)
        ));
    }

    #[test]
    fn unregistering_unknown_to_scene_is_a_noop() {
        let log = new_log();
        let mut m = manager();
        let loose = m.create_node("loose");
        let id = m.add_behaviour(loose, Tagged::new("loose", &log)).unwrap();

        m.unregister_node(loose).unwrap();
        assert!(take(&log).is_empty());
        assert_eq!(m.system().record(id).unwrap().lifecycle(), Lifecycle::Idle);
    }

    #[test]
    fn behaviours_wait_for_their_node_to_go_live() {
        let log = new_log();
        let mut m = manager();
        let node = m.create_node("node");
        let id = m.add_behaviour(node, Tagged::new("n", &log)).unwrap();

        m.update(0.016).unwrap();
        assert!(take(&log).is_empty());
        assert_eq!(m.behaviours_of(node).unwrap(), &[id]);

        m.add_root(node).unwrap();
        m.update(0.016).unwrap();
        assert_eq!(take(&log), vec!["n.start", "n.update"]);
    }

    #[test]
    fn data_components_are_ignored_by_scheduling() {
        #[derive(Debug, PartialEq)]
        struct Label(&'static str);

        let mut m = manager();
        let node = m.create_node("node");
        m.add_data(node, Label("player")).unwrap();
        m.add_data(node, 7_u32).unwrap();
        m.add_root(node).unwrap();

        let stats = m.update(0.016).unwrap();
        assert_eq!((stats.started, stats.updated), (0, 0));
        let entry = m.tree().get(node).unwrap();
        assert_eq!(entry.data::<Label>(), Some(&Label("player")));
        assert_eq!(entry.data::<u32>(), Some(&7));
        assert_eq!(entry.name(), "node");
    }
}

// ── Roots & children ──────────────────────────────────────────────────────────

#[cfg(test)]
mod hierarchy_tests {
    use super::*;

    #[test]
    fn roots_register_and_notify() {
        let changes = Rc::new(RefCell::new(Vec::new()));
        let mut m = manager().with_observer(ChangeLog(Rc::clone(&changes)));
        let first = m.create_node("first");
        let second = m.create_node("second");
        m.add_root(first).unwrap();
        m.add_root(second).unwrap();
        assert_eq!(m.roots(), &[first, second]);

        m.remove_root(first).unwrap();
        assert_eq!(m.roots(), &[second]);
        assert!(!m.tree().get(first).unwrap().is_registered());
        assert!(matches!(m.remove_root(first), Err(SceneError::NotARoot(n)) if n == first));

        assert_eq!(
            *changes.borrow(),
            vec![
                HierarchyChange { action: HierarchyAction::Link, child: first, parent: None },
                HierarchyChange { action: HierarchyAction::Link, child: second, parent: None },
                HierarchyChange { action: HierarchyAction::Unlink, child: first, parent: None },
            ],
        );
    }

    #[test]
    fn unregistered_root_leaves_the_roots() {
        let changes = Rc::new(RefCell::new(Vec::new()));
        let mut m = manager().with_observer(ChangeLog(Rc::clone(&changes)));
        let root = m.create_node("root");
        m.add_root(root).unwrap();

        m.unregister_node(root).unwrap();
        assert!(m.roots().is_empty());
        assert!(matches!(m.remove_root(root), Err(SceneError::NotARoot(n)) if n == root));

        m.add_root(root).unwrap();
        assert_eq!(m.roots(), &[root]);
        let actions: Vec<HierarchyAction> = changes.borrow().iter().map(|c| c.action).collect();
        assert_eq!(
            actions,
            vec![HierarchyAction::Link, HierarchyAction::Unlink, HierarchyAction::Link],
        );
    }

    #[test]
    fn register_and_unregister_node_notify() {
        let changes = Rc::new(RefCell::new(Vec::new()));
        let mut m = manager().with_observer(ChangeLog(Rc::clone(&changes)));
        let node = m.create_node("node");

        m.register_node(node).unwrap();
        m.unregister_node(node).unwrap();
        m.unregister_node(node).unwrap();
        assert!(m.roots().is_empty());
        assert_eq!(
            *changes.borrow(),
            vec![
                HierarchyChange { action: HierarchyAction::Link, child: node, parent: None },
                HierarchyChange { action: HierarchyAction::Unlink, child: node, parent: None },
            ],
        );
    }

    #[test]
    fn attach_under_live_parent_registers_subtree() {
        let log = new_log();
        let mut m = manager();
        let root = m.create_node("root");
        m.add_root(root).unwrap();

        let branch = m.create_node("branch");
        let leaf = m.create_node("leaf");
        m.attach_child(branch, leaf).unwrap();
        m.add_behaviour(leaf, Tagged::new("leaf", &log)).unwrap();
        assert!(!m.tree().get(leaf).unwrap().is_registered());

        m.attach_child(root, branch).unwrap();
        assert!(m.tree().get(leaf).unwrap().is_registered());
        m.update(0.016).unwrap();
        assert_eq!(take(&log), vec!["leaf.start", "leaf.update"]);
    }

    #[test]
    fn detach_child_stops_its_behaviours() {
        let log = new_log();
        let changes = Rc::new(RefCell::new(Vec::new()));
        let mut m = manager().with_observer(ChangeLog(Rc::clone(&changes)));
        let root = m.create_node("root");
        let child = m.create_node("child");
        m.add_root(root).unwrap();
        m.attach_child(root, child).unwrap();
        m.add_behaviour(child, Tagged::new("child", &log)).unwrap();
        m.update(0.016).unwrap();
        take(&log);

        m.detach_child(root, child).unwrap();
        assert_eq!(take(&log), vec!["child.stop"]);
        assert_eq!(m.tree().get(child).unwrap().parent(), None);
        assert!(m.tree().get(root).unwrap().children().is_empty());
        assert_eq!(
            changes.borrow().last(),
            Some(&HierarchyChange { action: HierarchyAction::Unlink, child, parent: Some(root) }),
        );
    }

    #[test]
    fn invalid_links_are_rejected() {
        let mut m = manager();
        let a = m.create_node("a");
        let b = m.create_node("b");
        let c = m.create_node("c");
        m.attach_child(a, b).unwrap();
        m.attach_child(b, c).unwrap();

        assert!(matches!(m.attach_child(c, a), Err(SceneError::WouldCycle { .. })));
        assert!(matches!(m.attach_child(a, c), Err(SceneError::HasParent(n)) if n == c));
        assert!(matches!(
            m.detach_child(a, c),
            Err(SceneError::NotAChild { parent, child }) if parent == a && child == c
        ));

        let root = m.create_node("root");
        m.add_root(root).unwrap();
        assert!(matches!(m.attach_child(a, root), Err(SceneError::AlreadyRegistered(_))));
    }
}

// ── Behaviours through the manager ────────────────────────────────────────────

#[cfg(test)]
mod manager_tests {
    use super::*;

    fn ordered_scene(log: &Log) -> (NodeManager, BehaviourId) {
        let mut table = OrderingTable::new();
        let _ = table.entry::<Render>().after::<Physics>();
        let system = SystemBuilder::new()
            .config(SchedulerConfig::debug())
            .ordering(table)
            .build();
        let mut m = NodeManager::new(system);

        let root = m.create_node("root");
        m.add_behaviour(root, Render(Tagged::new("Render", log))).unwrap();
        m.add_behaviour(root, Audio(Tagged::new("Audio", log))).unwrap();
        let physics = m.add_behaviour(root, Physics(Tagged::new("Physics", log))).unwrap();
        m.add_root(root).unwrap();
        (m, physics)
    }

    #[test]
    fn physics_before_render_and_freeze_skips_physics() {
        let log = new_log();
        let (mut m, physics) = ordered_scene(&log);

        m.update(0.016).unwrap();
        let first = take(&log);
        let p = first.iter().position(|e| e == "Physics.update").unwrap();
        let r = first.iter().position(|e| e == "Render.update").unwrap();
        assert!(p < r);

        let handle = m.freeze(physics).unwrap();
        m.update(0.016).unwrap();
        let frozen = take(&log);
        assert!(!frozen.contains(&"Physics.update".to_string()));
        assert!(frozen.contains(&"Render.update".to_string()));

        m.release(handle).unwrap();
        m.update(0.016).unwrap();
        assert_eq!(take(&log), first);
    }

    #[test]
    fn detach_and_destroy_behaviours() {
        let log = new_log();
        let mut m = manager();
        let node = m.create_node("node");
        m.add_root(node).unwrap();
        let kept = m.add_behaviour(node, Tagged::new("kept", &log)).unwrap();
        let gone = m.add_behaviour(node, Tagged::new("gone", &log)).unwrap();
        m.update(0.016).unwrap();
        take(&log);

        let boxed = m.detach_behaviour(kept).unwrap();
        assert_eq!(boxed.downcast_ref::<Tagged>().unwrap().tag, "kept");
        m.destroy_behaviour(gone).unwrap();
        assert_eq!(take(&log), vec!["kept.stop", "gone.stop"]);
        assert!(m.behaviours_of(node).unwrap().is_empty());
        assert!(m.destroy_behaviour(gone).is_err());
    }

    #[test]
    fn typed_access_through_manager() {
        let log = new_log();
        let mut m = manager();
        let node = m.create_node("node");
        let id = m.add_behaviour(node, Tagged::new("x", &log)).unwrap();
        assert_eq!(m.behaviour::<Tagged>(id).unwrap().tag, "x");
        m.behaviour_mut::<Tagged>(id).unwrap().tag = "y";
        assert_eq!(m.behaviour::<Tagged>(id).unwrap().tag, "y");
        assert!(m.behaviours_of(NodeId(42)).is_err());
    }
}

// ── Node freeze ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod node_freeze_tests {
    use super::*;

    fn sorted(mut entries: Vec<String>) -> Vec<String> {
        entries.sort();
        entries
    }

    #[test]
    fn frozen_subtree_is_skipped_until_released() {
        let log = new_log();
        let mut m = manager();
        let root = m.create_node("root");
        let ship = m.create_node("ship");
        let engine = m.create_node("engine");
        let rock = m.create_node("rock");
        m.attach_child(root, ship).unwrap();
        m.attach_child(ship, engine).unwrap();
        m.attach_child(root, rock).unwrap();
        m.add_behaviour(ship, Tagged::new("ship", &log)).unwrap();
        m.add_behaviour(engine, Tagged::new("engine", &log)).unwrap();
        m.add_behaviour(rock, Tagged::new("rock", &log)).unwrap();
        m.add_root(root).unwrap();
        m.update(0.016).unwrap();
        take(&log);

        let freeze = m.freeze_node(ship).unwrap();
        assert!(m.is_node_frozen(ship));
        assert!(m.is_node_frozen(engine));
        assert!(!m.is_node_frozen(rock));
        m.update(0.016).unwrap();
        assert_eq!(take(&log), vec!["rock.update"]);

        m.release_node(freeze).unwrap();
        assert!(!m.is_node_frozen(engine));
        m.update(0.016).unwrap();
        assert_eq!(sorted(take(&log)), vec!["engine.update", "rock.update", "ship.update"]);
        assert_eq!(m.system().outstanding_freezes(), 0);
    }

    #[test]
    fn behaviour_added_under_frozen_node_stays_frozen() {
        let log = new_log();
        let mut m = manager();
        let root = m.create_node("root");
        let child = m.create_node("child");
        m.attach_child(root, child).unwrap();
        m.add_root(root).unwrap();

        let freeze = m.freeze_node(root).unwrap();
        let late = m.add_behaviour(child, Tagged::new("late", &log)).unwrap();
        assert!(m.system().is_frozen(late));
        m.update(0.016).unwrap();
        assert_eq!(take(&log), vec!["late.start"]);

        m.release_node(freeze).unwrap();
        m.update(0.016).unwrap();
        assert_eq!(take(&log), vec!["late.update"]);
    }

    #[test]
    fn frozen_node_joining_the_scene_starts_without_updates() {
        let log = new_log();
        let mut m = manager();
        let node = m.create_node("node");
        let id = m.add_behaviour(node, Tagged::new("n", &log)).unwrap();

        let freeze = m.freeze_node(node).unwrap();
        m.add_root(node).unwrap();
        m.update(0.016).unwrap();
        assert_eq!(take(&log), vec!["n.start"]);
        assert!(m.system().is_frozen(id));

        m.release_node(freeze).unwrap();
        m.update(0.016).unwrap();
        assert_eq!(take(&log), vec!["n.update"]);
    }

    #[test]
    fn node_freezes_nest_and_reject_double_release() {
        let log = new_log();
        let mut m = manager();
        let node = m.create_node("node");
        let id = m.add_behaviour(node, Tagged::new("n", &log)).unwrap();
        m.add_root(node).unwrap();

        let outer = m.freeze_node(node).unwrap();
        let inner = m.freeze_node(node).unwrap();
        let token = inner.token();
        m.release_node(inner).unwrap();
        assert!(m.is_node_frozen(node));
        assert!(m.system().is_frozen(id));

        assert!(matches!(
            m.release_node(NodeFreeze::new(node, token)),
            Err(SceneError::NodeFreezeReleased { node: n, token: t }) if n == node && t == token
        ));

        m.release_node(outer).unwrap();
        assert!(!m.system().is_frozen(id));
        assert!(matches!(m.freeze_node(NodeId(42)), Err(SceneError::Core(_))));
    }

    #[test]
    fn links_follow_the_frozen_subtree() {
        let log = new_log();
        let mut m = manager();
        let root = m.create_node("root");
        let child = m.create_node("child");
        let id = m.add_behaviour(child, Tagged::new("c", &log)).unwrap();
        m.add_root(root).unwrap();
        let _freeze = m.freeze_node(root).unwrap();

        // Linked in under the frozen root: frozen.
        m.attach_child(root, child).unwrap();
        assert!(m.system().is_frozen(id));
        m.update(0.016).unwrap();
        assert_eq!(take(&log), vec!["c.start"]);

        // Linked out again: released, and live once it is a root.
        m.detach_child(root, child).unwrap();
        assert!(!m.system().is_frozen(id));
        m.add_root(child).unwrap();
        m.update(0.016).unwrap();
        assert_eq!(take(&log), vec!["c.stop", "c.start", "c.update"]);
    }

    #[test]
    fn spawned_behaviours_are_frozen_after_the_tick() {
        struct Nest {
            log: Log,
        }

        impl Behaviour for Nest {
            fn start(&mut self, ctx: &mut BehaviourContext<'_>) {
                ctx.spawn(Tagged::new("hatchling", &self.log)).unwrap();
            }
        }

        let log = new_log();
        let mut m = manager();
        let node = m.create_node("node");
        m.add_behaviour(node, Nest { log: Rc::clone(&log) }).unwrap();
        let _freeze = m.freeze_node(node).unwrap();
        m.add_root(node).unwrap();

        m.update(0.016).unwrap();
        assert_eq!(take(&log), vec!["hatchling.start", "hatchling.update"]);
        let hatchling = m.behaviours_of(node).unwrap()[1];
        assert!(m.system().is_frozen(hatchling));

        m.update(0.016).unwrap();
        assert!(take(&log).is_empty());
    }
}
