//! frame_loop — a small scene driven by the cadence behaviour scheduler.
//!
//! Builds a ship with an engine and a turret, runs a fixed number of frames
//! and shows the scheduler at work:
//!
//! - `Render` is declared after `Physics`, so physics always moves the ship
//!   before it is drawn;
//! - a `Stall` behaviour freezes the engine's `Physics` for a few frames;
//! - a `Launcher` spawns short-lived `Shell` behaviours that destroy
//!   themselves.
//!
//! Run with `RUST_LOG=debug` (or `trace`) to watch the scheduler's own log.

use anyhow::Result;
use log::info;

use cadence_behaviour::{Behaviour, BehaviourContext, FreezeHandle};
use cadence_core::{BehaviourId, BehaviourTypeId, SchedulerConfig};
use cadence_schedule::OrderingTable;
use cadence_scene::{HierarchyChange, HierarchyObserver, NodeManager};
use cadence_system::{SystemBuilder, SystemObserver, TickStats};

// ── Constants ─────────────────────────────────────────────────────────────────

const FRAMES:        u64 = 12;
const FRAME_DELTA:   f32 = 1.0 / 60.0;
const STALL_FROM:    u64 = 4;  // first frame the engine is frozen
const STALL_FRAMES:  u64 = 3;
const LAUNCH_EVERY:  u64 = 5;
const SHELL_FRAMES:  u32 = 2;

// ── Behaviours ────────────────────────────────────────────────────────────────

#[derive(Default)]
struct Physics {
    position: f32,
    velocity: f32,
}

impl Behaviour for Physics {
    fn start(&mut self, _ctx: &mut BehaviourContext<'_>) {
        self.velocity = 30.0;
    }

    fn update(&mut self, delta: f32, _ctx: &mut BehaviourContext<'_>) {
        self.position += self.velocity * delta;
    }
}

#[derive(Default)]
struct Render {
    frames: u32,
}

impl Behaviour for Render {
    fn update(&mut self, _delta: f32, ctx: &mut BehaviourContext<'_>) {
        self.frames += 1;
        log::debug!("render frame {} on {}", self.frames, ctx.owner());
    }
}

#[derive(Default)]
struct Audio;

impl Behaviour for Audio {}

/// Freezes `engine` for `STALL_FRAMES` frames starting at `STALL_FROM`.
struct Stall {
    engine: BehaviourId,
    frame:  u64,
    handle: Option<FreezeHandle>,
}

impl Behaviour for Stall {
    fn update(&mut self, _delta: f32, ctx: &mut BehaviourContext<'_>) {
        self.frame += 1;
        if self.frame == STALL_FROM {
            match ctx.freeze(self.engine) {
                Ok(handle) => {
                    info!("frame {}: engine stalls", self.frame);
                    self.handle = Some(handle);
                }
                Err(err) => log::warn!("could not stall engine: {err}"),
            }
        } else if self.frame == STALL_FROM + STALL_FRAMES {
            if let Some(handle) = self.handle.take() {
                info!("frame {}: engine restarts", self.frame);
                if let Err(err) = ctx.release(handle) {
                    log::warn!("could not restart engine: {err}");
                }
            }
        }
    }
}

#[derive(Default)]
struct Launcher {
    frame: u64,
}

impl Behaviour for Launcher {
    fn update(&mut self, _delta: f32, ctx: &mut BehaviourContext<'_>) {
        self.frame += 1;
        if self.frame % LAUNCH_EVERY == 0 {
            match ctx.spawn(Shell { frames_left: SHELL_FRAMES }) {
                Ok(id) => info!("frame {}: launched {id}", self.frame),
                Err(err) => log::warn!("launch failed: {err}"),
            }
        }
    }
}

struct Shell {
    frames_left: u32,
}

impl Behaviour for Shell {
    fn update(&mut self, _delta: f32, ctx: &mut BehaviourContext<'_>) {
        self.frames_left = self.frames_left.saturating_sub(1);
        if self.frames_left == 0 {
            if let Err(err) = ctx.destroy_self() {
                log::warn!("shell {} could not detonate: {err}", ctx.id());
            }
        }
    }

    fn stop(&mut self, ctx: &mut BehaviourContext<'_>) {
        info!("{} detonated", ctx.id());
    }
}

// ── Observers ─────────────────────────────────────────────────────────────────

struct FrameReport;

impl SystemObserver for FrameReport {
    fn on_order_rebuilt(&mut self, order: &[BehaviourTypeId]) {
        let names: Vec<&str> = order.iter().map(BehaviourTypeId::short_name).collect();
        info!("update order: {}", names.join(" → "));
    }

    fn on_tick_end(&mut self, stats: &TickStats) {
        log::debug!(
            "tick {}: {} started, {} updated, {} compacted",
            stats.tick, stats.started, stats.updated, stats.compacted,
        );
    }
}

struct HierarchyLog;

impl HierarchyObserver for HierarchyLog {
    fn on_hierarchy_changed(&mut self, change: &HierarchyChange) {
        match change.parent {
            Some(parent) => info!("{:?} {} under {parent}", change.action, change.child),
            None => info!("{:?} root {}", change.action, change.child),
        }
    }
}

// ── Main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut table = OrderingTable::new();
    let _ = table.entry::<Render>().after::<Physics>();
    let _ = table.entry::<Audio>().after::<Render>();

    let system = SystemBuilder::new()
        .config(SchedulerConfig::debug())
        .ordering(table)
        .observer(FrameReport)
        .build();
    let mut scene = NodeManager::new(system).with_observer(HierarchyLog);

    // ── Build the ship ────────────────────────────────────────────────────
    let ship = scene.create_node("ship");
    let engine_node = scene.create_node("engine");
    let turret = scene.create_node("turret");
    scene.add_data(ship, "Kestrel")?;

    let engine = scene.add_behaviour(engine_node, Physics::default())?;
    scene.add_behaviour(ship, Render::default())?;
    scene.add_behaviour(ship, Audio)?;
    scene.add_behaviour(ship, Stall { engine, frame: 0, handle: None })?;
    scene.add_behaviour(turret, Launcher::default())?;

    scene.attach_child(ship, engine_node)?;
    scene.attach_child(ship, turret)?;
    scene.add_root(ship)?;

    // ── Frame loop ────────────────────────────────────────────────────────
    for frame in 1..=FRAMES {
        let stats = scene.update(FRAME_DELTA)?;
        let position = scene
            .behaviour::<Physics>(engine)
            .map(|p| p.position)
            .unwrap_or_default();
        info!(
            "frame {frame:>2}: {} behaviours updated, ship at {position:.2}",
            stats.updated,
        );
    }

    // ── Tear down ─────────────────────────────────────────────────────────
    scene.detach_child(ship, turret)?;
    scene.remove_root(ship)?;

    println!();
    println!("=== frame_loop complete ===");
    println!("  frames        : {FRAMES}");
    println!("  nodes         : {}", scene.tree().len());
    println!("  behaviours    : {}", scene.system().store().len());
    if let Some(physics) = scene.behaviour::<Physics>(engine) {
        println!("  ship position : {:.2}", physics.position);
    }

    Ok(())
}
