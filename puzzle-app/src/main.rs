//! Run a puzzle scene headless and report how it ends.
//!
//! Usage: puzzle-app [scene.json] [seconds] [step]
//!
//! Without a scene file a small demo (a ball dropped into a goal) is run.

use std::cell::Cell;
use std::rc::Rc;

use anyhow::Context;
use glam::DVec2;
use puzzle_world::world::DEFAULT_SLOP_TIME;
use puzzle_world::{filter_collision_events, ObjectParams, SceneDesc, World, WorldConfig};

fn demo_world() -> anyhow::Result<World> {
    let mut world = World::new(WorldConfig::new(DVec2::new(100.0, 100.0), 10.0))?;
    world.add_ball("ball", DVec2::new(50.0, 90.0), 5.0, ObjectParams::new())?;
    world.add_segment(
        "ramp",
        DVec2::new(20.0, 60.0),
        DVec2::new(45.0, 50.0),
        2.0,
        ObjectParams::fixed(),
    )?;
    world.add_box_goal("goal", [40.0, 0.0, 60.0, 10.0], None)?;
    world.attach_specific_in_goal("goal", "ball", 1.0);
    Ok(world)
}

fn load_world(path: &str) -> anyhow::Result<World> {
    let text = std::fs::read_to_string(path).with_context(|| format!("reading {path}"))?;
    let scene: SceneDesc =
        serde_json::from_str(&text).with_context(|| format!("parsing {path}"))?;
    World::from_scene(&scene).with_context(|| format!("building {path}"))
}

fn parse_arg(args: &[String], index: usize, default: f64) -> anyhow::Result<f64> {
    match args.get(index) {
        Some(s) => s.parse().with_context(|| format!("invalid number `{s}`")),
        None => Ok(default),
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args: Vec<String> = std::env::args().skip(1).collect();

    let mut world = match args.first() {
        Some(path) => load_world(path)?,
        None => demo_world()?,
    };
    let duration = parse_arg(&args, 1, 20.0)?;
    let dt = parse_arg(&args, 2, 0.1)?;
    if dt <= 0.0 {
        anyhow::bail!("step must be positive, got {dt}");
    }

    let won_at = Rc::new(Cell::new(None));
    let first_win = won_at.clone();
    world.set_win_callback(move |t| {
        if first_win.get().is_none() {
            first_win.set(Some(t));
        }
    });

    log::info!(
        "running {} objects for {duration} s in steps of {dt} s",
        world.object_names().count()
    );
    while world.time() < duration && won_at.get().is_none() {
        world.step(dt);
    }

    match won_at.get() {
        Some(t) => println!("won at t = {t:.2} s"),
        None => println!(
            "not won after {:.2} s (remaining: {:?})",
            world.time(),
            world.remaining_time()
        ),
    }

    let spans = filter_collision_events(world.collision_events(), DEFAULT_SLOP_TIME);
    println!(
        "{} collision events, {} contact spans",
        world.collision_events().len(),
        spans.len()
    );
    for span in spans {
        let fmt = |t: Option<f64>| t.map_or_else(|| "-".to_string(), |t| format!("{t:.2}"));
        println!(
            "  {} / {}: {} .. {}",
            span.first,
            span.second,
            fmt(span.begin),
            fmt(span.end)
        );
    }
    Ok(())
}
