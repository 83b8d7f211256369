//! Shared setup helpers for puzzle-world benchmarks.
//!
//! ## Running
//!
//!   cargo bench --manifest-path benchmarks/Cargo.toml --bench world
//!
//! Filter by group:
//!   cargo bench --manifest-path benchmarks/Cargo.toml --bench world -- outline
//!   cargo bench --manifest-path benchmarks/Cargo.toml --bench world -- step

use glam::DVec2;
use puzzle_world::geometry::box_vertices;
use puzzle_world::{ObjectParams, World, WorldConfig};

// ---------------------------------------------------------------------------
// Geometry inputs
// ---------------------------------------------------------------------------

/// Zig-zag polyline with `n` points, alternating between two heights.
pub fn zigzag(n: usize) -> Vec<DVec2> {
    (0..n)
        .map(|i| DVec2::new(i as f64 * 10.0, if i % 2 == 0 { 0.0 } else { 7.0 }))
        .collect()
}

/// `n` unit squares in a row, every neighbour sharing one edge.
pub fn square_strip(n: usize) -> Vec<Vec<DVec2>> {
    (0..n)
        .map(|i| {
            let x = i as f64;
            box_vertices([x, 0.0, x + 1.0, 1.0])
        })
        .collect()
}

/// `side * side` grid of unit squares.
pub fn square_grid(side: usize) -> Vec<Vec<DVec2>> {
    let mut polys = Vec::with_capacity(side * side);
    for row in 0..side {
        for col in 0..side {
            let (x, y) = (col as f64, row as f64);
            polys.push(box_vertices([x, y, x + 1.0, y + 1.0]));
        }
    }
    polys
}

// ---------------------------------------------------------------------------
// Scenes
// ---------------------------------------------------------------------------

/// Closed 600x600 world with `n` balls dropped above a static cup and goal.
pub fn setup_ball_scene(n: usize) -> anyhow::Result<World> {
    let mut world = World::new(WorldConfig::new(DVec2::new(600.0, 600.0), 200.0))?;
    world.add_container(
        "cup",
        &[
            DVec2::new(200.0, 200.0),
            DVec2::new(200.0, 100.0),
            DVec2::new(400.0, 100.0),
            DVec2::new(400.0, 200.0),
        ],
        8.0,
        ObjectParams::fixed(),
        None,
    )?;
    world.add_box_goal("goal", [250.0, 105.0, 350.0, 150.0], None)?;

    let cols = (n as f64).sqrt().ceil() as usize;
    for i in 0..n {
        let x = 220.0 + (i % cols) as f64 * 12.0;
        let y = 300.0 + (i / cols) as f64 * 12.0;
        world.add_ball(&format!("ball{i}"), DVec2::new(x, y), 5.0, ObjectParams::new())?;
    }
    world.attach_any_in_goal("goal", 2.0, Vec::new());
    Ok(world)
}

/// World holding one dynamic compound made of a `side * side` grid.
pub fn setup_compound_scene(side: usize) -> anyhow::Result<World> {
    let mut world = World::new(WorldConfig::new(DVec2::new(600.0, 600.0), 200.0))?;
    let polys: Vec<Vec<DVec2>> = square_grid(side)
        .into_iter()
        .map(|p| p.into_iter().map(|v| v * 10.0 + DVec2::new(100.0, 100.0)).collect())
        .collect();
    world.add_compound("grid", &polys, ObjectParams::new())?;
    Ok(world)
}
