//! Puzzle-world benchmarks (criterion - wall-clock time).
//!
//! Run all:    cargo bench --manifest-path benchmarks/Cargo.toml --bench world
//! Filter:     cargo bench --manifest-path benchmarks/Cargo.toml --bench world -- extrude

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use puzzle_bench::*;
use puzzle_world::geometry::combine_polygons;
use puzzle_world::{find_outline, segments_to_polygons};

// ---------------------------------------------------------------------------
// Geometry kernel
// ---------------------------------------------------------------------------

fn bench_extrude(c: &mut Criterion) {
    let mut group = c.benchmark_group("extrude/zigzag");
    for &n in &[4, 16, 64, 256] {
        let points = zigzag(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| {
            b.iter(|| segments_to_polygons(&points, 2.0));
        });
    }
    group.finish();
}

fn bench_outline(c: &mut Criterion) {
    {
        let mut group = c.benchmark_group("outline/strip");
        for &n in &[4, 16, 64] {
            let polys = square_strip(n);
            group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| {
                b.iter(|| find_outline(&polys));
            });
        }
        group.finish();
    }

    {
        let mut group = c.benchmark_group("outline/grid");
        for &side in &[2, 4, 8] {
            let polys = square_grid(side);
            group.bench_with_input(BenchmarkId::from_parameter(side), &side, |b, _| {
                b.iter(|| find_outline(&polys));
            });
        }
        group.finish();
    }

    {
        let mut group = c.benchmark_group("outline/extruded");
        for &n in &[8, 32, 128] {
            let polys: Vec<_> = segments_to_polygons(&zigzag(n), 2.0)
                .unwrap_or_default()
                .into_iter()
                .map(|q| q.to_vec())
                .collect();
            group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| {
                b.iter(|| find_outline(&polys));
            });
        }
        group.finish();
    }
}

fn bench_compound(c: &mut Criterion) {
    {
        let mut group = c.benchmark_group("compound/mass");
        for &side in &[2, 4, 8] {
            let polys = square_grid(side);
            group.bench_with_input(BenchmarkId::from_parameter(side), &side, |b, _| {
                b.iter(|| combine_polygons(&polys, 1.0));
            });
        }
        group.finish();
    }

    {
        let mut group = c.benchmark_group("compound/build");
        for &side in &[2, 4, 8] {
            group.bench_with_input(BenchmarkId::from_parameter(side), &side, |b, &side| {
                b.iter(|| setup_compound_scene(side));
            });
        }
        group.finish();
    }
}

// ---------------------------------------------------------------------------
// World stepping
// ---------------------------------------------------------------------------

fn bench_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("step/balls_in_cup");
    group.sample_size(20);
    for &n in &[10, 50, 200] {
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            b.iter_batched(
                || setup_ball_scene(n).expect("scene setup"),
                |mut world| {
                    for _ in 0..10 {
                        world.step(0.1);
                    }
                    world
                },
                criterion::BatchSize::LargeInput,
            );
        });
    }
    group.finish();
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

criterion_group!(
    benches,
    bench_extrude,
    bench_outline,
    bench_compound,
    bench_step,
);
criterion_main!(benches);
