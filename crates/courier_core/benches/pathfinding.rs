//! Pathfinding benchmarks for courier_core.
//!
//! Run with: `cargo bench -p courier_core`

// Benchmark binaries don't need docs on macro-generated functions
#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use courier_core::grid::{Cell, Grid};
use courier_core::map_generation::{generate_map, MapConfig};
use courier_core::movement::MovementModel;
use courier_core::pathfinding::find_path;

/// Open the corners so the benchmark always has endpoints to search between.
fn bench_grid(size: u32) -> Grid {
    let generated = generate_map(&MapConfig::new(size, size).with_seed(42)).unwrap();
    let max = size as i32 - 1;
    let corners = [Cell::new(0, 0), Cell::new(max, max)];
    let rows: Vec<Vec<bool>> = (0..size as i32)
        .map(|y| {
            (0..size as i32)
                .map(|x| {
                    let cell = Cell::new(x, y);
                    !corners.contains(&cell) && !generated.is_cell_walkable(cell)
                })
                .collect()
        })
        .collect();
    Grid::from_rows(&rows).unwrap()
}

pub fn pathfinding_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("find_path");
    for size in [32u32, 64, 128] {
        let grid = bench_grid(size);
        let goal = Cell::new(size as i32 - 1, size as i32 - 1);
        for model in MovementModel::ALL {
            group.bench_with_input(BenchmarkId::new(model.name(), size), &grid, |b, grid| {
                b.iter(|| find_path(black_box(grid), model, Cell::new(0, 0), goal));
            });
        }
    }
    group.finish();
}

pub fn open_grid_benchmark(c: &mut Criterion) {
    let grid = Grid::open(128, 128).unwrap();
    let goal = Cell::new(127, 127);
    c.bench_function("find_path_open_octile_128", |b| {
        b.iter(|| find_path(black_box(&grid), MovementModel::Octile8, Cell::new(0, 0), goal));
    });
}

criterion_group!(benches, pathfinding_benchmark, open_grid_benchmark);
criterion_main!(benches);
