//! # Registry Performance Benchmark
//!
//! Measures the per-frame operations calling code relies on:
//! - Point insert / remove with swap compaction
//! - Two-way query intersection
//! - Dense iteration of a single store
//!
//! Run with: `cargo bench --package timberyard_core`

#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use timberyard_core::{Blocked, Entity, Position, Registry, TileKind, TilePosition};

/// Tile count for a large editor level.
const TILE_COUNT: usize = 100_000;

/// Builds a level where every tile has a position and kind and one in
/// eight tiles is blocked.
fn build_level(count: usize) -> Registry {
    let mut registry = Registry::new();
    for i in 0..count {
        let tile = registry.create();
        let x = i32::try_from(i % 1000).unwrap_or(0);
        let y = i32::try_from(i / 1000).unwrap_or(0);
        registry.insert(tile, TilePosition::new(x, y)).unwrap();
        registry.insert(tile, TileKind::Grass).unwrap();
        if i % 8 == 0 {
            registry.insert(tile, Blocked).unwrap();
        }
    }
    registry
}

fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert");

    for count in [1_000, 10_000, TILE_COUNT] {
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            b.iter(|| {
                let mut registry = Registry::new();
                for _ in 0..count {
                    let e = registry.create();
                    registry.insert(e, Position::new(1.0, 2.0)).unwrap();
                }
                black_box(registry.len::<Position>())
            });
        });
    }

    group.finish();
}

fn bench_remove(c: &mut Criterion) {
    c.bench_function("remove_100k_front_to_back", |b| {
        b.iter_batched(
            || build_level(TILE_COUNT),
            |mut registry| {
                for raw in 1..=u32::try_from(TILE_COUNT).unwrap_or(u32::MAX) {
                    registry.remove::<TileKind>(Entity::from_raw(raw));
                }
                black_box(registry.len::<TileKind>())
            },
            criterion::BatchSize::LargeInput,
        );
    });
}

fn bench_query(c: &mut Criterion) {
    let registry = build_level(TILE_COUNT);

    c.bench_function("query_tile_position_blocked_100k", |b| {
        b.iter(|| black_box(registry.query::<(TilePosition, Blocked)>().len()));
    });

    c.bench_function("query_tile_position_kind_100k", |b| {
        b.iter(|| black_box(registry.query::<(TilePosition, TileKind)>().len()));
    });
}

fn bench_dense_iteration(c: &mut Criterion) {
    let mut registry = Registry::new();
    for _ in 0..TILE_COUNT {
        let e = registry.create();
        registry.insert(e, Position::new(0.0, 0.0)).unwrap();
    }

    c.bench_function("iterate_positions_100k", |b| {
        b.iter(|| {
            for (_, pos) in registry.store_mut::<Position>().iter_mut() {
                pos.x += 0.001;
                pos.y += 0.001;
            }
        });
    });
}

criterion_group!(
    benches,
    bench_insert,
    bench_remove,
    bench_query,
    bench_dense_iteration,
);
criterion_main!(benches);
