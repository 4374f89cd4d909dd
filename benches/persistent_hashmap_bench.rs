//! Benchmarks for persistent map operations.
//!
//! Compares PersistentHashMap against the standard HashMap for single
//! operations, and measures the cost profile of structural sharing.

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::collections::HashMap;
use std::hint::black_box;
use trieste::persistent::PersistentHashMap;

// =============================================================================
// Lookup
// =============================================================================

fn benchmark_get(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("map_get");

    for size in [100, 10_000, 1_000_000] {
        let persistent: PersistentHashMap<i32, i32> =
            (0..size).map(|index| (index, index)).collect();
        let standard: HashMap<i32, i32> = (0..size).map(|index| (index, index)).collect();

        group.bench_with_input(
            BenchmarkId::new("PersistentHashMap", size),
            &size,
            |bencher, &size| {
                bencher.iter(|| black_box(persistent.get(&black_box(size / 2))));
            },
        );

        group.bench_with_input(
            BenchmarkId::new("HashMap", size),
            &size,
            |bencher, &size| {
                bencher.iter(|| black_box(standard.get(&black_box(size / 2))));
            },
        );
    }

    group.finish();
}

// =============================================================================
// Single Insert (persistent update vs full copy)
// =============================================================================

fn benchmark_single_insert(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("map_single_insert");

    for size in [100, 10_000, 1_000_000] {
        let persistent: PersistentHashMap<i32, i32> =
            (0..size).map(|index| (index, index)).collect();
        let standard: HashMap<i32, i32> = (0..size).map(|index| (index, index)).collect();

        // Path copy only
        group.bench_with_input(
            BenchmarkId::new("PersistentHashMap", size),
            &size,
            |bencher, _| {
                bencher.iter(|| black_box(persistent.insert(black_box(-1), black_box(-1))));
            },
        );

        // Whole-map clone, the equivalent non-destructive update on std
        group.bench_with_input(
            BenchmarkId::new("HashMap_clone_insert", size),
            &size,
            |bencher, _| {
                bencher.iter(|| {
                    let mut copy = standard.clone();
                    copy.insert(black_box(-1), black_box(-1));
                    black_box(copy)
                });
            },
        );
    }

    group.finish();
}

// =============================================================================
// Remove
// =============================================================================

fn benchmark_remove(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("map_remove");

    for size in [100, 10_000] {
        let persistent: PersistentHashMap<i32, i32> =
            (0..size).map(|index| (index, index)).collect();

        group.bench_with_input(
            BenchmarkId::new("PersistentHashMap", size),
            &size,
            |bencher, &size| {
                bencher.iter(|| black_box(persistent.remove(&black_box(size / 2))));
            },
        );
    }

    group.finish();
}

// =============================================================================
// Iteration
// =============================================================================

fn benchmark_iteration(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("map_iteration");

    for size in [10_000, 100_000] {
        let persistent: PersistentHashMap<i32, i64> =
            (0..size).map(|index| (index, i64::from(index))).collect();
        let standard: HashMap<i32, i64> =
            (0..size).map(|index| (index, i64::from(index))).collect();

        group.bench_with_input(
            BenchmarkId::new("PersistentHashMap", size),
            &size,
            |bencher, _| {
                bencher.iter(|| black_box(persistent.values().sum::<i64>()));
            },
        );

        group.bench_with_input(BenchmarkId::new("HashMap", size), &size, |bencher, _| {
            bencher.iter(|| black_box(standard.values().sum::<i64>()));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_get,
    benchmark_single_insert,
    benchmark_remove,
    benchmark_iteration,
);
criterion_main!(benches);
