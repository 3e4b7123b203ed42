//! Criterion micro-benchmarks for environment aggregation.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use drift_bench::{grid_points, GyreReader};
use drift_core::variables as var;
use drift_core::BoundingBox;
use drift_env::{Environment, FallbackTable, ReaderRegistry};
use drift_test_utils::ConstantReader;

const CURRENTS: [&str; 2] = [var::X_SEA_WATER_VELOCITY, var::Y_SEA_WATER_VELOCITY];

/// Benchmark: one reader covering all 10K points.
fn bench_single_reader_10k(c: &mut Criterion) {
    let mut registry = ReaderRegistry::new();
    registry.register_reader(Box::new(GyreReader), 1).unwrap();
    let fallbacks = FallbackTable::ocean_defaults();
    let env = Environment::new(&registry, &fallbacks);
    let points = grid_points(10_000);

    c.bench_function("single_reader_10k", |b| {
        b.iter(|| {
            let outcome = env.query(&CURRENTS, &[], &points, 3600.0, &[]);
            black_box(&outcome.snapshot);
        });
    });
}

/// Benchmark: a nested reader covering the western half, the gyre
/// behind it and fallbacks for everything else.
fn bench_layered_readers_10k(c: &mut Criterion) {
    let mut registry = ReaderRegistry::new();
    let nested = ConstantReader::new("nested", &CURRENTS, 0.1)
        .with_bounds(BoundingBox::new(0.0, 5.0, 55.0, 65.0));
    registry.register_reader(Box::new(nested), 1).unwrap();
    registry.register_reader(Box::new(GyreReader), 2).unwrap();
    let fallbacks = FallbackTable::ocean_defaults();
    let env = Environment::new(&registry, &fallbacks);
    let points = grid_points(10_000);
    let variables = [
        var::X_SEA_WATER_VELOCITY,
        var::Y_SEA_WATER_VELOCITY,
        var::X_WIND,
        var::Y_WIND,
        var::SEA_FLOOR_DEPTH_BELOW_SEA_LEVEL,
    ];

    c.bench_function("layered_readers_10k", |b| {
        b.iter(|| {
            let outcome = env.query(&variables, &[], &points, 3600.0, &[]);
            black_box(&outcome.snapshot);
        });
    });
}

/// Benchmark: fallback diffusivity profiles on 50 levels for 10K points.
fn bench_fallback_profiles_10k(c: &mut Criterion) {
    let registry = ReaderRegistry::new();
    let fallbacks = FallbackTable::ocean_defaults();
    let env = Environment::new(&registry, &fallbacks);
    let points = grid_points(10_000);
    let depths: Vec<f64> = (0..50).map(|i| -(i as f64)).collect();

    c.bench_function("fallback_profiles_10k", |b| {
        b.iter(|| {
            let outcome = env.query(
                &[],
                &[var::OCEAN_VERTICAL_DIFFUSIVITY],
                &points,
                0.0,
                &depths,
            );
            black_box(&outcome.snapshot);
        });
    });
}

criterion_group!(
    benches,
    bench_single_reader_10k,
    bench_layered_readers_10k,
    bench_fallback_profiles_10k
);
criterion_main!(benches);
