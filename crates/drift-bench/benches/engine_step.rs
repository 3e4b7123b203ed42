//! Criterion benchmarks for whole engine steps.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use drift_bench::{oil_engine, reference_engine};
use drift_engine::{EngineState, RunConfig};

fn bench_tracer_step_10k(c: &mut Criterion) {
    let mut engine = reference_engine(10_000, 42).unwrap();
    engine.start(RunConfig::steps(u64::MAX, 900.0)).unwrap();
    // Warm up: the first step releases everything.
    engine.step();

    c.bench_function("tracer_step_10k", |b| {
        b.iter(|| {
            let state = engine.step();
            black_box(state);
        });
    });
}

fn bench_oil_step_1k(c: &mut Criterion) {
    let mut engine = oil_engine(1_000, 42).unwrap();
    engine.start(RunConfig::steps(u64::MAX, 900.0)).unwrap();
    engine.step();

    c.bench_function("oil_step_1k", |b| {
        b.iter(|| {
            let state = engine.step();
            black_box(state);
        });
    });
}

fn bench_tracer_run_24h_1k(c: &mut Criterion) {
    c.bench_function("tracer_run_24h_1k", |b| {
        b.iter(|| {
            let mut engine = reference_engine(1_000, 42).unwrap();
            let summary = engine.run(RunConfig::steps(96, 900.0)).unwrap();
            assert_eq!(summary.state, EngineState::Finished);
            black_box(engine.history().hash());
        });
    });
}

criterion_group!(
    benches,
    bench_tracer_step_10k,
    bench_oil_step_1k,
    bench_tracer_run_24h_1k
);
criterion_main!(benches);
