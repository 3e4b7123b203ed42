//! Criterion micro-benchmarks for the vertical mixing integrator.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use drift_core::ProfileField;
use drift_mixing::{MixingConfig, Resurface, VerticalMixer};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

const ELEMENTS: usize = 10_000;

/// Diffusivity decaying from 0.05 m²/s at the surface over 50 levels.
fn decaying_profiles(n: usize) -> ProfileField {
    let depths: Vec<f64> = (0..50).map(|i| -(i as f64)).collect();
    let column: Vec<f64> = depths.iter().map(|z| 0.05 * (z / 10.0).exp() + 1e-4).collect();
    let values = column.iter().copied().cycle().take(n * depths.len()).collect();
    ProfileField::new(depths, values).unwrap()
}

fn bench_mix_hour(c: &mut Criterion, name: &str, config: MixingConfig) {
    let mixer = VerticalMixer::new(config);
    let k = decaying_profiles(ELEMENTS);
    let w = vec![0.001; ELEMENTS];
    let floor = vec![-100.0; ELEMENTS];
    let mut z: Vec<f64> = (0..ELEMENTS).map(|i| -((i % 40) as f64)).collect();
    let mut rng = ChaCha8Rng::seed_from_u64(42);

    c.bench_function(name, |b| {
        b.iter(|| {
            let report = mixer
                .mix(&mut z, 3600.0, &k, &w, &floor, &mut Resurface, &mut rng)
                .unwrap();
            black_box(report);
        });
    });
}

/// Benchmark: one hour for 10K elements with 60 s sub-steps.
fn bench_mix_hour_10k(c: &mut Criterion) {
    bench_mix_hour(c, "mix_hour_10k", MixingConfig::default());
}

/// Benchmark: one hour for 10K elements with sub-steps set only by the
/// stability limit.
fn bench_mix_hour_10k_uncapped(c: &mut Criterion) {
    bench_mix_hour(
        c,
        "mix_hour_10k_uncapped",
        MixingConfig {
            max_substep: None,
            ..MixingConfig::default()
        },
    );
}

criterion_group!(benches, bench_mix_hour_10k, bench_mix_hour_10k_uncapped);
criterion_main!(benches);
