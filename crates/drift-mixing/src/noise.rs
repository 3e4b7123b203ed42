//! Unit-variance random draws for the random walk.

use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::config::NoiseKind;

/// Standard normal sample via the Box–Muller transform.
pub fn box_muller(rng: &mut ChaCha8Rng) -> f64 {
    let u1: f64 = rng.random::<f64>().max(1e-300); // avoid ln(0)
    let u2: f64 = rng.random();
    (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
}

/// Zero-mean, unit-variance sample of the configured kind.
pub fn draw(kind: NoiseKind, rng: &mut ChaCha8Rng) -> f64 {
    match kind {
        NoiseKind::Gaussian => box_muller(rng),
        NoiseKind::Uniform => (rng.random::<f64>() * 2.0 - 1.0) * 3f64.sqrt(),
    }
}
