//! Benchmark workloads for the Drift particle-tracking engine.
//!
//! Provides pre-built engines and readers for benchmarks and examples:
//!
//! - [`GyreReader`]: analytic double-gyre currents with a steady wind
//! - [`reference_engine`]: passive tracers with wind drift and mixing
//! - [`oil_engine`]: subsurface oil droplets with the full Oil3D physics
//! - [`grid_points`]: deterministic query points inside the gyre domain

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::error::Error;
use std::f64::consts::PI;

use drift_core::variables as var;
use drift_core::{BoundingBox, Point, ReaderError, TimeInterval};
use drift_engine::{Engine, EngineConfig, SeedRequest};
use drift_env::Reader;
use drift_substances::{Oil3D, PassiveTracer};

/// Domain of the gyre: 0–10°E, 55–65°N.
pub const GYRE_DOMAIN: BoundingBox = BoundingBox {
    lon_min: 0.0,
    lon_max: 10.0,
    lat_min: 55.0,
    lat_max: 65.0,
};

/// Double-gyre surface currents (peak 0.5 m/s), oscillating with a
/// 12-hour period, and a steady 8 m/s south-westerly wind.
pub struct GyreReader;

impl GyreReader {
    fn current(p: &Point, time: f64) -> (f64, f64) {
        let x = (p.lon - GYRE_DOMAIN.lon_min) / 5.0;
        let y = (p.lat - GYRE_DOMAIN.lat_min) / 10.0;
        let eps = 0.25 * (2.0 * PI * time / 43_200.0).sin();
        let f = eps * x * x + (1.0 - 2.0 * eps) * x;
        let u = -0.5 * (PI * f).sin() * (PI * y).cos();
        let v = 0.5 * (PI * f).cos() * (PI * y).sin();
        (u, v)
    }
}

impl Reader for GyreReader {
    fn name(&self) -> &str {
        "gyre"
    }

    fn variables(&self) -> Vec<String> {
        [
            var::X_SEA_WATER_VELOCITY,
            var::Y_SEA_WATER_VELOCITY,
            var::X_WIND,
            var::Y_WIND,
        ]
        .iter()
        .map(|v| v.to_string())
        .collect()
    }

    fn bounds(&self) -> BoundingBox {
        GYRE_DOMAIN
    }

    fn validity(&self) -> TimeInterval {
        TimeInterval::ALWAYS
    }

    fn get(&self, variable: &str, points: &[Point], time: f64) -> Result<Vec<f64>, ReaderError> {
        let values = match variable {
            var::X_SEA_WATER_VELOCITY => points.iter().map(|p| Self::current(p, time).0).collect(),
            var::Y_SEA_WATER_VELOCITY => points.iter().map(|p| Self::current(p, time).1).collect(),
            var::X_WIND | var::Y_WIND => vec![8.0 * std::f64::consts::FRAC_1_SQRT_2; points.len()],
            other => return Err(ReaderError::new(format!("variable '{other}' not provided"))),
        };
        Ok(values)
    }
}

/// `elements` passive tracers seeded at 2 m depth in the middle of the
/// gyre, with wind drift and turbulent mixing.
///
/// # Errors
///
/// Returns `Err` if the engine rejects the configuration or the seed.
pub fn reference_engine(elements: usize, seed: u64) -> Result<Engine, Box<dyn Error>> {
    let tracer = PassiveTracer::builder().turbulent_mixing(true).build()?;
    let config = EngineConfig {
        seed,
        domain: Some(GYRE_DOMAIN),
        ..EngineConfig::default()
    };
    let mut engine = Engine::new(config, Box::new(tracer))?;
    engine.add_reader(Box::new(GyreReader), 1)?;
    engine.seed(
        SeedRequest::new(5.0, 60.0, 0.0, elements)
            .radius(20_000.0)
            .depth(-2.0),
    )?;
    Ok(engine)
}

/// `elements` oil droplets released 50 m down in the gyre; sizes are
/// drawn from the subsea droplet spectrum.
///
/// # Errors
///
/// Returns `Err` if the engine rejects the configuration or the seed.
pub fn oil_engine(elements: usize, seed: u64) -> Result<Engine, Box<dyn Error>> {
    let oil = Oil3D::builder().build()?;
    let config = EngineConfig {
        seed,
        domain: Some(GYRE_DOMAIN),
        ..EngineConfig::default()
    };
    let mut engine = Engine::new(config, Box::new(oil))?;
    engine.add_reader(Box::new(GyreReader), 1)?;
    engine.seed(
        SeedRequest::new(5.0, 60.0, 0.0, elements)
            .radius(5_000.0)
            .depth(-50.0),
    )?;
    Ok(engine)
}

/// `n` surface points on a regular lattice covering [`GYRE_DOMAIN`].
pub fn grid_points(n: usize) -> Vec<Point> {
    let side = (n as f64).sqrt().ceil().max(1.0) as usize;
    let step_lon = (GYRE_DOMAIN.lon_max - GYRE_DOMAIN.lon_min) / (side + 1) as f64;
    let step_lat = (GYRE_DOMAIN.lat_max - GYRE_DOMAIN.lat_min) / (side + 1) as f64;
    (0..n)
        .map(|i| {
            let (row, col) = (i / side, i % side);
            Point::new(
                GYRE_DOMAIN.lon_min + step_lon * (col + 1) as f64,
                GYRE_DOMAIN.lat_min + step_lat * (row + 1) as f64,
                0.0,
            )
        })
        .collect()
}
