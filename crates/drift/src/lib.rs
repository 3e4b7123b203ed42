//! Drift: a Lagrangian particle-tracking engine for substances drifting
//! in the ocean.
//!
//! This is the top-level facade crate that re-exports the public API
//! from all Drift sub-crates. For most users, adding `drift` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use drift::prelude::*;
//! use drift::substances::PassiveTracer;
//!
//! // A steady eastward current of 0.5 m/s everywhere.
//! struct Eastward;
//! impl Reader for Eastward {
//!     fn name(&self) -> &str { "eastward" }
//!     fn variables(&self) -> Vec<String> {
//!         vec!["x_sea_water_velocity".into(), "y_sea_water_velocity".into()]
//!     }
//!     fn bounds(&self) -> BoundingBox { BoundingBox::GLOBAL }
//!     fn validity(&self) -> TimeInterval { TimeInterval::ALWAYS }
//!     fn get(&self, v: &str, points: &[Point], _t: f64) -> Result<Vec<f64>, ReaderError> {
//!         let value = if v == "x_sea_water_velocity" { 0.5 } else { 0.0 };
//!         Ok(vec![value; points.len()])
//!     }
//! }
//!
//! let tracer = PassiveTracer::builder().wind_drift(false).build().unwrap();
//! let mut engine = Engine::new(EngineConfig::default(), Box::new(tracer)).unwrap();
//! engine.add_reader(Box::new(Eastward), 1).unwrap();
//! engine.seed(SeedRequest::new(4.0, 60.0, 0.0, 100).radius(1000.0)).unwrap();
//!
//! let summary = engine.run(RunConfig::steps(24, 3600.0)).unwrap();
//! assert_eq!(summary.state, EngineState::Finished);
//! assert_eq!(engine.history().len(), 24);
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in the prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `drift-core` | IDs, geometry, schemas, variable names, error types |
//! | [`pool`] | `drift-pool` | Element storage and lifecycle |
//! | [`env`] | `drift-env` | Reader trait, registry, prioritized aggregation |
//! | [`mixing`] | `drift-mixing` | Vertical random-walk integrator |
//! | [`substance`] | `drift-substance` | Substance trait and step context |
//! | [`substances`] | `drift-substances` | Passive tracer and 3D oil |
//! | [`engine`] | `drift-engine` | Simulation engine, configuration, output |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types, IDs and errors (`drift-core`).
///
/// Includes the standard variable names in [`types::variables`].
pub use drift_core as types;

/// Element storage (`drift-pool`).
pub use drift_pool as pool;

/// Environment readers and aggregation (`drift-env`).
///
/// Implement [`env::Reader`] to supply forcing data.
pub use drift_env as env;

/// Vertical mixing (`drift-mixing`).
pub use drift_mixing as mixing;

/// The substance extension point (`drift-substance`).
///
/// The [`substance::Substance`] trait is the main extension point for
/// user-defined element behavior.
pub use drift_substance as substance;

/// Reference substances (`drift-substances`).
pub use drift_substances as substances;

/// Simulation engine (`drift-engine`).
pub use drift_engine as engine;

/// Common imports for typical Drift usage.
///
/// ```rust
/// use drift::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use drift_core::{
        AttributeDef, BoundingBox, DeactivationReason, ElementId, ElementSchema, ElementStatus,
        Point, TimeInterval,
    };

    // Errors
    pub use drift_core::{EnvError, HookError, ReaderError, SeedError, StepError};

    // Environment
    pub use drift_env::{FallbackTable, Reader};

    // Mixing
    pub use drift_mixing::{MixingConfig, SurfaceAction, SurfaceHook};

    // Substance
    pub use drift_substance::{AdvectionScheme, SeedContext, StepContext, Substance};

    // Engine
    pub use drift_engine::{
        CoastlineAction, ConfigError, Engine, EngineConfig, EngineState, OutputHistory,
        OutputRecord, RunConfig, RunSummary, SeedRequest, StepMetrics,
    };
}
