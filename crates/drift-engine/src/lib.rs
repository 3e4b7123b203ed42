//! Simulation engine for Drift.
//!
//! The [`Engine`] owns the element pool, the reader registry and one
//! [`Substance`](drift_substance::Substance), and advances them through
//! time one fixed step at a time:
//!
//! ```text
//! advance clock → release → query environment → prepare_step/update
//!              → numerical check → domain and land checks → output
//! ```
//!
//! Configuration is split into [`EngineConfig`] (fixed when the engine
//! is built) and [`RunConfig`] (per run). Both are validated before any
//! step executes; failures are [`ConfigError`]s. Failures during a step
//! end the run in [`EngineState::Failed`] and are reported in the
//! [`RunSummary`].
//!
//! # Example
//!
//! ```
//! use drift_engine::{Engine, EngineConfig, EngineState, RunConfig, SeedRequest};
//! use drift_test_utils::fixtures::DrifterSubstance;
//!
//! let mut engine = Engine::new(EngineConfig::default(), Box::new(DrifterSubstance::new())).unwrap();
//! engine.seed(SeedRequest::new(4.0, 60.0, 0.0, 10).radius(500.0)).unwrap();
//! let summary = engine.run(RunConfig::steps(6, 900.0)).unwrap();
//! assert_eq!(summary.state, EngineState::Finished);
//! assert_eq!(summary.num_active, 10);
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod boundary;
pub mod clock;
pub mod config;
pub mod engine;
pub mod metrics;
pub mod output;
pub mod seeding;

pub use clock::SimulationClock;
pub use config::{CoastlineAction, ConfigError, EngineConfig, RunConfig, RunLength};
pub use engine::{Engine, EngineState, RunSummary};
pub use metrics::StepMetrics;
pub use output::{OutputHistory, OutputRecord};
pub use seeding::{SeedDepth, SeedRequest};
