//! Substance hook interface for the Drift engine.
//!
//! The engine core knows nothing about oil, plankton or drifting
//! objects. Each substance variant implements [`Substance`]: it declares
//! its attribute schema and the environment variables it needs, and its
//! [`update`](Substance::update) hook moves the active elements through
//! a [`StepContext`]. The context exposes the step's environment
//! snapshot, horizontal and vertical advection, the vertical mixing
//! integrator, the step RNG, and deactivation.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod advection;
pub mod context;
pub mod substance;

pub use advection::AdvectionScheme;
pub use context::StepContext;
pub use substance::{SeedContext, Substance};
