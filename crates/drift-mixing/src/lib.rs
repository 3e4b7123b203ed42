//! Vertical turbulent mixing as a sub-stepped random walk.
//!
//! [`VerticalMixer::mix`] advances element depths over one outer time
//! step using the Visser (1997) scheme
//!
//! ```text
//! z' = z + K'(z)·δt + sqrt(2·K(z + K'(z)·δt/2)·δt)·R + w·δt
//! ```
//!
//! where `K` is the diffusivity profile, `R` a unit-variance random
//! number and `w` the terminal velocity. The sub-step `δt` is derived
//! from the largest diffusivity so the RMS displacement per sub-step
//! stays below a fraction of the vertical resolution. Depths are
//! reflected at the sea floor and handed to a [`SurfaceHook`] when
//! they reach the surface.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod integrator;
pub mod noise;
pub mod surface;

pub use config::{MixingConfig, NoiseKind};
pub use integrator::{MixingReport, VerticalMixer};
pub use surface::{ReflectAtSurface, Resurface, SurfaceAction, SurfaceHook};
