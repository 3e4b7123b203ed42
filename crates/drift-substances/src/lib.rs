//! Reference substances for the Drift engine.
//!
//! - [`PassiveTracer`]: moved by currents, wind, Stokes drift, vertical
//!   advection and turbulent mixing, each optional.
//! - [`Oil3D`]: oil droplets entrained by breaking waves and rising
//!   with a size-dependent terminal velocity.
//!
//! [`water`] holds the sea water and wave parameterisations they share.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod oil3d;
pub mod tracer;
pub mod water;

pub use oil3d::{DropletSpectrum, EntrainmentHook, Oil3D, Oil3DBuilder};
pub use tracer::{PassiveTracer, PassiveTracerBuilder};
