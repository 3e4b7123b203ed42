//! Structure-of-arrays element storage for the Drift engine.
//!
//! The [`ElementPool`] owns every element ever seeded (scheduled,
//! active and deactivated) as parallel arrays indexed by a dense
//! [`Slot`](drift_core::Slot). Physics code never touches the pool
//! directly: the engine gathers the active elements into an
//! [`ActiveState`], hands it to the substance hooks, and scatters it
//! back once the step succeeds.
//!
//! ```text
//! ElementPool
//! ├── ids / status / release_time / deactivation   (one entry per slot)
//! ├── lon / lat / z                                (built-in positions)
//! ├── attributes[AttrId][slot]                     (substance schema)
//! ├── scheduled: Vec<Slot>                         (ascending)
//! └── active: Vec<Slot>                            (ascending)
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod active;
pub mod error;
pub mod pool;

pub use active::ActiveState;
pub use error::ViewError;
pub use pool::{AttrValue, ElementPool};
