//! Core types for the Drift particle-tracking engine.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the vocabulary shared across the workspace: element IDs and slots,
//! geographic points and bounds, element status and deactivation
//! reasons, attribute schemas, vertical profiles, standard variable
//! names, and the error taxonomy.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod element;
pub mod error;
pub mod geo;
pub mod id;
pub mod profile;
pub mod schema;
pub mod variables;

pub use element::{DeactivationReason, ElementStatus};
pub use error::{EnvError, HookError, MixingError, ReaderError, SeedError, StepError};
pub use geo::{BoundingBox, Point, TimeInterval, EARTH_RADIUS_M};
pub use id::{AttrId, ElementId, Slot, StepId};
pub use profile::ProfileField;
pub use schema::{AttributeDef, ElementSchema};
