//! Environment readers and their prioritized aggregation.
//!
//! External data sources implement [`Reader`]. Each one is registered
//! once, before the run, as a [`ReaderRegistration`] carrying its
//! declared coverage and a unique priority rank. The [`Environment`]
//! aggregator answers variable queries for a batch of points by asking
//! the covering readers in priority order, then filling gaps from a
//! [`FallbackTable`]. Results come back as an [`EnvironmentSnapshot`]
//! that lives for a single step.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod aggregator;
pub mod fallback;
pub mod reader;
pub mod registry;
pub mod snapshot;

pub use aggregator::{Environment, QueryOutcome, QueryStats};
pub use fallback::FallbackTable;
pub use reader::Reader;
pub use registry::{ReaderRegistration, ReaderRegistry, RegistryError};
pub use snapshot::EnvironmentSnapshot;
