//! Pool-specific error types.

use std::error::Error;
use std::fmt;

use drift_core::AttrId;

/// Errors from the per-attribute active-element views.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ViewError {
    /// The attribute ID is not part of the pool's schema.
    UnknownAttribute {
        /// The unrecognised attribute.
        attr: AttrId,
    },
    /// A write supplied a different number of values than there are
    /// active elements.
    LengthMismatch {
        /// Number of active elements.
        expected: usize,
        /// Number of values supplied.
        got: usize,
    },
}

impl fmt::Display for ViewError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownAttribute { attr } => write!(f, "unknown attribute: {attr}"),
            Self::LengthMismatch { expected, got } => write!(
                f,
                "active view write has {got} values, expected {expected}"
            ),
        }
    }
}

impl Error for ViewError {}
