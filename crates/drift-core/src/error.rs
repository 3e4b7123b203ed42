//! Error types for the Drift engine, organized by subsystem: seeding,
//! environment readers and aggregation, vertical mixing, substance hooks,
//! and per-step execution.
//!
//! Run-level configuration errors live next to the configuration in
//! `drift-engine`.

use std::error::Error;
use std::fmt;

/// A malformed seed request (`InvalidSeedingParameters`).
///
/// Seeding validates the whole request before inserting anything, so
/// any of these errors means no element was scheduled.
#[derive(Clone, Debug, PartialEq)]
pub enum SeedError {
    /// The request asked for zero elements.
    ZeroCount,
    /// A per-element sequence does not have `count` entries.
    LengthMismatch {
        /// Offending attribute.
        attribute: String,
        /// Expected length (the element count).
        expected: usize,
        /// Supplied length.
        got: usize,
    },
    /// A mandatory attribute (no schema default) was not supplied.
    MissingAttribute {
        /// Name of the missing attribute.
        attribute: String,
    },
    /// The request names an attribute the schema does not declare.
    UnknownAttribute {
        /// Name of the unknown attribute.
        attribute: String,
    },
    /// A supplied value is NaN or infinite.
    NonFinite {
        /// Offending attribute.
        attribute: String,
    },
    /// A supplied value lies outside its physical range.
    OutOfRange {
        /// Offending attribute.
        attribute: String,
        /// The rejected value.
        value: f64,
        /// Human-readable description of the valid range.
        expected: &'static str,
    },
    /// Elements can only be seeded before the run starts.
    AlreadyStarted,
}

impl fmt::Display for SeedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid seeding parameters: ")?;
        match self {
            Self::ZeroCount => write!(f, "element count must be at least 1"),
            Self::LengthMismatch {
                attribute,
                expected,
                got,
            } => write!(
                f,
                "attribute '{attribute}' has {got} values, expected {expected}"
            ),
            Self::MissingAttribute { attribute } => {
                write!(f, "required attribute '{attribute}' not supplied")
            }
            Self::UnknownAttribute { attribute } => {
                write!(f, "unknown attribute '{attribute}'")
            }
            Self::NonFinite { attribute } => {
                write!(f, "attribute '{attribute}' contains a non-finite value")
            }
            Self::OutOfRange {
                attribute,
                value,
                expected,
            } => write!(
                f,
                "attribute '{attribute}' value {value} out of range (expected {expected})"
            ),
            Self::AlreadyStarted => write!(f, "simulation has already started"),
        }
    }
}

impl Error for SeedError {}

/// Failure raised by a reader while answering a query.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReaderError {
    /// Description of the failure.
    pub reason: String,
}

impl ReaderError {
    /// Construct a reader error from any displayable reason.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl fmt::Display for ReaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "reader failed: {}", self.reason)
    }
}

impl Error for ReaderError {}

/// Errors from environment aggregation.
#[derive(Clone, Debug, PartialEq)]
pub enum EnvError {
    /// No reader covered some query points and the variable has no
    /// fallback value (`MissingEnvironmentData`).
    MissingEnvironmentData {
        /// The variable that could not be supplied.
        variable: String,
        /// Indices (into the query point list) left uncovered.
        points: Vec<usize>,
    },
    /// A reader raised during a query (`ReaderUnavailable`).
    ///
    /// The aggregator recovers from this by treating the reader as not
    /// covering the points; it is surfaced only in diagnostics.
    ReaderUnavailable {
        /// Name of the failing reader.
        reader: String,
        /// The reader's error.
        reason: ReaderError,
    },
}

impl fmt::Display for EnvError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingEnvironmentData { variable, points } => write!(
                f,
                "missing environment data for '{variable}' at {} point(s)",
                points.len()
            ),
            Self::ReaderUnavailable { reader, reason } => {
                write!(f, "reader '{reader}' unavailable: {reason}")
            }
        }
    }
}

impl Error for EnvError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::ReaderUnavailable { reason, .. } => Some(reason),
            _ => None,
        }
    }
}

/// Errors from the vertical mixing integrator.
#[derive(Clone, Debug, PartialEq)]
pub enum MixingError {
    /// An input array does not have one entry per element.
    LengthMismatch {
        /// Name of the offending input.
        input: &'static str,
        /// Expected length (the element count).
        expected: usize,
        /// Supplied length.
        got: usize,
    },
    /// The outer time step is NaN or infinite.
    InvalidTimeStep {
        /// The rejected time step.
        value: f64,
    },
}

impl fmt::Display for MixingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LengthMismatch {
                input,
                expected,
                got,
            } => write!(f, "mixing input '{input}' has {got} entries, expected {expected}"),
            Self::InvalidTimeStep { value } => {
                write!(f, "mixing time step must be finite, got {value}")
            }
        }
    }
}

impl Error for MixingError {}

/// Errors raised by a substance hook during `prepare_step` or `update`.
#[derive(Clone, Debug, PartialEq)]
pub enum HookError {
    /// The hook failed for a reason of its own.
    ExecutionFailed {
        /// Human-readable description of the failure.
        reason: String,
    },
    /// The hook asked for an attribute the schema does not declare.
    UnknownAttribute {
        /// The attribute name or ID that failed to resolve.
        attribute: String,
    },
    /// The hook asked for an environment variable that was not queried.
    VariableNotQueried {
        /// The variable name.
        variable: String,
    },
    /// An environment query issued by the hook failed.
    Environment(EnvError),
    /// The vertical mixing integrator rejected its inputs.
    Mixing(MixingError),
}

impl fmt::Display for HookError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ExecutionFailed { reason } => write!(f, "execution failed: {reason}"),
            Self::UnknownAttribute { attribute } => {
                write!(f, "unknown attribute '{attribute}'")
            }
            Self::VariableNotQueried { variable } => write!(
                f,
                "variable '{variable}' is not in the step's environment snapshot"
            ),
            Self::Environment(e) => write!(f, "environment: {e}"),
            Self::Mixing(e) => write!(f, "vertical mixing: {e}"),
        }
    }
}

impl Error for HookError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Environment(e) => Some(e),
            Self::Mixing(e) => Some(e),
            _ => None,
        }
    }
}

impl From<EnvError> for HookError {
    fn from(e: EnvError) -> Self {
        Self::Environment(e)
    }
}

impl From<MixingError> for HookError {
    fn from(e: MixingError) -> Self {
        Self::Mixing(e)
    }
}

/// Unrecoverable failure of a simulation step.
///
/// Per-element problems (non-finite values, stranding) never produce a
/// `StepError`; they deactivate the affected elements instead.
#[derive(Clone, Debug, PartialEq)]
pub enum StepError {
    /// A required variable had no reader and no fallback, and the run is
    /// configured to stop on error.
    MissingEnvironmentData(EnvError),
    /// A substance hook returned an error.
    HookFailed {
        /// Name of the substance.
        substance: String,
        /// The underlying hook error.
        reason: HookError,
    },
}

impl fmt::Display for StepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingEnvironmentData(e) => write!(f, "{e}"),
            Self::HookFailed { substance, reason } => {
                write!(f, "substance '{substance}' failed: {reason}")
            }
        }
    }
}

impl Error for StepError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::MissingEnvironmentData(e) => Some(e),
            Self::HookFailed { reason, .. } => Some(reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_error_mentions_category() {
        let e = SeedError::LengthMismatch {
            attribute: "lon".into(),
            expected: 10,
            got: 3,
        };
        let msg = e.to_string();
        assert!(msg.starts_with("invalid seeding parameters"));
        assert!(msg.contains("lon"));
    }

    #[test]
    fn missing_env_names_variable() {
        let e = EnvError::MissingEnvironmentData {
            variable: "x_wind".into(),
            points: vec![0, 4],
        };
        assert!(e.to_string().contains("x_wind"));
        assert!(e.to_string().contains("2 point"));
    }

    #[test]
    fn step_error_chains_source() {
        let e = StepError::HookFailed {
            substance: "oil".into(),
            reason: HookError::Mixing(MixingError::InvalidTimeStep { value: f64::NAN }),
        };
        let source = e.source().unwrap();
        assert!(source.to_string().contains("vertical mixing"));
        assert!(source.source().is_some());
    }
}
