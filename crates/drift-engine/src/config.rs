//! Engine and run configuration, validation, and error types.
//!
//! [`EngineConfig`] is fixed when the [`Engine`](crate::Engine) is
//! built and shared by reference with every component. [`RunConfig`]
//! describes one call to [`Engine::run`](crate::Engine::run). Both are
//! validated before the first step executes.

use std::error::Error;
use std::fmt;

use drift_core::BoundingBox;
use drift_env::{FallbackTable, RegistryError};
use drift_mixing::MixingConfig;
use drift_substance::AdvectionScheme;

use crate::engine::EngineState;

// ── CoastlineAction ────────────────────────────────────────────────

/// What happens to an element whose updated position is on land.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CoastlineAction {
    /// Deactivate with `StrandedOnLand`.
    #[default]
    Stranding,
    /// Move back to the horizontal position held at the start of the
    /// step and stay active.
    Previous,
}

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected before any step executes.
#[derive(Debug, PartialEq)]
pub enum ConfigError {
    /// The time step is zero, NaN or infinite.
    InvalidTimeStep {
        /// The invalid value.
        value: f64,
    },
    /// The output interval is zero.
    ZeroOutputInterval,
    /// A run of zero steps was requested.
    EmptyRun,
    /// The end time is NaN or infinite.
    InvalidEndTime {
        /// The invalid value.
        value: f64,
    },
    /// The end time does not lie ahead of the start time in the
    /// direction of the time step.
    EndTimeBehindStart {
        /// Start of the run (earliest or latest release time).
        start: f64,
        /// Requested end time.
        end: f64,
        /// Signed time step.
        time_step: f64,
    },
    /// The simulation domain is malformed.
    InvalidDomain {
        /// Description of the problem.
        reason: String,
    },
    /// A fallback value is not finite.
    InvalidFallback {
        /// Variable whose fallback is invalid.
        variable: String,
        /// The invalid value.
        value: f64,
    },
    /// The mixing configuration is invalid.
    InvalidMixing {
        /// Description of which invariant was violated.
        reason: String,
    },
    /// The profile depth range is malformed.
    InvalidProfileRange {
        /// Lower end of the range.
        bottom: f64,
        /// Upper end of the range.
        top: f64,
    },
    /// Reader registration failed.
    Registry(RegistryError),
    /// Readers can only be registered before the run starts.
    RegistrationAfterStart,
    /// No element has been seeded.
    NothingSeeded,
    /// The engine is not in [`EngineState::NotStarted`].
    AlreadyStarted {
        /// The engine's current state.
        state: EngineState,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidTimeStep { value } => {
                write!(f, "time_step must be finite and non-zero, got {value}")
            }
            Self::ZeroOutputInterval => write!(f, "output_interval must be at least 1"),
            Self::EmptyRun => write!(f, "run length must be at least one step"),
            Self::InvalidEndTime { value } => {
                write!(f, "end time must be finite, got {value}")
            }
            Self::EndTimeBehindStart {
                start,
                end,
                time_step,
            } => write!(
                f,
                "end time {end} is not reachable from start {start} with time_step {time_step}"
            ),
            Self::InvalidDomain { reason } => write!(f, "invalid domain: {reason}"),
            Self::InvalidFallback { variable, value } => {
                write!(f, "fallback for '{variable}' must be finite, got {value}")
            }
            Self::InvalidMixing { reason } => write!(f, "invalid mixing config: {reason}"),
            Self::InvalidProfileRange { bottom, top } => write!(
                f,
                "profile range must satisfy bottom < top <= 0, got ({bottom}, {top})"
            ),
            Self::Registry(e) => write!(f, "registry: {e}"),
            Self::RegistrationAfterStart => {
                write!(f, "readers cannot be registered after the run has started")
            }
            Self::NothingSeeded => write!(f, "no elements have been seeded"),
            Self::AlreadyStarted { state } => {
                write!(f, "engine cannot start a run in state {state}")
            }
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Registry(e) => Some(e),
            _ => None,
        }
    }
}

impl From<RegistryError> for ConfigError {
    fn from(e: RegistryError) -> Self {
        Self::Registry(e)
    }
}

// ── EngineConfig ───────────────────────────────────────────────────

/// Configuration fixed for the life of an [`Engine`](crate::Engine).
#[derive(Clone, Debug)]
pub struct EngineConfig {
    /// Vertical mixing parameters. Its `vertical_resolution` also spaces
    /// the profile depth levels.
    pub mixing: MixingConfig,
    /// Horizontal advection scheme. Default: Euler.
    pub advection: AdvectionScheme,
    /// Handling of elements that reach land. Default: stranding.
    pub coastline: CoastlineAction,
    /// Constants for variables no reader covers.
    /// Default: [`FallbackTable::ocean_defaults`].
    pub fallbacks: FallbackTable,
    /// Elements leaving this box are deactivated. `None` means no
    /// domain check.
    pub domain: Option<BoundingBox>,
    /// Vertical range `(bottom, top)` of profile queries. `None` uses
    /// the substance's own range.
    pub profile_z_range: Option<(f64, f64)>,
    /// RNG seed for seeding scatter and stochastic processes.
    pub seed: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            mixing: MixingConfig::default(),
            advection: AdvectionScheme::Euler,
            coastline: CoastlineAction::Stranding,
            fallbacks: FallbackTable::ocean_defaults(),
            domain: None,
            profile_z_range: None,
            seed: 0,
        }
    }
}

impl EngineConfig {
    /// Validate all structural invariants.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.mixing
            .validate()
            .map_err(|reason| ConfigError::InvalidMixing { reason })?;
        if let Some(domain) = &self.domain {
            domain
                .validate()
                .map_err(|reason| ConfigError::InvalidDomain { reason })?;
        }
        self.fallbacks
            .validate()
            .map_err(|(variable, value)| ConfigError::InvalidFallback { variable, value })?;
        if let Some((bottom, top)) = self.profile_z_range {
            validate_profile_range(bottom, top)?;
        }
        Ok(())
    }
}

/// Check that `bottom < top <= 0` with both finite.
pub(crate) fn validate_profile_range(bottom: f64, top: f64) -> Result<(), ConfigError> {
    if !bottom.is_finite() || !top.is_finite() || bottom >= top || top > 0.0 {
        return Err(ConfigError::InvalidProfileRange { bottom, top });
    }
    Ok(())
}

// ── RunConfig ──────────────────────────────────────────────────────

/// How long a run lasts.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RunLength {
    /// A fixed number of steps.
    Steps(u64),
    /// Until the clock reaches this time (seconds). The last step may
    /// overshoot it by less than one time step.
    EndTime(f64),
}

/// Parameters of one run.
#[derive(Clone, Debug, PartialEq)]
pub struct RunConfig {
    /// Run length.
    pub length: RunLength,
    /// Signed time step in seconds; negative runs backward in time.
    pub time_step: f64,
    /// Record output every this many steps. Default: 1.
    pub output_interval: u64,
    /// Abort on missing environment data instead of deactivating the
    /// affected elements. Default: false.
    pub stop_on_error: bool,
}

impl RunConfig {
    /// A run of `steps` steps of `time_step` seconds.
    pub fn steps(steps: u64, time_step: f64) -> Self {
        Self {
            length: RunLength::Steps(steps),
            time_step,
            output_interval: 1,
            stop_on_error: false,
        }
    }

    /// A run until `end_time` in steps of `time_step` seconds.
    pub fn until(end_time: f64, time_step: f64) -> Self {
        Self {
            length: RunLength::EndTime(end_time),
            ..Self::steps(1, time_step)
        }
    }

    /// Set the output interval.
    pub fn output_interval(mut self, every: u64) -> Self {
        self.output_interval = every;
        self
    }

    /// Set the missing-data policy.
    pub fn stop_on_error(mut self, stop: bool) -> Self {
        self.stop_on_error = stop;
        self
    }

    /// Validate the run parameters that do not depend on the seeded
    /// elements.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.time_step.is_finite() || self.time_step == 0.0 {
            return Err(ConfigError::InvalidTimeStep {
                value: self.time_step,
            });
        }
        if self.output_interval == 0 {
            return Err(ConfigError::ZeroOutputInterval);
        }
        match self.length {
            RunLength::Steps(0) => Err(ConfigError::EmptyRun),
            RunLength::EndTime(end) if !end.is_finite() => {
                Err(ConfigError::InvalidEndTime { value: end })
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use drift_core::variables as var;

    #[test]
    fn default_engine_config_is_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn engine_config_rejects_bad_parts() {
        let mut cfg = EngineConfig::default();
        cfg.mixing.vertical_resolution = 0.0;
        assert!(matches!(cfg.validate(), Err(ConfigError::InvalidMixing { .. })));

        let cfg = EngineConfig {
            domain: Some(BoundingBox::new(10.0, 0.0, 50.0, 60.0)),
            ..EngineConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(ConfigError::InvalidDomain { .. })));

        let cfg = EngineConfig {
            fallbacks: FallbackTable::ocean_defaults().with(var::X_WIND, f64::NAN),
            ..EngineConfig::default()
        };
        match cfg.validate() {
            Err(ConfigError::InvalidFallback { variable, value }) => {
                assert_eq!(variable, var::X_WIND);
                assert!(value.is_nan());
            }
            other => panic!("expected InvalidFallback, got {other:?}"),
        }

        let cfg = EngineConfig {
            profile_z_range: Some((0.0, -50.0)),
            ..EngineConfig::default()
        };
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::InvalidProfileRange {
                bottom: 0.0,
                top: -50.0
            })
        );
    }

    #[test]
    fn run_config_validation() {
        assert!(RunConfig::steps(10, 3600.0).validate().is_ok());
        assert!(RunConfig::steps(10, -3600.0).validate().is_ok());
        assert_eq!(
            RunConfig::steps(10, 0.0).validate(),
            Err(ConfigError::InvalidTimeStep { value: 0.0 })
        );
        assert!(matches!(
            RunConfig::steps(10, f64::NAN).validate(),
            Err(ConfigError::InvalidTimeStep { .. })
        ));
        assert_eq!(
            RunConfig::steps(0, 60.0).validate(),
            Err(ConfigError::EmptyRun)
        );
        assert_eq!(
            RunConfig::steps(1, 60.0).output_interval(0).validate(),
            Err(ConfigError::ZeroOutputInterval)
        );
        assert!(matches!(
            RunConfig::until(f64::INFINITY, 60.0).validate(),
            Err(ConfigError::InvalidEndTime { .. })
        ));
    }

    #[test]
    fn registry_errors_chain() {
        let e = ConfigError::from(RegistryError::DuplicatePriority {
            priority: 1,
            existing: "a".into(),
            reader: "b".into(),
        });
        assert!(e.source().is_some());
        assert!(e.to_string().starts_with("registry: "));
    }
}
