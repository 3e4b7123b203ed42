//! The simulation clock.

use drift_core::StepId;

use crate::config::ConfigError;

/// Fixed-step clock over model time in seconds.
///
/// Step `k` is at `start + k·dt`. Times are computed from the step
/// count rather than accumulated, so long runs do not drift.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimulationClock {
    start: f64,
    dt: f64,
    step: StepId,
}

impl SimulationClock {
    /// A clock at `start` (step 0) advancing by `dt`.
    pub fn new(start: f64, dt: f64) -> Self {
        Self {
            start,
            dt,
            step: StepId(0),
        }
    }

    /// Move to the next step and return its time.
    pub fn advance(&mut self) -> f64 {
        self.step = self.step.next();
        self.time()
    }

    /// Current step; 0 before the first [`advance`](Self::advance).
    pub fn step(&self) -> StepId {
        self.step
    }

    /// Time of the current step.
    pub fn time(&self) -> f64 {
        self.time_at(self.step)
    }

    /// Time of an arbitrary step.
    pub fn time_at(&self, step: StepId) -> f64 {
        self.start + step.0 as f64 * self.dt
    }

    /// Start time (step 0).
    pub fn start(&self) -> f64 {
        self.start
    }

    /// Signed time step.
    pub fn dt(&self) -> f64 {
        self.dt
    }

    /// Whether time runs backward.
    pub fn is_backward(&self) -> bool {
        self.dt < 0.0
    }
}

/// Number of steps of `dt` needed to get from `start` to `end`.
///
/// A remainder smaller than one step adds a final step, so the run
/// covers `end`. Differences within 1e-9 steps of a whole number are
/// treated as exact.
///
/// # Errors
///
/// Returns [`ConfigError::EndTimeBehindStart`] if `end` is not strictly
/// ahead of `start` in the direction of `dt`.
pub fn steps_until(start: f64, end: f64, dt: f64) -> Result<u64, ConfigError> {
    let span = (end - start) / dt;
    if !span.is_finite() || span <= 0.0 {
        return Err(ConfigError::EndTimeBehindStart {
            start,
            end,
            time_step: dt,
        });
    }
    Ok((span - 1e-9).ceil().max(1.0) as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_times_are_exact_multiples() {
        let mut c = SimulationClock::new(1000.0, 0.1);
        for _ in 0..1_000_000 {
            c.advance();
        }
        assert_eq!(c.step(), StepId(1_000_000));
        assert_eq!(c.time(), 1000.0 + 1_000_000.0 * 0.1);
    }

    #[test]
    fn backward_clock() {
        let mut c = SimulationClock::new(7200.0, -3600.0);
        assert!(c.is_backward());
        assert_eq!(c.time(), 7200.0);
        assert_eq!(c.advance(), 3600.0);
        assert_eq!(c.advance(), 0.0);
        assert_eq!(c.time_at(StepId(5)), -10_800.0);
    }

    #[test]
    fn steps_until_rounds_up_partial_steps() {
        assert_eq!(steps_until(0.0, 86_400.0, 3600.0), Ok(24));
        assert_eq!(steps_until(0.0, 86_401.0, 3600.0), Ok(25));
        assert_eq!(steps_until(0.0, 0.3, 0.1), Ok(3));
        assert_eq!(steps_until(7200.0, 0.0, -3600.0), Ok(2));
    }

    #[test]
    fn steps_until_rejects_wrong_direction() {
        assert!(steps_until(0.0, 0.0, 60.0).is_err());
        assert!(steps_until(0.0, -60.0, 60.0).is_err());
        assert!(steps_until(0.0, 60.0, -60.0).is_err());
    }
}
