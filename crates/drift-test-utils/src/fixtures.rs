//! Reusable substance test fixtures.
//!
//! - [`StillSubstance`]: never moves anything.
//! - [`DrifterSubstance`]: follows the ocean current.
//! - [`ConstantVelocitySubstance`]: moves at a fixed velocity without
//!   querying the environment.
//! - [`SinkingSubstance`]: sinks at a fixed terminal velocity through
//!   the mixing integrator.
//! - [`NanSubstance`]: corrupts one element's depth at a given step.
//! - [`FailingSubstance`]: moves everything, then fails after N calls.

use std::sync::atomic::{AtomicUsize, Ordering};

use drift_core::variables as var;
use drift_core::{AttributeDef, ElementSchema, HookError, StepId};
use drift_mixing::Resurface;
use drift_substance::{StepContext, Substance};

/// Does nothing and queries nothing.
#[derive(Default)]
pub struct StillSubstance {
    schema: ElementSchema,
}

impl StillSubstance {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Substance for StillSubstance {
    fn name(&self) -> &str {
        "still"
    }

    fn schema(&self) -> &ElementSchema {
        &self.schema
    }

    fn required_variables(&self) -> Vec<&str> {
        Vec::new()
    }

    fn update(&self, _ctx: &mut StepContext<'_>) -> Result<(), HookError> {
        Ok(())
    }
}

/// Drifts with the ocean current. Carries an `age_seconds` attribute
/// incremented by `|dt|` every step.
pub struct DrifterSubstance {
    schema: ElementSchema,
}

impl DrifterSubstance {
    pub fn new() -> Self {
        Self {
            schema: ElementSchema::new(vec![AttributeDef::with_default("age_seconds", "s", 0.0)])
                .unwrap(),
        }
    }
}

impl Default for DrifterSubstance {
    fn default() -> Self {
        Self::new()
    }
}

impl Substance for DrifterSubstance {
    fn name(&self) -> &str {
        "drifter"
    }

    fn schema(&self) -> &ElementSchema {
        &self.schema
    }

    fn required_variables(&self) -> Vec<&str> {
        vec![var::X_SEA_WATER_VELOCITY, var::Y_SEA_WATER_VELOCITY]
    }

    fn update(&self, ctx: &mut StepContext<'_>) -> Result<(), HookError> {
        ctx.advect_ocean_current()?;
        let dt = ctx.dt().abs();
        for age in ctx.attr_mut("age_seconds")? {
            *age += dt;
        }
        Ok(())
    }
}

/// Moves every element at `(u, v)` m/s regardless of the environment.
pub struct ConstantVelocitySubstance {
    pub u: f64,
    pub v: f64,
    schema: ElementSchema,
}

impl ConstantVelocitySubstance {
    pub fn new(u: f64, v: f64) -> Self {
        Self {
            u,
            v,
            schema: ElementSchema::default(),
        }
    }
}

impl Substance for ConstantVelocitySubstance {
    fn name(&self) -> &str {
        "constant_velocity"
    }

    fn schema(&self) -> &ElementSchema {
        &self.schema
    }

    fn required_variables(&self) -> Vec<&str> {
        Vec::new()
    }

    fn update(&self, ctx: &mut StepContext<'_>) -> Result<(), HookError> {
        let n = ctx.len();
        ctx.advect(&vec![self.u; n], &vec![self.v; n])
    }
}

/// Sinks at `terminal_velocity` (negative, m/s) via the mixing
/// integrator, resurfacing anything that reaches the top.
pub struct SinkingSubstance {
    pub terminal_velocity: f64,
    /// Per-row velocities that replace `terminal_velocity` for the
    /// first active rows.
    pub overrides: Vec<f64>,
    schema: ElementSchema,
}

impl SinkingSubstance {
    pub fn new(terminal_velocity: f64) -> Self {
        Self {
            terminal_velocity,
            overrides: Vec::new(),
            schema: ElementSchema::default(),
        }
    }

    /// Like [`new`](Self::new), with `overrides[i]` used for row `i`.
    pub fn with_overrides(terminal_velocity: f64, overrides: Vec<f64>) -> Self {
        Self {
            overrides,
            ..Self::new(terminal_velocity)
        }
    }
}

impl Substance for SinkingSubstance {
    fn name(&self) -> &str {
        "sinking"
    }

    fn schema(&self) -> &ElementSchema {
        &self.schema
    }

    fn required_variables(&self) -> Vec<&str> {
        vec![var::SEA_FLOOR_DEPTH_BELOW_SEA_LEVEL]
    }

    fn required_profiles(&self) -> Vec<&str> {
        vec![var::OCEAN_VERTICAL_DIFFUSIVITY]
    }

    fn update(&self, ctx: &mut StepContext<'_>) -> Result<(), HookError> {
        let w: Vec<f64> = (0..ctx.len())
            .map(|i| self.overrides.get(i).copied().unwrap_or(self.terminal_velocity))
            .collect();
        ctx.mix_vertically(&w, &mut Resurface)?;
        Ok(())
    }
}

/// Sets the first active element's depth to NaN at step `at_step`.
pub struct NanSubstance {
    pub at_step: StepId,
    schema: ElementSchema,
}

impl NanSubstance {
    pub fn new(at_step: u64) -> Self {
        Self {
            at_step: StepId(at_step),
            schema: ElementSchema::default(),
        }
    }
}

impl Substance for NanSubstance {
    fn name(&self) -> &str {
        "nan"
    }

    fn schema(&self) -> &ElementSchema {
        &self.schema
    }

    fn required_variables(&self) -> Vec<&str> {
        Vec::new()
    }

    fn update(&self, ctx: &mut StepContext<'_>) -> Result<(), HookError> {
        if ctx.step() == self.at_step && !ctx.is_empty() {
            ctx.state_mut().z[0] = f64::NAN;
        }
        Ok(())
    }
}

/// Moves every element one degree east, then fails once it has
/// succeeded `succeed_count` times.
///
/// The move happens before the failure, so tests can check that a
/// failed step leaves no trace in the pool.
pub struct FailingSubstance {
    succeed_count: usize,
    call_count: AtomicUsize,
    schema: ElementSchema,
}

impl FailingSubstance {
    pub fn new(succeed_count: usize) -> Self {
        Self {
            succeed_count,
            call_count: AtomicUsize::new(0),
            schema: ElementSchema::default(),
        }
    }

    /// Number of `update` calls so far.
    pub fn calls(&self) -> usize {
        self.call_count.load(Ordering::Relaxed)
    }
}

impl Substance for FailingSubstance {
    fn name(&self) -> &str {
        "failing"
    }

    fn schema(&self) -> &ElementSchema {
        &self.schema
    }

    fn required_variables(&self) -> Vec<&str> {
        Vec::new()
    }

    fn update(&self, ctx: &mut StepContext<'_>) -> Result<(), HookError> {
        for lon in ctx.state_mut().lon.iter_mut() {
            *lon += 1.0;
        }
        let n = self.call_count.fetch_add(1, Ordering::Relaxed);
        if n >= self.succeed_count {
            return Err(HookError::ExecutionFailed {
                reason: format!("failed after {} successful calls", self.succeed_count),
            });
        }
        Ok(())
    }
}
