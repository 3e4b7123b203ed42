//! Execution context passed to substance hooks during a step.

use rand_chacha::ChaCha8Rng;

use drift_core::variables as var;
use drift_core::{AttrId, DeactivationReason, ElementSchema, HookError, StepId};
use drift_env::{Environment, EnvironmentSnapshot};
use drift_mixing::{MixingReport, SurfaceHook, VerticalMixer};
use drift_pool::ActiveState;

use crate::advection::{self, AdvectionScheme};

/// Execution context passed to [`Substance`](crate::Substance) hooks.
///
/// Rows of the [`ActiveState`] and of the environment snapshot line up:
/// row `i` is the `i`-th active element in ascending slot order. Hooks
/// mutate the state freely; the engine keeps the changes only if the
/// step succeeds. Deactivations requested through
/// [`deactivate`](Self::deactivate) are applied by the engine after the
/// hook returns.
pub struct StepContext<'a> {
    state: &'a mut ActiveState,
    env: &'a EnvironmentSnapshot,
    environment: Environment<'a>,
    mixer: &'a VerticalMixer,
    rng: &'a mut ChaCha8Rng,
    schema: &'a ElementSchema,
    scheme: AdvectionScheme,
    step: StepId,
    time: f64,
    dt: f64,
    deactivations: Vec<(usize, DeactivationReason)>,
    mixing: MixingReport,
}

impl<'a> StepContext<'a> {
    /// Construct a step context.
    ///
    /// Typically called by the engine, not by substances directly.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        state: &'a mut ActiveState,
        env: &'a EnvironmentSnapshot,
        environment: Environment<'a>,
        mixer: &'a VerticalMixer,
        rng: &'a mut ChaCha8Rng,
        schema: &'a ElementSchema,
        scheme: AdvectionScheme,
        step: StepId,
        time: f64,
        dt: f64,
    ) -> Self {
        Self {
            state,
            env,
            environment,
            mixer,
            rng,
            schema,
            scheme,
            step,
            time,
            dt,
            deactivations: Vec::new(),
            mixing: MixingReport::default(),
        }
    }

    // ── Step metadata ───────────────────────────────────────────

    /// Current step number.
    pub fn step(&self) -> StepId {
        self.step
    }

    /// Simulation time at the start of the physics update.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Signed time step in seconds.
    pub fn dt(&self) -> f64 {
        self.dt
    }

    /// Number of active elements.
    pub fn len(&self) -> usize {
        self.state.len()
    }

    /// Whether there are no active elements.
    pub fn is_empty(&self) -> bool {
        self.state.is_empty()
    }

    // ── State access ────────────────────────────────────────────

    /// The active elements.
    pub fn state(&self) -> &ActiveState {
        &*self.state
    }

    /// Mutable access to the active elements.
    pub fn state_mut(&mut self) -> &mut ActiveState {
        &mut *self.state
    }

    /// The substance's attribute schema.
    pub fn schema(&self) -> &ElementSchema {
        self.schema
    }

    /// Resolve an attribute name.
    ///
    /// # Errors
    ///
    /// Returns [`HookError::UnknownAttribute`] if the schema lacks it.
    pub fn attr_id(&self, name: &str) -> Result<AttrId, HookError> {
        self.schema
            .id(name)
            .ok_or_else(|| HookError::UnknownAttribute {
                attribute: name.to_string(),
            })
    }

    /// Values of attribute `name` for the active elements.
    ///
    /// # Errors
    ///
    /// Returns [`HookError::UnknownAttribute`] if the schema lacks it.
    pub fn attr(&self, name: &str) -> Result<&[f64], HookError> {
        let id = self.attr_id(name)?;
        self.state.attr(id).ok_or_else(|| HookError::UnknownAttribute {
            attribute: name.to_string(),
        })
    }

    /// Mutable values of attribute `name` for the active elements.
    ///
    /// # Errors
    ///
    /// Returns [`HookError::UnknownAttribute`] if the schema lacks it.
    pub fn attr_mut(&mut self, name: &str) -> Result<&mut [f64], HookError> {
        let id = self.attr_id(name)?;
        self.state.attr_mut(id).ok_or_else(|| HookError::UnknownAttribute {
            attribute: name.to_string(),
        })
    }

    // ── Environment ─────────────────────────────────────────────

    /// The environment sampled at the active positions this step.
    pub fn env(&self) -> &'a EnvironmentSnapshot {
        self.env
    }

    /// Per-element values of an environment variable.
    ///
    /// # Errors
    ///
    /// Returns [`HookError::VariableNotQueried`] if the variable is not
    /// in the snapshot.
    pub fn var(&self, name: &str) -> Result<&'a [f64], HookError> {
        self.env.require(name)
    }

    /// The aggregator, for additional queries (e.g. at midpoints).
    pub fn environment(&self) -> Environment<'a> {
        self.environment
    }

    /// The step's random number generator.
    pub fn rng(&mut self) -> &mut ChaCha8Rng {
        &mut *self.rng
    }

    // ── Advection ───────────────────────────────────────────────

    /// Move every element by `(u, v)·dt` (forward Euler).
    ///
    /// # Errors
    ///
    /// Returns [`HookError::ExecutionFailed`] if `u` or `v` does not
    /// have one entry per element.
    pub fn advect(&mut self, u: &[f64], v: &[f64]) -> Result<(), HookError> {
        self.check_len("u", u.len())?;
        self.check_len("v", v.len())?;
        advection::displace(&mut self.state.lon, &mut self.state.lat, u, v, self.dt);
        Ok(())
    }

    /// Advect with the ocean current using the configured scheme.
    ///
    /// With [`AdvectionScheme::RungeKutta2`] the current is re-sampled at
    /// the Euler midpoint, half a step later; elements whose midpoint
    /// has no data keep the start-point velocity.
    ///
    /// # Errors
    ///
    /// Returns [`HookError::VariableNotQueried`] if the current was not
    /// in the snapshot.
    pub fn advect_ocean_current(&mut self) -> Result<(), HookError> {
        let u = self.var(var::X_SEA_WATER_VELOCITY)?;
        let v = self.var(var::Y_SEA_WATER_VELOCITY)?;
        match self.scheme {
            AdvectionScheme::Euler => self.advect(u, v),
            AdvectionScheme::RungeKutta2 => {
                let s = &*self.state;
                let mid = advection::midpoints(&s.lon, &s.lat, &s.z, u, v, self.dt);
                let outcome = self.environment.query(
                    &[var::X_SEA_WATER_VELOCITY, var::Y_SEA_WATER_VELOCITY],
                    &[],
                    &mid,
                    self.time + 0.5 * self.dt,
                    &[],
                );
                let um = outcome.snapshot.require(var::X_SEA_WATER_VELOCITY)?;
                let vm = outcome.snapshot.require(var::Y_SEA_WATER_VELOCITY)?;
                let (mut ru, mut rv) = (Vec::with_capacity(u.len()), Vec::with_capacity(v.len()));
                for i in 0..u.len() {
                    if um[i].is_finite() && vm[i].is_finite() {
                        ru.push(um[i]);
                        rv.push(vm[i]);
                    } else {
                        ru.push(u[i]);
                        rv.push(v[i]);
                    }
                }
                self.advect(&ru, &rv)
            }
        }
    }

    /// Advect with the 10 m wind scaled by each element's drift factor.
    ///
    /// # Errors
    ///
    /// Returns an error if the wind was not queried or `factor` does
    /// not have one entry per element.
    pub fn advect_wind(&mut self, factor: &[f64]) -> Result<(), HookError> {
        self.check_len("wind_drift_factor", factor.len())?;
        let wx = self.var(var::X_WIND)?;
        let wy = self.var(var::Y_WIND)?;
        let u: Vec<f64> = wx.iter().zip(factor).map(|(w, f)| w * f).collect();
        let v: Vec<f64> = wy.iter().zip(factor).map(|(w, f)| w * f).collect();
        self.advect(&u, &v)
    }

    /// Advect with the wave-induced Stokes drift.
    ///
    /// # Errors
    ///
    /// Returns [`HookError::VariableNotQueried`] if the Stokes drift was
    /// not queried.
    pub fn advect_stokes_drift(&mut self) -> Result<(), HookError> {
        let u = self.var(var::SEA_SURFACE_WAVE_STOKES_DRIFT_X_VELOCITY)?;
        let v = self.var(var::SEA_SURFACE_WAVE_STOKES_DRIFT_Y_VELOCITY)?;
        self.advect(u, v)
    }

    /// Move depths with the upward ocean velocity, clamped to the water
    /// column.
    ///
    /// # Errors
    ///
    /// Returns [`HookError::VariableNotQueried`] if the vertical
    /// velocity or sea floor depth was not queried.
    pub fn advect_vertical(&mut self) -> Result<(), HookError> {
        let w = self.var(var::UPWARD_SEA_WATER_VELOCITY)?;
        let floor = self.var(var::SEA_FLOOR_DEPTH_BELOW_SEA_LEVEL)?;
        advection::vertical(&mut self.state.z, w, floor, self.dt);
        Ok(())
    }

    // ── Vertical mixing ─────────────────────────────────────────

    /// Run the vertical mixing integrator over this step.
    ///
    /// Uses the `ocean_vertical_diffusivity` profile and the sea floor
    /// depth from the snapshot. `terminal_velocity` is positive upward.
    ///
    /// # Errors
    ///
    /// Returns an error if either variable was not queried or the
    /// integrator rejects its inputs.
    pub fn mix_vertically(
        &mut self,
        terminal_velocity: &[f64],
        hook: &mut dyn SurfaceHook,
    ) -> Result<MixingReport, HookError> {
        let k = self.env.require_profile(var::OCEAN_VERTICAL_DIFFUSIVITY)?;
        let floor: Vec<f64> = self
            .var(var::SEA_FLOOR_DEPTH_BELOW_SEA_LEVEL)?
            .iter()
            .map(|d| -d)
            .collect();
        let report = self.mixer.mix(
            &mut self.state.z,
            self.dt,
            k,
            terminal_velocity,
            &floor,
            hook,
            &mut *self.rng,
        )?;
        self.mixing.substeps += report.substeps;
        self.mixing.substep_seconds = report.substep_seconds;
        self.mixing.capped |= report.capped;
        self.mixing.surface_hits += report.surface_hits;
        self.mixing.entrained += report.entrained;
        Ok(report)
    }

    /// The mixing integrator, e.g. for its vertical resolution.
    pub fn mixer(&self) -> &VerticalMixer {
        self.mixer
    }

    /// Accumulated mixing statistics for this step.
    pub fn mixing_report(&self) -> &MixingReport {
        &self.mixing
    }

    // ── Deactivation ────────────────────────────────────────────

    /// Request deactivation of the given rows. Applied by the engine
    /// after the hook returns; the first reason recorded for a row wins.
    pub fn deactivate(&mut self, rows: &[usize], reason: DeactivationReason) {
        let n = self.state.len();
        self.deactivations
            .extend(rows.iter().filter(|&&r| r < n).map(|&r| (r, reason)));
    }

    /// Deactivations requested so far, in request order.
    pub fn deactivations(&self) -> &[(usize, DeactivationReason)] {
        &self.deactivations
    }

    /// Consume the context, returning the requested deactivations and
    /// the accumulated mixing statistics.
    pub fn finish(self) -> (Vec<(usize, DeactivationReason)>, MixingReport) {
        (self.deactivations, self.mixing)
    }

    fn check_len(&self, input: &str, got: usize) -> Result<(), HookError> {
        if got == self.state.len() {
            Ok(())
        } else {
            Err(HookError::ExecutionFailed {
                reason: format!(
                    "'{input}' has {got} entries, expected {}",
                    self.state.len()
                ),
            })
        }
    }
}
