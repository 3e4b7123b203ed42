//! The simulation engine: state machine and time loop.
//!
//! [`Engine`] owns every piece of mutable simulation state: the element
//! pool, the reader registry, the seeding RNG and the output history.
//! Each step runs the same fixed sequence; a step either completes and
//! is written back to the pool, or fails and leaves the pool as it was
//! after release.

use std::fmt;
use std::time::Instant;

use indexmap::IndexMap;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use drift_core::variables::SEA_FLOOR_DEPTH_BELOW_SEA_LEVEL;
use drift_core::{
    DeactivationReason, ElementId, HookError, Point, ProfileField, SeedError, Slot, StepError,
    StepId,
};
use drift_env::{Environment, EnvironmentSnapshot, Reader, ReaderRegistry};
use drift_mixing::VerticalMixer;
use drift_pool::{ActiveState, AttrValue, ElementPool};
use drift_substance::{SeedContext, StepContext, Substance};

use crate::boundary;
use crate::clock::{self, SimulationClock};
use crate::config::{self, CoastlineAction, ConfigError, EngineConfig, RunConfig, RunLength};
use crate::metrics::StepMetrics;
use crate::output::{OutputHistory, OutputRecord};
use crate::seeding::{SeedDepth, SeedRequest};

// ── EngineState ────────────────────────────────────────────────────

/// Lifecycle of an [`Engine`].
///
/// `NotStarted → Running` when a run starts; `Running → Finished` when
/// the requested length is reached or nothing is left to simulate;
/// `Running → Failed` on an unrecoverable step error. `Finished` and
/// `Failed` are terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EngineState {
    /// Accepting readers and seed requests.
    NotStarted,
    /// A run is in progress.
    Running,
    /// The run completed.
    Finished,
    /// The run stopped on an error.
    Failed,
}

impl fmt::Display for EngineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotStarted => write!(f, "not-started"),
            Self::Running => write!(f, "running"),
            Self::Finished => write!(f, "finished"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

// ── RunSummary ─────────────────────────────────────────────────────

/// Final status of a run.
#[derive(Clone, Debug, PartialEq)]
pub struct RunSummary {
    /// State the engine ended in.
    pub state: EngineState,
    /// Steps that completed successfully.
    pub steps_completed: u64,
    /// Model time after the last completed step.
    pub time: f64,
    /// Elements still waiting for release.
    pub num_scheduled: usize,
    /// Elements active at the end.
    pub num_active: usize,
    /// Elements deactivated during seeding or the run.
    pub num_deactivated: usize,
    /// Deactivated elements per reason. Every reason is listed, in
    /// [`DeactivationReason::ALL`] order, with 0 if it never occurred.
    pub deactivations: IndexMap<DeactivationReason, usize>,
    /// The error that failed the run, if any.
    pub error: Option<StepError>,
}

// ── Engine ─────────────────────────────────────────────────────────

struct ActiveRun {
    config: RunConfig,
    clock: SimulationClock,
    total_steps: u64,
}

/// Single-threaded particle-tracking engine for one substance.
///
/// # Example
///
/// ```
/// use drift_engine::{Engine, EngineConfig, EngineState, RunConfig, SeedRequest};
/// use drift_test_utils::fixtures::ConstantVelocitySubstance;
///
/// let mut engine = Engine::new(
///     EngineConfig::default(),
///     Box::new(ConstantVelocitySubstance::new(0.0, 1.0)),
/// )
/// .unwrap();
/// engine.seed(SeedRequest::new(4.0, 60.0, 0.0, 1)).unwrap();
/// engine.start(RunConfig::steps(2, 3600.0)).unwrap();
/// assert_eq!(engine.step(), EngineState::Running);
/// assert_eq!(engine.step(), EngineState::Finished);
/// assert_eq!(engine.time(), 7200.0);
/// ```
pub struct Engine {
    config: EngineConfig,
    substance: Box<dyn Substance>,
    registry: ReaderRegistry,
    pool: ElementPool,
    mixer: VerticalMixer,
    variables: Vec<String>,
    profiles: Vec<String>,
    depths: Vec<f64>,
    seed_rng: ChaCha8Rng,
    seafloor: Vec<Slot>,
    state: EngineState,
    run: Option<ActiveRun>,
    steps_completed: u64,
    history: OutputHistory,
    last_metrics: StepMetrics,
    error: Option<StepError>,
}

impl Engine {
    /// Build an engine for `substance`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `config` is invalid or the substance
    /// declares a malformed profile range.
    pub fn new(config: EngineConfig, substance: Box<dyn Substance>) -> Result<Self, ConfigError> {
        config.validate()?;
        let (bottom, top) = config
            .profile_z_range
            .unwrap_or_else(|| substance.profile_z_range());
        let profiles: Vec<String> = substance
            .required_profiles()
            .into_iter()
            .map(str::to_string)
            .collect();
        let depths = if profiles.is_empty() {
            Vec::new()
        } else {
            config::validate_profile_range(bottom, top)?;
            ProfileField::levels_between(top, bottom, config.mixing.vertical_resolution)
        };
        let variables = substance
            .required_variables()
            .into_iter()
            .map(str::to_string)
            .collect();
        Ok(Self {
            mixer: VerticalMixer::new(config.mixing.clone()),
            seed_rng: ChaCha8Rng::seed_from_u64(config.seed),
            pool: ElementPool::new(substance.schema().clone()),
            config,
            substance,
            registry: ReaderRegistry::new(),
            variables,
            profiles,
            depths,
            seafloor: Vec::new(),
            state: EngineState::NotStarted,
            run: None,
            steps_completed: 0,
            history: OutputHistory::new(),
            last_metrics: StepMetrics::default(),
            error: None,
        })
    }

    /// Register a reader at `priority` (lower ranks win).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::RegistrationAfterStart`] once a run has
    /// started, or [`ConfigError::Registry`] for a malformed reader or
    /// a priority already taken.
    pub fn add_reader(&mut self, reader: Box<dyn Reader>, priority: u32) -> Result<(), ConfigError> {
        if self.state != EngineState::NotStarted {
            return Err(ConfigError::RegistrationAfterStart);
        }
        self.registry.register_reader(reader, priority)?;
        Ok(())
    }

    /// Schedule the elements of `request`.
    ///
    /// The whole request is validated before anything is inserted.
    /// Returns the new element IDs in order.
    ///
    /// # Errors
    ///
    /// Returns [`SeedError`] for a malformed request, or
    /// [`SeedError::AlreadyStarted`] once a run has started.
    pub fn seed(&mut self, request: SeedRequest) -> Result<Vec<ElementId>, SeedError> {
        if self.state != EngineState::NotStarted {
            return Err(SeedError::AlreadyStarted);
        }
        request.validate()?;
        let count = request.count();
        let (lon, lat) = request.positions(&mut self.seed_rng);
        let seafloor = request.seed_depth() == SeedDepth::Seafloor && !request.supplies("z");
        let z = match request.seed_depth() {
            SeedDepth::Depth(z) => z,
            SeedDepth::Seafloor => 0.0,
        };

        // Seafloor elements look deep to the substance until resolved.
        let hinted_z = if seafloor {
            vec![f64::NEG_INFINITY; count]
        } else {
            requested_z(&request, z)
        };
        let supplied: Vec<&str> = request.attributes().iter().map(|(n, _)| n.as_str()).collect();
        let extra = self.substance.seed_attributes(&mut SeedContext {
            count,
            z: &hinted_z,
            supplied: &supplied,
            rng: &mut self.seed_rng,
        });

        let mut values: Vec<(&str, AttrValue)> = request
            .attributes()
            .iter()
            .map(|(name, v)| (name.as_str(), v.clone()))
            .collect();
        let generated = [
            ("lon", AttrValue::from(lon)),
            ("lat", AttrValue::from(lat)),
            ("z", AttrValue::from(z)),
        ];
        for (name, column) in generated {
            if !request.supplies(name) {
                values.push((name, column));
            }
        }
        for (name, column) in &extra {
            if !request.supplies(name) {
                values.push((name.as_str(), column.clone().into()));
            }
        }

        let ids = self.pool.schedule(&values, request.time(), count)?;
        if seafloor {
            self.seafloor
                .extend(ids.iter().filter_map(|&id| self.pool.slot_of(id)));
        }
        log::debug!(
            "seeded {} element(s) for release at t={} (ids {}..={})",
            count,
            request.time(),
            ids.first().map_or(0, |id| id.0),
            ids.last().map_or(0, |id| id.0)
        );
        Ok(ids)
    }

    /// Validate `run` and enter [`EngineState::Running`].
    ///
    /// The run starts at the earliest release time (latest for a
    /// backward run). Scheduled elements released beyond the run's end
    /// are deactivated with `OutsideSimulationWindow`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the engine has already started, the
    /// run parameters are invalid, or nothing has been seeded. The
    /// engine stays in [`EngineState::NotStarted`] on error.
    pub fn start(&mut self, run: RunConfig) -> Result<(), ConfigError> {
        if self.state != EngineState::NotStarted {
            return Err(ConfigError::AlreadyStarted { state: self.state });
        }
        run.validate()?;
        let dt = run.time_step;
        let releases = self
            .pool
            .scheduled_slots()
            .iter()
            .filter_map(|&s| self.pool.release_time(s));
        let start = if dt > 0.0 {
            releases.fold(None, |acc: Option<f64>, t| Some(acc.map_or(t, |a| a.min(t))))
        } else {
            releases.fold(None, |acc: Option<f64>, t| Some(acc.map_or(t, |a| a.max(t))))
        }
        .ok_or(ConfigError::NothingSeeded)?;

        let total_steps = match run.length {
            RunLength::Steps(n) => n,
            RunLength::EndTime(end) => clock::steps_until(start, end, dt)?,
        };
        let clock = SimulationClock::new(start, dt);
        let end = clock.time_at(StepId(total_steps));

        let outside: Vec<Slot> = self
            .pool
            .scheduled_slots()
            .iter()
            .copied()
            .filter(|&s| {
                self.pool
                    .release_time(s)
                    .is_some_and(|t| if dt > 0.0 { t > end } else { t < end })
            })
            .collect();
        if !outside.is_empty() {
            let n = self
                .pool
                .deactivate(&outside, DeactivationReason::OutsideSimulationWindow, start);
            log::warn!("{n} element(s) released outside the run window [{start}, {end}]");
        }

        log::info!(
            "starting {} run: {} step(s) of {} s from t={} ({} element(s) seeded, {} reader(s))",
            self.substance.name(),
            total_steps,
            dt,
            start,
            self.pool.len(),
            self.registry.len()
        );
        self.run = Some(ActiveRun {
            config: run,
            clock,
            total_steps,
        });
        self.state = EngineState::Running;
        if self.pool.num_active() == 0 && self.pool.num_scheduled() == 0 {
            log::info!("nothing left to simulate");
            self.state = EngineState::Finished;
        }
        Ok(())
    }

    /// Execute one step and return the resulting state.
    ///
    /// Does nothing unless the engine is [`EngineState::Running`].
    pub fn step(&mut self) -> EngineState {
        if self.state != EngineState::Running {
            return self.state;
        }
        let Some(run) = self.run.as_mut() else {
            return self.state;
        };
        let time = run.clock.advance();
        let step = run.clock.step();
        let total_steps = run.total_steps;
        let config = run.config.clone();

        match self.execute_step(step, time, &config) {
            Ok(metrics) => {
                self.last_metrics = metrics;
                self.steps_completed = step.0;
                let exhausted = self.pool.num_active() == 0
                    && self.pool.num_scheduled() == 0
                    && self.pool.any_released();
                if step.0 >= total_steps {
                    self.state = EngineState::Finished;
                } else if exhausted {
                    log::info!("no active or scheduled elements left at step {step}, finishing early");
                    self.state = EngineState::Finished;
                }
                if self.state == EngineState::Finished {
                    log::info!(
                        "run finished after {} step(s) at t={}: {} active, {} deactivated",
                        self.steps_completed,
                        time,
                        self.pool.num_active(),
                        self.pool.num_deactivated()
                    );
                }
            }
            Err(e) => {
                log::error!("run failed at step {step} (t={time}): {e}");
                self.error = Some(e);
                self.state = EngineState::Failed;
            }
        }
        self.state
    }

    /// Start a run and execute it to the end.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the run cannot start (see
    /// [`start`](Self::start)). Step failures do not return `Err`; they
    /// end the run in [`EngineState::Failed`] and are reported in the
    /// summary.
    pub fn run(&mut self, run: RunConfig) -> Result<RunSummary, ConfigError> {
        self.start(run)?;
        while self.step() == EngineState::Running {}
        Ok(self.summary())
    }

    /// Status and counts as of now.
    pub fn summary(&self) -> RunSummary {
        RunSummary {
            state: self.state,
            steps_completed: self.steps_completed,
            time: self.time(),
            num_scheduled: self.pool.num_scheduled(),
            num_active: self.pool.num_active(),
            num_deactivated: self.pool.num_deactivated(),
            deactivations: self.pool.deactivation_counts(),
            error: self.error.clone(),
        }
    }

    // ── Accessors ───────────────────────────────────────────────

    /// Current lifecycle state.
    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Model time after the last completed step; the run's start time
    /// before any step, and 0 before a run starts.
    pub fn time(&self) -> f64 {
        self.run.as_ref().map_or(0.0, |r| {
            r.clock.time_at(StepId(self.steps_completed))
        })
    }

    /// Number of completed steps.
    pub fn steps_completed(&self) -> u64 {
        self.steps_completed
    }

    /// The element pool, including deactivated elements.
    pub fn pool(&self) -> &ElementPool {
        &self.pool
    }

    /// Registered readers.
    pub fn registry(&self) -> &ReaderRegistry {
        &self.registry
    }

    /// The engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The simulated substance.
    pub fn substance(&self) -> &dyn Substance {
        self.substance.as_ref()
    }

    /// Recorded output.
    pub fn history(&self) -> &OutputHistory {
        &self.history
    }

    /// Metrics from the most recent completed step.
    pub fn last_metrics(&self) -> &StepMetrics {
        &self.last_metrics
    }

    /// The error that failed the run, if any.
    pub fn error(&self) -> Option<&StepError> {
        self.error.as_ref()
    }

    // ── Step sequence ───────────────────────────────────────────

    fn execute_step(
        &mut self,
        step: StepId,
        time: f64,
        run: &RunConfig,
    ) -> Result<StepMetrics, StepError> {
        let step_start = Instant::now();
        let mut metrics = StepMetrics::default();
        let dt = run.time_step;
        let env = Environment::new(&self.registry, &self.config.fallbacks);

        // 1. Release.
        let released = if dt > 0.0 {
            self.pool.release_due(time)
        } else {
            self.pool.release_due_backward(time)
        };
        metrics.released = released.len();
        if !released.is_empty() {
            log::debug!("step {step}: released {} element(s)", released.len());
        }

        // 2. Environment: sea floor for new seafloor elements, then the
        //    substance's variables at every active position.
        let env_start = Instant::now();
        if !self.seafloor.is_empty() && !released.is_empty() {
            let (landing, waiting): (Vec<Slot>, Vec<Slot>) = self
                .seafloor
                .iter()
                .copied()
                .partition(|s| released.binary_search(s).is_ok());
            self.seafloor = waiting;
            if !landing.is_empty() {
                let n = settle_on_seafloor(
                    &mut self.pool,
                    &env,
                    &landing,
                    time,
                    run.stop_on_error,
                    &mut metrics,
                )?;
                metrics.deactivated += n;
            }
        }

        let mut state = self.pool.gather_active();
        let snapshot = if state.is_empty() {
            EnvironmentSnapshot::new(time, 0)
        } else {
            let vars: Vec<&str> = self.variables.iter().map(String::as_str).collect();
            let profiles: Vec<&str> = self.profiles.iter().map(String::as_str).collect();
            let outcome = env.query(&vars, &profiles, &state.points(), time, &self.depths);
            metrics.absorb_query(&outcome.stats);
            match outcome.first_missing() {
                None => outcome.snapshot,
                Some(e) if run.stop_on_error => return Err(StepError::MissingEnvironmentData(e)),
                Some(e) => {
                    let missing = outcome.missing_points();
                    let slots: Vec<Slot> = missing.iter().map(|&i| state.slots()[i]).collect();
                    let n = self
                        .pool
                        .deactivate(&slots, DeactivationReason::MissingEnvironmentData, time);
                    metrics.deactivated += n;
                    log::warn!("step {step}: {e}; deactivated {n} element(s)");
                    let mut keep = vec![true; state.len()];
                    for i in missing {
                        keep[i] = false;
                    }
                    state.retain(&keep);
                    let mut snapshot = outcome.snapshot;
                    snapshot.retain(&keep);
                    snapshot
                }
            }
        };
        metrics.environment_us = env_start.elapsed().as_micros() as u64;

        // 3. Substance hooks on a working copy.
        let mut flags: Vec<Option<DeactivationReason>> = vec![None; state.len()];
        let before = state.clone();
        let update_start = Instant::now();
        if !state.is_empty() {
            let mut rng = ChaCha8Rng::seed_from_u64(self.config.seed ^ step.0);
            let mut ctx = StepContext::new(
                &mut state,
                &snapshot,
                env,
                &self.mixer,
                &mut rng,
                self.pool.schema(),
                self.config.advection,
                step,
                time,
                dt,
            );
            let hooked = self
                .substance
                .prepare_step(&mut ctx)
                .and_then(|()| self.substance.update(&mut ctx));
            let (requested, mixing) = ctx.finish();
            hooked.map_err(|reason| self.hook_failed(reason))?;
            check_shape(&state, before.len()).map_err(|reason| self.hook_failed(reason))?;
            metrics.mixing_substeps = mixing.substeps;
            for (row, reason) in requested {
                if flags[row].is_none() {
                    flags[row] = Some(reason);
                }
            }
        }
        metrics.update_us = update_start.elapsed().as_micros() as u64;

        // 4. Numerical, domain and land checks.
        let boundary_start = Instant::now();
        for row in state.non_finite_rows() {
            state.restore_row(row, &before);
            flags[row] = Some(DeactivationReason::NumericalInstability);
        }
        if let Some(domain) = &self.config.domain {
            for row in boundary::outside_domain(&state, domain) {
                if flags[row].is_none() {
                    flags[row] = Some(DeactivationReason::LeftDomainBounds);
                }
            }
        }
        if !state.is_empty() && boundary::land_mask_available(&self.registry, &self.config.fallbacks)
        {
            let (on_land, stats) = boundary::on_land(&env, &state, time);
            metrics.absorb_query(&stats);
            for row in on_land {
                if flags[row].is_some() {
                    continue;
                }
                match self.config.coastline {
                    CoastlineAction::Stranding => {
                        flags[row] = Some(DeactivationReason::StrandedOnLand);
                    }
                    CoastlineAction::Previous => {
                        state.lon[row] = before.lon[row];
                        state.lat[row] = before.lat[row];
                    }
                }
            }
        }

        self.pool
            .scatter_active(&state)
            .map_err(|e| self.hook_failed(HookError::ExecutionFailed { reason: e.to_string() }))?;
        for reason in DeactivationReason::ALL {
            let slots: Vec<Slot> = flags
                .iter()
                .zip(state.slots())
                .filter(|(flag, _)| **flag == Some(reason))
                .map(|(_, &slot)| slot)
                .collect();
            if slots.is_empty() {
                continue;
            }
            let n = self.pool.deactivate(&slots, reason, time);
            metrics.deactivated += n;
            log::debug!("step {step}: deactivated {n} element(s): {reason}");
        }
        metrics.boundary_us = boundary_start.elapsed().as_micros() as u64;

        // 5. Output.
        let output_start = Instant::now();
        if step.0 % run.output_interval == 0 {
            self.history
                .push(OutputRecord::capture(step, time, &self.pool));
        }
        metrics.output_us = output_start.elapsed().as_micros() as u64;

        metrics.active = self.pool.num_active();
        metrics.total_us = step_start.elapsed().as_micros() as u64;
        Ok(metrics)
    }

    fn hook_failed(&self, reason: HookError) -> StepError {
        StepError::HookFailed {
            substance: self.substance.name().to_string(),
            reason,
        }
    }
}

/// Move newly released seafloor elements to the sea floor depth.
/// Returns how many were deactivated for lack of depth data.
fn settle_on_seafloor(
    pool: &mut ElementPool,
    env: &Environment<'_>,
    slots: &[Slot],
    time: f64,
    stop_on_error: bool,
    metrics: &mut StepMetrics,
) -> Result<usize, StepError> {
    let points: Vec<Point> = slots.iter().filter_map(|&s| pool.position(s)).collect();
    let outcome = env.query(&[SEA_FLOOR_DEPTH_BELOW_SEA_LEVEL], &[], &points, time, &[]);
    metrics.absorb_query(&outcome.stats);
    let mut deactivated = 0;
    if let Some(e) = outcome.first_missing() {
        if stop_on_error {
            return Err(StepError::MissingEnvironmentData(e));
        }
        let missing: Vec<Slot> = outcome.missing_points().iter().map(|&i| slots[i]).collect();
        deactivated = pool.deactivate(&missing, DeactivationReason::MissingEnvironmentData, time);
        log::warn!("{e}; deactivated {deactivated} seafloor element(s)");
    }
    if let Some(depth) = outcome.snapshot.get(SEA_FLOOR_DEPTH_BELOW_SEA_LEVEL) {
        for ((&slot, p), &d) in slots.iter().zip(&points).zip(depth) {
            if d.is_finite() {
                pool.set_position(slot, Point::new(p.lon, p.lat, -d.abs()));
            }
        }
    }
    Ok(deactivated)
}

/// Per-element depths of a seed request: the caller's `z` attribute if
/// given, else `default`.
fn requested_z(request: &SeedRequest, default: f64) -> Vec<f64> {
    let count = request.count();
    match request.attributes().iter().find(|(n, _)| n == "z").map(|(_, v)| v) {
        Some(AttrValue::Scalar(z)) => vec![*z; count],
        Some(AttrValue::PerElement(z)) => z.clone(),
        None => vec![default; count],
    }
}

/// A hook may rewrite positions but not add or remove rows.
fn check_shape(state: &ActiveState, rows: usize) -> Result<(), HookError> {
    for (name, len) in [
        ("lon", state.lon.len()),
        ("lat", state.lat.len()),
        ("z", state.z.len()),
    ] {
        if len != rows {
            return Err(HookError::ExecutionFailed {
                reason: format!("'{name}' has {len} entries after update, expected {rows}"),
            });
        }
    }
    Ok(())
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("substance", &self.substance.name())
            .field("state", &self.state)
            .field("steps_completed", &self.steps_completed)
            .field("elements", &self.pool.len())
            .field("active", &self.pool.num_active())
            .field("readers", &self.registry.len())
            .field("records", &self.history.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use drift_core::{AttributeDef, ElementSchema};

    /// Tags each element with the depth it was seeded at.
    struct Probe {
        schema: ElementSchema,
    }

    impl Probe {
        fn new() -> Self {
            Self {
                schema: ElementSchema::new(vec![AttributeDef::with_default("tag", "1", 0.0)])
                    .unwrap(),
            }
        }
    }

    impl Substance for Probe {
        fn name(&self) -> &str {
            "probe"
        }
        fn schema(&self) -> &ElementSchema {
            &self.schema
        }
        fn required_variables(&self) -> Vec<&str> {
            Vec::new()
        }
        fn seed_attributes(&self, seed: &mut SeedContext<'_>) -> Vec<(String, Vec<f64>)> {
            let tags = seed
                .z
                .iter()
                .map(|&z| if z.is_finite() { z } else { -999.0 })
                .collect();
            vec![("tag".to_string(), tags)]
        }
        fn update(&self, _ctx: &mut StepContext<'_>) -> Result<(), HookError> {
            Ok(())
        }
    }

    fn engine() -> Engine {
        Engine::new(EngineConfig::default(), Box::new(Probe::new())).unwrap()
    }

    #[test]
    fn new_engine_is_not_started() {
        let e = engine();
        assert_eq!(e.state(), EngineState::NotStarted);
        assert_eq!(e.time(), 0.0);
        assert!(e.history().is_empty());
        assert!(format!("{e:?}").contains("probe"));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut cfg = EngineConfig::default();
        cfg.mixing.max_substeps = 0;
        assert!(matches!(
            Engine::new(cfg, Box::new(Probe::new())),
            Err(ConfigError::InvalidMixing { .. })
        ));
    }

    #[test]
    fn substance_sees_requested_depths() {
        let mut e = engine();
        e.seed(SeedRequest::new(0.0, 0.0, 0.0, 2).depth(-3.0)).unwrap();
        e.seed(SeedRequest::new(0.0, 0.0, 0.0, 1).at_seafloor()).unwrap();
        // Caller-supplied values win over the substance's.
        e.seed(SeedRequest::new(0.0, 0.0, 0.0, 1).attribute("tag", 7.0)).unwrap();
        let tag = e.pool().schema().id("tag").unwrap();
        let tags: Vec<f64> = (0..4)
            .map(|i| e.pool().attribute(Slot(i), tag).unwrap())
            .collect();
        assert_eq!(tags, vec![-3.0, -3.0, -999.0, 7.0]);
    }

    #[test]
    fn run_requires_elements() {
        let mut e = engine();
        assert_eq!(
            e.run(RunConfig::steps(1, 60.0)),
            Err(ConfigError::NothingSeeded)
        );
        assert_eq!(e.state(), EngineState::NotStarted);
    }

    #[test]
    fn seeding_and_registration_close_at_start() {
        let mut e = engine();
        e.seed(SeedRequest::new(0.0, 0.0, 0.0, 1)).unwrap();
        e.start(RunConfig::steps(3, 60.0)).unwrap();
        assert_eq!(e.state(), EngineState::Running);
        assert_eq!(
            e.seed(SeedRequest::new(0.0, 0.0, 0.0, 1)),
            Err(SeedError::AlreadyStarted)
        );
        assert_eq!(
            e.start(RunConfig::steps(3, 60.0)),
            Err(ConfigError::AlreadyStarted {
                state: EngineState::Running
            })
        );
        let reader = drift_test_utils::ConstantReader::new("c", &["x_wind"], 0.0);
        assert_eq!(
            e.add_reader(Box::new(reader), 1),
            Err(ConfigError::RegistrationAfterStart)
        );
    }

    #[test]
    fn end_time_sets_step_count() {
        let mut e = engine();
        e.seed(SeedRequest::new(0.0, 0.0, 600.0, 1)).unwrap();
        let summary = e.run(RunConfig::until(4200.0, 900.0)).unwrap();
        assert_eq!(summary.state, EngineState::Finished);
        assert_eq!(summary.steps_completed, 4);
        assert_eq!(summary.time, 600.0 + 4.0 * 900.0);
    }

    #[test]
    fn end_time_behind_start_is_rejected() {
        let mut e = engine();
        e.seed(SeedRequest::new(0.0, 0.0, 600.0, 1)).unwrap();
        assert!(matches!(
            e.run(RunConfig::until(0.0, 900.0)),
            Err(ConfigError::EndTimeBehindStart { .. })
        ));
    }

    #[test]
    fn output_interval_thins_history() {
        let mut e = engine();
        e.seed(SeedRequest::new(0.0, 0.0, 0.0, 1)).unwrap();
        e.run(RunConfig::steps(7, 60.0).output_interval(3)).unwrap();
        let steps: Vec<u64> = e.history().iter().map(|r| r.step.0).collect();
        assert_eq!(steps, vec![3, 6]);
        assert_eq!(e.history().records()[0].time, 180.0);
    }
}
