//! Drive a single substance hook without an engine.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use drift_core::{ElementSchema, ProfileField, StepId};
use drift_env::{Environment, EnvironmentSnapshot, FallbackTable, ReaderRegistry};
use drift_mixing::{MixingConfig, VerticalMixer};
use drift_pool::{ActiveState, AttrValue, ElementPool};
use drift_substance::{AdvectionScheme, StepContext};

/// Owns everything a [`StepContext`] borrows.
///
/// Elements are released at time 0 from the given positions; the
/// snapshot starts empty and is filled with [`var`](Self::var) and
/// [`profile`](Self::profile).
pub struct StepHarness {
    pub state: ActiveState,
    pub snapshot: EnvironmentSnapshot,
    pub registry: ReaderRegistry,
    pub fallbacks: FallbackTable,
    pub mixer: VerticalMixer,
    pub rng: ChaCha8Rng,
    pub schema: ElementSchema,
    pub scheme: AdvectionScheme,
    pub step: StepId,
}

impl StepHarness {
    /// Active elements at `(lon, lat, z)` with schema defaults, plus
    /// any per-element `attributes`.
    pub fn new(
        schema: &ElementSchema,
        positions: &[(f64, f64, f64)],
        attributes: &[(&str, Vec<f64>)],
    ) -> Self {
        let mut pool = ElementPool::new(schema.clone());
        let mut values: Vec<(&str, AttrValue)> = vec![
            ("lon", positions.iter().map(|p| p.0).collect::<Vec<_>>().into()),
            ("lat", positions.iter().map(|p| p.1).collect::<Vec<_>>().into()),
            ("z", positions.iter().map(|p| p.2).collect::<Vec<_>>().into()),
        ];
        for (name, v) in attributes {
            values.push((*name, v.clone().into()));
        }
        pool.schedule(&values, 0.0, positions.len()).unwrap();
        pool.release_due(0.0);
        Self {
            state: pool.gather_active(),
            snapshot: EnvironmentSnapshot::new(0.0, positions.len()),
            registry: ReaderRegistry::new(),
            fallbacks: FallbackTable::ocean_defaults(),
            mixer: VerticalMixer::new(MixingConfig::default()),
            rng: ChaCha8Rng::seed_from_u64(0),
            schema: schema.clone(),
            scheme: AdvectionScheme::Euler,
            step: StepId(1),
        }
    }

    /// Set a per-element variable to `value` everywhere.
    pub fn var(mut self, name: &str, value: f64) -> Self {
        self.snapshot.insert(name, vec![value; self.state.len()]);
        self
    }

    /// Set a per-element variable.
    pub fn var_values(mut self, name: &str, values: Vec<f64>) -> Self {
        self.snapshot.insert(name, values);
        self
    }

    /// Set a depth-independent profile to `value` everywhere.
    pub fn profile(mut self, name: &str, value: f64) -> Self {
        self.snapshot
            .insert_profile(name, ProfileField::uniform(vec![value; self.state.len()]));
        self
    }

    /// Replace the mixing configuration.
    pub fn mixing(mut self, config: MixingConfig) -> Self {
        self.mixer = VerticalMixer::new(config);
        self
    }

    /// Reseed the step RNG.
    pub fn seed(mut self, seed: u64) -> Self {
        self.rng = ChaCha8Rng::seed_from_u64(seed);
        self
    }

    /// A context for one step of `dt` seconds at time 0.
    pub fn ctx(&mut self, dt: f64) -> StepContext<'_> {
        StepContext::new(
            &mut self.state,
            &self.snapshot,
            Environment::new(&self.registry, &self.fallbacks),
            &self.mixer,
            &mut self.rng,
            &self.schema,
            self.scheme,
            self.step,
            0.0,
            dt,
        )
    }

    /// Values of a schema attribute.
    pub fn attr(&self, name: &str) -> Vec<f64> {
        let id = self.schema.id(name).unwrap();
        self.state.attr(id).unwrap().to_vec()
    }
}
