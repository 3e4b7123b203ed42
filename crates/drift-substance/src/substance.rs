//! The [`Substance`] trait.

use rand_chacha::ChaCha8Rng;

use drift_core::{ElementSchema, HookError};

use crate::context::StepContext;

/// Default vertical range `(bottom, top)` in metres for profile queries.
pub const DEFAULT_PROFILE_Z_RANGE: (f64, f64) = (-120.0, 0.0);

/// Information handed to [`Substance::seed_attributes`] while a seed
/// request is being prepared.
pub struct SeedContext<'a> {
    /// Number of elements in the request.
    pub count: usize,
    /// Requested depth of each element (≤ 0). Elements seeded on the
    /// sea floor, whose depth is only known at release, appear as
    /// `f64::NEG_INFINITY`.
    pub z: &'a [f64],
    /// Attribute names the caller supplied explicitly.
    pub supplied: &'a [&'a str],
    /// The engine's seeding RNG.
    pub rng: &'a mut ChaCha8Rng,
}

impl SeedContext<'_> {
    /// Whether the caller supplied `attribute`.
    pub fn is_supplied(&self, attribute: &str) -> bool {
        self.supplied.contains(&attribute)
    }
}

/// A substance variant plugged into the engine.
///
/// # Contract
///
/// - Substances are stateless during a run (`&self`); per-element state
///   lives in the attribute schema.
/// - `schema()`, `required_variables()`, `required_profiles()` and
///   `profile_z_range()` are called once when the engine is built.
/// - `prepare_step()` then `update()` are called once per step, after the
///   environment query and before the boundary checks. An error from
///   either aborts the run and discards the step's changes.
/// - Hooks must be deterministic given the context's RNG.
///
/// # Object safety
///
/// This trait is object-safe; the engine stores the substance as
/// `Box<dyn Substance>`.
///
/// # Examples
///
/// A tracer that drifts with the ocean current:
///
/// ```
/// use drift_core::{ElementSchema, HookError};
/// use drift_core::variables::{X_SEA_WATER_VELOCITY, Y_SEA_WATER_VELOCITY};
/// use drift_substance::{StepContext, Substance};
///
/// struct Drifter {
///     schema: ElementSchema,
/// }
///
/// impl Substance for Drifter {
///     fn name(&self) -> &str { "drifter" }
///     fn schema(&self) -> &ElementSchema { &self.schema }
///     fn required_variables(&self) -> Vec<&str> {
///         vec![X_SEA_WATER_VELOCITY, Y_SEA_WATER_VELOCITY]
///     }
///     fn update(&self, ctx: &mut StepContext<'_>) -> Result<(), HookError> {
///         ctx.advect_ocean_current()
///     }
/// }
///
/// let d = Drifter { schema: ElementSchema::default() };
/// assert_eq!(d.required_variables().len(), 2);
/// ```
pub trait Substance: Send + 'static {
    /// Human-readable name for error reporting and logs.
    fn name(&self) -> &str;

    /// Attribute layout carried by every element of this substance.
    fn schema(&self) -> &ElementSchema;

    /// Variables queried as one value per element each step.
    fn required_variables(&self) -> Vec<&str>;

    /// Variables queried as vertical profiles each step.
    ///
    /// Default: none.
    fn required_profiles(&self) -> Vec<&str> {
        Vec::new()
    }

    /// Vertical range `(bottom, top)` of the profile queries.
    ///
    /// Default: [`DEFAULT_PROFILE_Z_RANGE`].
    fn profile_z_range(&self) -> (f64, f64) {
        DEFAULT_PROFILE_Z_RANGE
    }

    /// Extra per-element attribute values for a seed request, for
    /// attributes the caller did not supply. Entries for supplied
    /// attributes are ignored.
    ///
    /// Default: none, so schema defaults apply.
    fn seed_attributes(&self, _seed: &mut SeedContext<'_>) -> Vec<(String, Vec<f64>)> {
        Vec::new()
    }

    /// Per-step preparation run before [`update`](Self::update), such
    /// as deriving attributes from the environment.
    ///
    /// Default: no-op.
    fn prepare_step(&self, _ctx: &mut StepContext<'_>) -> Result<(), HookError> {
        Ok(())
    }

    /// Move and transform the active elements for one step.
    fn update(&self, ctx: &mut StepContext<'_>) -> Result<(), HookError>;
}
