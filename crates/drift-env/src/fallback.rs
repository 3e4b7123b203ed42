//! Constant fallback values for variables no reader covers.

use indexmap::IndexMap;

use drift_core::variables as var;

/// Immutable-after-construction table of fallback constants, keyed by
/// variable name.
///
/// A variable without an entry has no fallback: an uncovered point
/// produces `MissingEnvironmentData`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FallbackTable {
    values: IndexMap<String, f64>,
}

impl FallbackTable {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults for ocean drift: calm currents, winds and waves, a deep
    /// sea floor, weak mixing and temperate water. `land_binary_mask`
    /// is deliberately absent.
    pub fn ocean_defaults() -> Self {
        Self::new()
            .with(var::X_SEA_WATER_VELOCITY, 0.0)
            .with(var::Y_SEA_WATER_VELOCITY, 0.0)
            .with(var::UPWARD_SEA_WATER_VELOCITY, 0.0)
            .with(var::X_WIND, 0.0)
            .with(var::Y_WIND, 0.0)
            .with(var::SEA_SURFACE_WAVE_SIGNIFICANT_HEIGHT, 0.0)
            .with(var::SEA_SURFACE_WAVE_STOKES_DRIFT_X_VELOCITY, 0.0)
            .with(var::SEA_SURFACE_WAVE_STOKES_DRIFT_Y_VELOCITY, 0.0)
            .with(var::SEA_SURFACE_WAVE_PEAK_PERIOD, 0.0)
            .with(var::SEA_SURFACE_WAVE_MEAN_PERIOD, 0.0)
            .with(var::SEA_ICE_AREA_FRACTION, 0.0)
            .with(var::SEA_FLOOR_DEPTH_BELOW_SEA_LEVEL, 10_000.0)
            .with(var::OCEAN_VERTICAL_DIFFUSIVITY, 0.02)
            .with(var::SEA_WATER_TEMPERATURE, 10.0)
            .with(var::SEA_WATER_SALINITY, 34.0)
    }

    /// Builder-style insert; replaces an existing entry in place.
    pub fn with(mut self, variable: &str, value: f64) -> Self {
        self.values.insert(variable.to_string(), value);
        self
    }

    /// Remove the fallback for `variable`, if any.
    pub fn without(mut self, variable: &str) -> Self {
        self.values.shift_remove(variable);
        self
    }

    /// Fallback for `variable`.
    pub fn get(&self, variable: &str) -> Option<f64> {
        self.values.get(variable).copied()
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Check that every value is finite.
    ///
    /// # Errors
    ///
    /// Returns the offending variable name and value.
    pub fn validate(&self) -> Result<(), (String, f64)> {
        match self.values.iter().find(|(_, v)| !v.is_finite()) {
            Some((k, v)) => Err((k.clone(), *v)),
            None => Ok(()),
        }
    }
}
