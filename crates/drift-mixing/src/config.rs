//! Mixing configuration.

// ── NoiseKind ──────────────────────────────────────────────────────

/// Distribution of the random displacement in the mixing scheme.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NoiseKind {
    /// Standard normal draws (Box–Muller).
    #[default]
    Gaussian,
    /// Uniform draws on `[-√3, √3]`, which also have unit variance.
    Uniform,
}

// ── MixingConfig ───────────────────────────────────────────────────

/// Parameters of the vertical mixing integrator.
///
/// Constructed once with the engine configuration and never changed
/// during a run.
#[derive(Clone, Debug, PartialEq)]
pub struct MixingConfig {
    /// Vertical grid resolution Δz in metres. Also the spacing of the
    /// profile depth levels. Default: 1.0.
    pub vertical_resolution: f64,
    /// Fraction `f` of Δz the RMS displacement per sub-step may reach:
    /// `sqrt(2·K_max·δt) ≤ f·Δz`. Default: 1.0.
    pub stability_fraction: f64,
    /// Upper bound on the sub-step in seconds, applied even when
    /// diffusivity is weak. `None` means no bound. Default: 60 s.
    pub max_substep: Option<f64>,
    /// Random displacement distribution. Default: Gaussian.
    pub noise: NoiseKind,
    /// Cap on sub-steps per outer step; beyond it the sub-step is
    /// lengthened and a warning logged. Default: 10 000.
    pub max_substeps: usize,
}

impl Default for MixingConfig {
    fn default() -> Self {
        Self {
            vertical_resolution: 1.0,
            stability_fraction: 1.0,
            max_substep: Some(60.0),
            noise: NoiseKind::Gaussian,
            max_substeps: 10_000,
        }
    }
}

impl MixingConfig {
    /// Check structural invariants.
    ///
    /// # Errors
    ///
    /// Returns a description of the first invalid field.
    pub fn validate(&self) -> Result<(), String> {
        if !self.vertical_resolution.is_finite() || self.vertical_resolution <= 0.0 {
            return Err(format!(
                "vertical_resolution must be finite and > 0, got {}",
                self.vertical_resolution
            ));
        }
        if !self.stability_fraction.is_finite()
            || self.stability_fraction <= 0.0
            || self.stability_fraction > 1.0
        {
            return Err(format!(
                "stability_fraction must be in (0, 1], got {}",
                self.stability_fraction
            ));
        }
        if let Some(s) = self.max_substep {
            if !s.is_finite() || s <= 0.0 {
                return Err(format!("max_substep must be finite and > 0, got {s}"));
            }
        }
        if self.max_substeps == 0 {
            return Err("max_substeps must be at least 1".to_string());
        }
        Ok(())
    }

    /// Largest stable sub-step for a peak diffusivity `k_max` (m²/s):
    /// `(f·Δz)² / (2·K_max)`, or infinite when there is no diffusion.
    pub fn stability_limit(&self, k_max: f64) -> f64 {
        if k_max > 0.0 {
            let dz = self.stability_fraction * self.vertical_resolution;
            dz * dz / (2.0 * k_max)
        } else {
            f64::INFINITY
        }
    }
}
