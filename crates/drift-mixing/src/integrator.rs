//! The sub-stepped random-walk integrator.

use rand_chacha::ChaCha8Rng;

use drift_core::{MixingError, ProfileField};

use crate::config::MixingConfig;
use crate::noise;
use crate::surface::{SurfaceAction, SurfaceHook};

/// What one [`VerticalMixer::mix`] call did.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MixingReport {
    /// Number of sub-steps taken.
    pub substeps: usize,
    /// Length of a full sub-step in seconds (the last may be shorter).
    pub substep_seconds: f64,
    /// Whether the sub-step count hit the configured cap.
    pub capped: bool,
    /// Times an element reached the surface.
    pub surface_hits: usize,
    /// Times the surface hook entrained an element.
    pub entrained: usize,
}

/// Stateless integrator over a fixed [`MixingConfig`].
#[derive(Clone, Debug, Default)]
pub struct VerticalMixer {
    config: MixingConfig,
}

impl VerticalMixer {
    /// Integrator using `config`, which the caller has validated.
    pub fn new(config: MixingConfig) -> Self {
        Self { config }
    }

    /// The configuration in use.
    pub fn config(&self) -> &MixingConfig {
        &self.config
    }

    /// Sub-step length and count for an outer step of `span` seconds
    /// (non-negative) under peak diffusivity `k_max`.
    ///
    /// Returns `(δt, n, capped)` with `n·δt ≥ span` and `n ≤ max_substeps`.
    pub fn substep_plan(&self, span: f64, k_max: f64) -> (f64, usize, bool) {
        if span <= 0.0 {
            return (0.0, 0, false);
        }
        let mut dt = self.config.stability_limit(k_max).min(span);
        if let Some(cap) = self.config.max_substep {
            dt = dt.min(cap);
        }
        let n = (span / dt).ceil().max(1.0);
        if n > self.config.max_substeps as f64 {
            let n = self.config.max_substeps;
            return (span / n as f64, n, true);
        }
        (dt, n as usize, false)
    }

    /// Advance the depths `z` over an outer step `dt` (its sign is
    /// ignored).
    ///
    /// `diffusivity` holds one profile per element, `terminal_velocity`
    /// is positive upward and `seafloor` is the floor depth (≤ 0) below
    /// each element. Elements are visited in ascending row order on
    /// every sub-step, so a given `rng` state yields bit-identical
    /// results. The random displacement is reflected at the floor while
    /// the terminal velocity drift stops there, so sinking elements come
    /// to rest on the bottom. After every sub-step each depth lies in
    /// `[seafloor, 0]`. A row whose depth becomes non-finite is left
    /// untouched for the rest of the call, for the caller to detect.
    ///
    /// # Errors
    ///
    /// Returns [`MixingError::InvalidTimeStep`] for a non-finite `dt`
    /// and [`MixingError::LengthMismatch`] if an input does not have
    /// one entry per element. Nothing is changed on error.
    #[allow(clippy::too_many_arguments)]
    pub fn mix(
        &self,
        z: &mut [f64],
        dt: f64,
        diffusivity: &ProfileField,
        terminal_velocity: &[f64],
        seafloor: &[f64],
        hook: &mut dyn SurfaceHook,
        rng: &mut ChaCha8Rng,
    ) -> Result<MixingReport, MixingError> {
        if !dt.is_finite() {
            return Err(MixingError::InvalidTimeStep { value: dt });
        }
        let n = z.len();
        for (input, got) in [
            ("diffusivity", diffusivity.len()),
            ("terminal_velocity", terminal_velocity.len()),
            ("seafloor", seafloor.len()),
        ] {
            if got != n {
                return Err(MixingError::LengthMismatch {
                    input,
                    expected: n,
                    got,
                });
            }
        }

        let span = dt.abs();
        let (h, steps, capped) = self.substep_plan(span, diffusivity.max_value());
        let mut report = MixingReport {
            substeps: steps,
            substep_seconds: h,
            capped,
            ..MixingReport::default()
        };
        if n == 0 || steps == 0 {
            return Ok(report);
        }
        if capped {
            log::warn!(
                "vertical mixing capped at {steps} sub-steps of {h:.3} s (stability limit {:.3} s)",
                self.config.stability_limit(diffusivity.max_value())
            );
        }

        let floors: Vec<f64> = seafloor.iter().map(|f| f.min(0.0)).collect();
        for s in 0..steps {
            let step = if s + 1 == steps {
                (span - h * (steps - 1) as f64).max(0.0)
            } else {
                h
            };
            for i in 0..n {
                if !z[i].is_finite() {
                    continue;
                }
                let floor = floors[i];
                let mut znew = self.visser_step(z[i], step, diffusivity, i, rng);
                if znew < floor {
                    // Mirror the random walk about the floor; an overshoot
                    // that would clear the whole column settles instead.
                    let mirrored = 2.0 * floor - znew;
                    znew = if mirrored < 0.0 { mirrored } else { floor };
                }
                // Settling is not reflected: sinking elements deposit.
                znew += terminal_velocity[i] * step;
                if znew < floor {
                    znew = floor;
                }
                if znew >= 0.0 {
                    report.surface_hits += 1;
                    znew = match hook.at_surface(i, znew, step, rng) {
                        SurfaceAction::Stay => 0.0,
                        SurfaceAction::Reflect => -znew,
                        SurfaceAction::Entrain { depth } => {
                            report.entrained += 1;
                            depth
                        }
                    };
                }
                z[i] = if znew.is_nan() { znew } else { znew.clamp(floor, 0.0) };
            }
        }
        Ok(report)
    }

    /// Diffusive displacement of one element over `h` seconds: the
    /// gradient drift plus noise scaled by diffusivity at the midpoint
    /// `z + K'(z)·h/2`.
    fn visser_step(
        &self,
        z: f64,
        h: f64,
        diffusivity: &ProfileField,
        i: usize,
        rng: &mut ChaCha8Rng,
    ) -> f64 {
        let gradient = diffusivity.gradient_at(i, z);
        let k_mid = diffusivity.value_at(i, z + 0.5 * gradient * h).max(0.0);
        let r = noise::draw(self.config.noise, rng);
        z + gradient * h + (2.0 * k_mid * h).sqrt() * r
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NoiseKind;
    use crate::surface::{ReflectAtSurface, Resurface};
    use rand::SeedableRng;

    fn mixer() -> VerticalMixer {
        VerticalMixer::new(MixingConfig {
            vertical_resolution: 1.0,
            max_substep: Some(60.0),
            ..MixingConfig::default()
        })
    }

    #[test]
    fn plan_follows_stability_limit() {
        let m = mixer();
        // 1 / (2 * 0.05) = 10 s
        assert_eq!(m.substep_plan(3600.0, 0.05), (10.0, 360, false));
        // Weak diffusion falls back to max_substep.
        assert_eq!(m.substep_plan(3600.0, 1e-6), (60.0, 60, false));
        // Short outer step.
        assert_eq!(m.substep_plan(5.0, 0.05), (5.0, 1, false));
        // Remainder gets one more sub-step.
        let (h, n, _) = m.substep_plan(25.0, 0.05);
        assert_eq!((h, n), (10.0, 3));
        assert_eq!(m.substep_plan(0.0, 0.05).1, 0);
    }

    #[test]
    fn plan_respects_cap() {
        let m = VerticalMixer::new(MixingConfig {
            max_substeps: 100,
            ..MixingConfig::default()
        });
        let (h, n, capped) = m.substep_plan(3600.0, 10.0);
        assert!(capped);
        assert_eq!(n, 100);
        assert!((h - 36.0).abs() < 1e-12);
    }

    #[test]
    fn terminal_velocity_only_is_deterministic_drift() {
        let m = mixer();
        let k = ProfileField::uniform(vec![0.0; 2]);
        let mut z = vec![-10.0, -10.0];
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let r = m
            .mix(&mut z, 100.0, &k, &[-0.01, 0.01], &[-50.0, -50.0], &mut Resurface, &mut rng)
            .unwrap();
        assert!((z[0] - -11.0).abs() < 1e-9, "z0 {}", z[0]);
        assert!((z[1] - -9.0).abs() < 1e-9, "z1 {}", z[1]);
        assert_eq!(r.substeps, 2);
    }

    #[test]
    fn seafloor_is_never_crossed() {
        let m = mixer();
        let k = ProfileField::uniform(vec![0.0]);
        let mut z = vec![-4.0];
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        m.mix(&mut z, 3600.0, &k, &[-0.1], &[-5.0], &mut Resurface, &mut rng)
            .unwrap();
        assert_eq!(z[0], -5.0);
    }

    #[test]
    fn rising_elements_resurface_or_reflect() {
        let m = mixer();
        let k = ProfileField::uniform(vec![0.0]);
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let mut z = vec![-1.0];
        let r = m
            .mix(&mut z, 60.0, &k, &[0.05], &[-100.0], &mut Resurface, &mut rng)
            .unwrap();
        assert_eq!(z[0], 0.0);
        assert_eq!(r.surface_hits, 1);

        let mut z = vec![-1.0];
        m.mix(&mut z, 60.0, &k, &[0.05], &[-100.0], &mut ReflectAtSurface, &mut rng)
            .unwrap();
        assert!((z[0] - -2.0).abs() < 1e-9);
    }

    #[test]
    fn hook_can_entrain() {
        let m = mixer();
        let k = ProfileField::uniform(vec![0.0]);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut z = vec![0.0];
        let mut hook = |_row: usize, _z: f64, _dt: f64, _rng: &mut ChaCha8Rng| {
            SurfaceAction::Entrain { depth: -0.5 }
        };
        let r = m
            .mix(&mut z, 30.0, &k, &[0.0], &[-10.0], &mut hook, &mut rng)
            .unwrap();
        assert_eq!(z[0], -0.5);
        assert_eq!(r.entrained, 1);
    }

    #[test]
    fn same_seed_is_bit_identical() {
        let m = VerticalMixer::new(MixingConfig {
            noise: NoiseKind::Uniform,
            ..MixingConfig::default()
        });
        let k = ProfileField::new(vec![0.0, -20.0], vec![0.01, 0.001, 0.02, 0.002]).unwrap();
        let run = || {
            let mut rng = ChaCha8Rng::seed_from_u64(99);
            let mut z = vec![-3.0, -8.0];
            m.mix(&mut z, 3600.0, &k, &[0.0, -1e-4], &[-30.0, -30.0], &mut Resurface, &mut rng)
                .unwrap();
            z
        };
        let (a, b) = (run(), run());
        assert_eq!(a[0].to_bits(), b[0].to_bits());
        assert_eq!(a[1].to_bits(), b[1].to_bits());
    }

    #[test]
    fn rejects_bad_inputs_without_mutation() {
        let m = mixer();
        let k = ProfileField::uniform(vec![0.01]);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut z = vec![-1.0];
        let err = m
            .mix(&mut z, f64::NAN, &k, &[0.0], &[-10.0], &mut Resurface, &mut rng)
            .unwrap_err();
        assert!(matches!(err, MixingError::InvalidTimeStep { .. }));
        let err = m
            .mix(&mut z, 60.0, &k, &[0.0, 0.0], &[-10.0], &mut Resurface, &mut rng)
            .unwrap_err();
        assert!(matches!(
            err,
            MixingError::LengthMismatch {
                input: "terminal_velocity",
                expected: 1,
                got: 2
            }
        ));
        assert_eq!(z[0], -1.0);
    }

    #[test]
    fn non_finite_row_does_not_disturb_the_others() {
        let m = mixer();
        let k = ProfileField::new(vec![0.0, -50.0], vec![0.01, 0.01, 0.01, 0.01]).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut z = vec![-5.0, -5.0];
        let r = m
            .mix(&mut z, 120.0, &k, &[f64::NAN, 0.0], &[-50.0, -50.0], &mut Resurface, &mut rng)
            .unwrap();
        assert!(r.substeps >= 2);
        assert!(z[0].is_nan());
        assert!(z[1].is_finite() && (-50.0..=0.0).contains(&z[1]));

        // Already non-finite on entry, with a single-level profile.
        let k = ProfileField::uniform(vec![0.01, 0.01]);
        let mut z = vec![f64::NAN, -5.0];
        m.mix(&mut z, 120.0, &k, &[0.0, 0.0], &[-50.0, -50.0], &mut Resurface, &mut rng)
            .unwrap();
        assert!(z[0].is_nan());
        assert!(z[1].is_finite());
    }

    #[test]
    fn nan_entrainment_depth_is_left_for_the_caller() {
        let m = mixer();
        let k = ProfileField::uniform(vec![0.0]);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut z = vec![0.0];
        let mut hook = |_row: usize, _z: f64, _dt: f64, _rng: &mut ChaCha8Rng| {
            SurfaceAction::Entrain { depth: f64::NAN }
        };
        m.mix(&mut z, 180.0, &k, &[0.0], &[-10.0], &mut hook, &mut rng)
            .unwrap();
        assert!(z[0].is_nan());
    }

    #[test]
    fn backward_step_mixes_over_absolute_span() {
        let m = mixer();
        let k = ProfileField::uniform(vec![0.0]);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut z = vec![-10.0];
        m.mix(&mut z, -100.0, &k, &[-0.01], &[-50.0], &mut Resurface, &mut rng)
            .unwrap();
        assert!((z[0] - -11.0).abs() < 1e-9);
    }
}
