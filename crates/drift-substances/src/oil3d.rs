//! Oil droplets in three dimensions.
//!
//! Surface oil is entrained into the water column by breaking waves and
//! rises back with a terminal velocity set by droplet size and the
//! density difference to the surrounding water. Weathering (evaporation,
//! emulsification) is not modelled.
//!
//! Per step, in order:
//! 1. terminal velocity from temperature and salinity at each droplet's
//!    depth (Tkalich & Chan 2002), then vertical mixing with wave
//!    entrainment at the surface,
//! 2. vertical advection,
//! 3. horizontal advection by current, plus wind and Stokes drift for
//!    droplets at the surface.
//!
//! Constructed via the builder pattern: [`Oil3D::builder`].

use rand::Rng;
use rand_chacha::ChaCha8Rng;

use drift_core::variables as var;
use drift_core::{AttributeDef, ElementSchema, HookError};
use drift_mixing::{SurfaceAction, SurfaceHook};
use drift_substance::{SeedContext, StepContext, Substance};

use crate::water::{
    dynamic_viscosity, sea_water_density, significant_wave_height, wave_entrainment_rate,
    wave_period, GRAVITY,
};

/// Oil density in kg/m³.
pub const DENSITY: &str = "density";
/// Droplet diameter in m.
pub const DIAMETER: &str = "diameter";
/// Entrainment length scale in m.
pub const ENTRAINMENT_LENGTH_SCALE: &str = "entrainment_length_scale";
/// Terminal (rise) velocity in m/s, positive up.
pub const TERMINAL_VELOCITY: &str = "terminal_velocity";
/// Fraction of the wind speed surface oil drifts with.
pub const WIND_DRIFT_FACTOR: &str = "wind_drift_factor";

/// Reynolds number above which the high-Re terminal velocity applies.
const HIGH_REYNOLDS: f64 = 50.0;

// ── DropletSpectrum ────────────────────────────────────────────────

/// Power-law droplet size distribution `p(d) ∝ d^s` on `[min, max]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DropletSpectrum {
    /// Smallest diameter in m.
    pub min: f64,
    /// Largest diameter in m.
    pub max: f64,
    /// Exponent `s`.
    pub exponent: f64,
}

impl DropletSpectrum {
    /// Diameter at cumulative probability `u ∈ [0, 1]`.
    pub fn quantile(&self, u: f64) -> f64 {
        let s1 = self.exponent + 1.0;
        let d = if s1.abs() < 1e-12 {
            self.min * (self.max / self.min).powf(u)
        } else {
            let a = self.min.powf(s1);
            let b = self.max.powf(s1);
            (a + u * (b - a)).powf(1.0 / s1)
        };
        d.clamp(self.min, self.max)
    }

    /// Draw one diameter.
    pub fn sample(&self, rng: &mut ChaCha8Rng) -> f64 {
        self.quantile(rng.random::<f64>())
    }
}

// ── Terminal velocity ──────────────────────────────────────────────

/// Terminal velocity (m/s, positive up) of a droplet of `diameter` and
/// `oil_density` in water at temperature `t` and salinity `s`.
///
/// Stokes' law for low Reynolds numbers, switching to the high-Re form
/// `sqrt(16·g·(1 − ρo/ρw)/3 · d)` when `Re > 50`.
pub fn terminal_velocity(diameter: f64, oil_density: f64, t: f64, s: f64) -> f64 {
    let rho_w = sea_water_density(t, s);
    let nu = dynamic_viscosity(t, s) / rho_w;
    let buoyancy = 1.0 - oil_density / rho_w;

    let w = 2.0 * GRAVITY * buoyancy / (9.0 * nu) * diameter * diameter;
    let re = 2.0 * diameter * w / nu;
    if re > HIGH_REYNOLDS {
        let k = 16.0 * GRAVITY * buoyancy / 3.0;
        // Only reached for light oil, so `k > 0`.
        k.sqrt() * diameter.sqrt()
    } else {
        w
    }
}

// ── Surface entrainment ────────────────────────────────────────────

/// Surface hook entraining droplets with a per-row rate.
///
/// A droplet at the surface is entrained during a sub-step of `δt`
/// seconds with probability `min(rate·δt, 1)` and moved to `depth`.
/// With a spectrum, it also gets a new diameter; the last one drawn for
/// a row is reported by [`resized`](Self::resized).
pub struct EntrainmentHook<'a> {
    rates: &'a [f64],
    depth: f64,
    spectrum: Option<DropletSpectrum>,
    resized: Vec<(usize, f64)>,
}

impl<'a> EntrainmentHook<'a> {
    /// Entrain to `depth` (≤ 0) with `rates` in 1/s per row.
    pub fn new(rates: &'a [f64], depth: f64, spectrum: Option<DropletSpectrum>) -> Self {
        Self {
            rates,
            depth,
            spectrum,
            resized: Vec::new(),
        }
    }

    /// New diameters of entrained rows, in entrainment order.
    pub fn resized(&self) -> &[(usize, f64)] {
        &self.resized
    }
}

impl SurfaceHook for EntrainmentHook<'_> {
    fn at_surface(&mut self, row: usize, _z: f64, dt: f64, rng: &mut ChaCha8Rng) -> SurfaceAction {
        let p = (self.rates.get(row).copied().unwrap_or(0.0) * dt).min(1.0);
        let u = rng.random::<f64>();
        if u >= p {
            return SurfaceAction::Stay;
        }
        if let Some(spectrum) = &self.spectrum {
            self.resized.push((row, spectrum.sample(rng)));
        }
        SurfaceAction::Entrain { depth: self.depth }
    }
}

// ── Oil3D ──────────────────────────────────────────────────────────

/// Oil droplets with wave entrainment and buoyant rise.
#[derive(Debug)]
pub struct Oil3D {
    schema: ElementSchema,
    wave_breaking: DropletSpectrum,
    subsea_diameter: (f64, f64),
    keep_droplet_diameter: bool,
    turbulent_mixing: bool,
    vertical_advection: bool,
    stokes_drift: bool,
}

/// Builder for [`Oil3D`].
pub struct Oil3DBuilder {
    density: f64,
    diameter: f64,
    entrainment_length_scale: f64,
    wind_drift_factor: f64,
    wave_breaking: DropletSpectrum,
    subsea_diameter: (f64, f64),
    keep_droplet_diameter: bool,
    turbulent_mixing: bool,
    vertical_advection: bool,
    stokes_drift: bool,
}

impl Oil3D {
    /// Create a builder with medium crude defaults.
    pub fn builder() -> Oil3DBuilder {
        Oil3DBuilder {
            density: 880.0,
            diameter: 1e-5,
            entrainment_length_scale: 0.1,
            wind_drift_factor: 0.02,
            wave_breaking: DropletSpectrum {
                min: 1e-5,
                max: 1e-3,
                exponent: 0.0,
            },
            subsea_diameter: (0.0005, 0.005),
            keep_droplet_diameter: false,
            turbulent_mixing: true,
            vertical_advection: true,
            stokes_drift: true,
        }
    }

    /// Droplet spectrum for wave-entrained oil.
    pub fn wave_breaking_spectrum(&self) -> &DropletSpectrum {
        &self.wave_breaking
    }

    /// Per-element entrainment rates (1/s) from the wave field.
    fn entrainment_rates(&self, ctx: &StepContext<'_>) -> Result<Vec<f64>, HookError> {
        let hs = ctx.var(var::SEA_SURFACE_WAVE_SIGNIFICANT_HEIGHT)?;
        let peak = ctx.var(var::SEA_SURFACE_WAVE_PEAK_PERIOD)?;
        let mean = ctx.var(var::SEA_SURFACE_WAVE_MEAN_PERIOD)?;
        let wx = ctx.var(var::X_WIND)?;
        let wy = ctx.var(var::Y_WIND)?;
        let length = ctx.attr(ENTRAINMENT_LENGTH_SCALE)?;
        Ok((0..ctx.len())
            .map(|i| {
                let wind = wx[i].hypot(wy[i]);
                let h = significant_wave_height(hs[i], wind);
                let t = wave_period(peak[i], mean[i], h);
                wave_entrainment_rate(h, t, length[i])
            })
            .collect())
    }
}

impl Oil3DBuilder {
    /// Default oil density in kg/m³ (default: 880).
    pub fn density(mut self, density: f64) -> Self {
        self.density = density;
        self
    }

    /// Default droplet diameter in m (default: 1e-5).
    pub fn diameter(mut self, diameter: f64) -> Self {
        self.diameter = diameter;
        self
    }

    /// Default entrainment length scale in m (default: 0.1).
    pub fn entrainment_length_scale(mut self, length: f64) -> Self {
        self.entrainment_length_scale = length;
        self
    }

    /// Default wind drift factor (default: 0.02).
    pub fn wind_drift_factor(mut self, factor: f64) -> Self {
        self.wind_drift_factor = factor;
        self
    }

    /// Diameter range and size exponent of droplets entrained by
    /// breaking waves (default: `[1e-5, 1e-3]`, exponent 0).
    pub fn wave_breaking_spectrum(mut self, min: f64, max: f64, exponent: f64) -> Self {
        self.wave_breaking = DropletSpectrum { min, max, exponent };
        self
    }

    /// Diameter range for droplets seeded below the surface without an
    /// explicit diameter (default: `[0.0005, 0.005]`).
    pub fn subsea_diameter(mut self, min: f64, max: f64) -> Self {
        self.subsea_diameter = (min, max);
        self
    }

    /// Keep seeded diameters when droplets are re-entrained (default:
    /// off).
    pub fn keep_droplet_diameter(mut self, keep: bool) -> Self {
        self.keep_droplet_diameter = keep;
        self
    }

    /// Enable vertical mixing and wave entrainment (default: on).
    pub fn turbulent_mixing(mut self, on: bool) -> Self {
        self.turbulent_mixing = on;
        self
    }

    /// Enable vertical advection (default: on).
    pub fn vertical_advection(mut self, on: bool) -> Self {
        self.vertical_advection = on;
        self
    }

    /// Enable Stokes drift of surface oil (default: on).
    pub fn stokes_drift(mut self, on: bool) -> Self {
        self.stokes_drift = on;
        self
    }

    /// Build the substance, validating all configuration.
    ///
    /// # Errors
    ///
    /// Returns `Err` if a default is not positive (the wind drift
    /// factor may be zero), or a diameter range is empty or not
    /// positive, or the size exponent lies outside `[-10, 10]`.
    pub fn build(self) -> Result<Oil3D, String> {
        for (name, v) in [
            (DENSITY, self.density),
            (DIAMETER, self.diameter),
            (ENTRAINMENT_LENGTH_SCALE, self.entrainment_length_scale),
        ] {
            if !v.is_finite() || v <= 0.0 {
                return Err(format!("{name} must be finite and > 0, got {v}"));
            }
        }
        if !self.wind_drift_factor.is_finite() || self.wind_drift_factor < 0.0 {
            return Err(format!(
                "wind_drift_factor must be finite and >= 0, got {}",
                self.wind_drift_factor
            ));
        }
        let DropletSpectrum { min, max, exponent } = self.wave_breaking;
        check_range("wave breaking diameter", min, max)?;
        if !(-10.0..=10.0).contains(&exponent) {
            return Err(format!("droplet size exponent must be in [-10, 10], got {exponent}"));
        }
        check_range("subsea diameter", self.subsea_diameter.0, self.subsea_diameter.1)?;

        let schema = ElementSchema::new(vec![
            AttributeDef::with_default(DENSITY, "kg m-3", self.density),
            AttributeDef::with_default(DIAMETER, "m", self.diameter),
            AttributeDef::with_default(ENTRAINMENT_LENGTH_SCALE, "m", self.entrainment_length_scale),
            AttributeDef::with_default(TERMINAL_VELOCITY, "m s-1", 0.0),
            AttributeDef::with_default(WIND_DRIFT_FACTOR, "1", self.wind_drift_factor),
        ])?;
        Ok(Oil3D {
            schema,
            wave_breaking: self.wave_breaking,
            subsea_diameter: self.subsea_diameter,
            keep_droplet_diameter: self.keep_droplet_diameter,
            turbulent_mixing: self.turbulent_mixing,
            vertical_advection: self.vertical_advection,
            stokes_drift: self.stokes_drift,
        })
    }
}

fn check_range(what: &str, min: f64, max: f64) -> Result<(), String> {
    if min.is_finite() && max.is_finite() && min > 0.0 && min < max {
        Ok(())
    } else {
        Err(format!("{what} range must satisfy 0 < min < max, got [{min}, {max}]"))
    }
}

impl Substance for Oil3D {
    fn name(&self) -> &str {
        "Oil3D"
    }

    fn schema(&self) -> &ElementSchema {
        &self.schema
    }

    fn required_variables(&self) -> Vec<&str> {
        let mut vars = vec![
            var::X_SEA_WATER_VELOCITY,
            var::Y_SEA_WATER_VELOCITY,
            var::X_WIND,
            var::Y_WIND,
            var::SEA_FLOOR_DEPTH_BELOW_SEA_LEVEL,
        ];
        if self.turbulent_mixing {
            vars.extend([
                var::SEA_SURFACE_WAVE_SIGNIFICANT_HEIGHT,
                var::SEA_SURFACE_WAVE_PEAK_PERIOD,
                var::SEA_SURFACE_WAVE_MEAN_PERIOD,
            ]);
        }
        if self.stokes_drift {
            vars.extend([
                var::SEA_SURFACE_WAVE_STOKES_DRIFT_X_VELOCITY,
                var::SEA_SURFACE_WAVE_STOKES_DRIFT_Y_VELOCITY,
            ]);
        }
        if self.vertical_advection {
            vars.push(var::UPWARD_SEA_WATER_VELOCITY);
        }
        vars
    }

    fn required_profiles(&self) -> Vec<&str> {
        if self.turbulent_mixing {
            vec![
                var::SEA_WATER_TEMPERATURE,
                var::SEA_WATER_SALINITY,
                var::OCEAN_VERTICAL_DIFFUSIVITY,
            ]
        } else {
            Vec::new()
        }
    }

    fn seed_attributes(&self, seed: &mut SeedContext<'_>) -> Vec<(String, Vec<f64>)> {
        if seed.is_supplied(DIAMETER) || !seed.z.iter().any(|&z| z < 0.0) {
            return Vec::new();
        }
        let (min, max) = self.subsea_diameter;
        log::info!(
            "using droplet diameters between {min} and {max} m for {} element(s) seeded below the surface",
            seed.count
        );
        let diameters = (0..seed.count)
            .map(|_| seed.rng.random_range(min..max))
            .collect();
        vec![(DIAMETER.to_string(), diameters)]
    }

    fn prepare_step(&self, ctx: &mut StepContext<'_>) -> Result<(), HookError> {
        if !self.turbulent_mixing {
            return Ok(());
        }
        let temperature = ctx.env().require_profile(var::SEA_WATER_TEMPERATURE)?;
        let salinity = ctx.env().require_profile(var::SEA_WATER_SALINITY)?;
        let density = ctx.attr(DENSITY)?;
        let diameter = ctx.attr(DIAMETER)?;
        let z = &ctx.state().z;
        let w: Vec<f64> = (0..ctx.len())
            .map(|i| {
                let t = temperature.value_at(i, z[i]);
                let s = salinity.value_at(i, z[i]);
                terminal_velocity(diameter[i], density[i], t, s)
            })
            .collect();
        ctx.attr_mut(TERMINAL_VELOCITY)?.copy_from_slice(&w);
        Ok(())
    }

    fn update(&self, ctx: &mut StepContext<'_>) -> Result<(), HookError> {
        if self.turbulent_mixing {
            let rates = self.entrainment_rates(ctx)?;
            let w = ctx.attr(TERMINAL_VELOCITY)?.to_vec();
            let depth = -0.5 * ctx.mixer().config().vertical_resolution;
            let spectrum = (!self.keep_droplet_diameter).then_some(self.wave_breaking);
            let mut hook = EntrainmentHook::new(&rates, depth, spectrum);
            ctx.mix_vertically(&w, &mut hook)?;
            let diameter = ctx.attr_mut(DIAMETER)?;
            for &(row, d) in hook.resized() {
                diameter[row] = d;
            }
        }
        if self.vertical_advection {
            ctx.advect_vertical()?;
        }

        ctx.advect_ocean_current()?;
        // Wind and Stokes drift act on surface oil only.
        let at_surface: Vec<f64> = ctx
            .state()
            .z
            .iter()
            .map(|&z| if z >= 0.0 { 1.0 } else { 0.0 })
            .collect();
        let factor: Vec<f64> = ctx
            .attr(WIND_DRIFT_FACTOR)?
            .iter()
            .zip(&at_surface)
            .map(|(f, s)| f * s)
            .collect();
        ctx.advect_wind(&factor)?;
        if self.stokes_drift {
            let u = ctx.var(var::SEA_SURFACE_WAVE_STOKES_DRIFT_X_VELOCITY)?;
            let v = ctx.var(var::SEA_SURFACE_WAVE_STOKES_DRIFT_Y_VELOCITY)?;
            let u: Vec<f64> = u.iter().zip(&at_surface).map(|(u, s)| u * s).collect();
            let v: Vec<f64> = v.iter().zip(&at_surface).map(|(v, s)| v * s).collect();
            ctx.advect(&u, &v)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;

    #[test]
    fn small_droplets_follow_stokes_law() {
        let d = 1e-5;
        let w = terminal_velocity(d, 880.0, 10.0, 34.0);
        let rho_w = sea_water_density(10.0, 34.0);
        let nu = dynamic_viscosity(10.0, 34.0) / rho_w;
        let expected = 2.0 * GRAVITY * (1.0 - 880.0 / rho_w) / (9.0 * nu) * d * d;
        assert!((w - expected).abs() < 1e-15);
        assert!(w > 0.0);
    }

    #[test]
    fn large_droplets_switch_to_high_reynolds_form() {
        let d = 0.005;
        let w = terminal_velocity(d, 880.0, 10.0, 34.0);
        let rho_w = sea_water_density(10.0, 34.0);
        let expected = (16.0 * GRAVITY * (1.0 - 880.0 / rho_w) / 3.0).sqrt() * d.sqrt();
        assert!((w - expected).abs() < 1e-12);
    }

    #[test]
    fn heavy_droplets_sink() {
        assert!(terminal_velocity(1e-5, 1100.0, 10.0, 34.0) < 0.0);
    }

    #[test]
    fn spectrum_quantiles() {
        let flat = DropletSpectrum {
            min: 1e-5,
            max: 1e-3,
            exponent: 0.0,
        };
        assert!((flat.quantile(0.0) - 1e-5).abs() < 1e-15);
        assert!((flat.quantile(1.0) - 1e-3).abs() < 1e-15);
        assert!((flat.quantile(0.5) - 0.000505).abs() < 1e-12);

        let log = DropletSpectrum {
            exponent: -1.0,
            ..flat
        };
        assert!((log.quantile(0.5) - 1e-4).abs() < 1e-12);

        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for _ in 0..100 {
            let d = log.sample(&mut rng);
            assert!((1e-5..=1e-3).contains(&d));
        }
    }

    #[test]
    fn entrainment_probability_is_rate_times_substep() {
        let rates = [0.0, 10.0];
        let spectrum = DropletSpectrum {
            min: 1e-5,
            max: 1e-3,
            exponent: 0.0,
        };
        let mut hook = EntrainmentHook::new(&rates, -0.5, Some(spectrum));
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        // Rate 0 never entrains; rate·dt ≥ 1 always does.
        assert_eq!(hook.at_surface(0, 0.0, 60.0, &mut rng), SurfaceAction::Stay);
        assert_eq!(
            hook.at_surface(1, 0.0, 60.0, &mut rng),
            SurfaceAction::Entrain { depth: -0.5 }
        );
        assert_eq!(hook.resized().len(), 1);
        assert_eq!(hook.resized()[0].0, 1);
    }

    #[test]
    fn builder_rejects_bad_ranges() {
        assert!(Oil3D::builder().density(0.0).build().is_err());
        assert!(Oil3D::builder().wave_breaking_spectrum(1e-3, 1e-5, 0.0).build().is_err());
        assert!(Oil3D::builder().wave_breaking_spectrum(1e-5, 1e-3, 11.0).build().is_err());
        assert!(Oil3D::builder().subsea_diameter(0.0, 0.005).build().is_err());
        assert!(Oil3D::builder().build().is_ok());
    }

    #[test]
    fn required_inputs_follow_processes() {
        let oil = Oil3D::builder().build().unwrap();
        assert_eq!(oil.required_profiles().len(), 3);
        assert!(oil
            .required_variables()
            .contains(&var::SEA_SURFACE_WAVE_PEAK_PERIOD));

        let oil = Oil3D::builder()
            .turbulent_mixing(false)
            .stokes_drift(false)
            .vertical_advection(false)
            .build()
            .unwrap();
        assert!(oil.required_profiles().is_empty());
        assert_eq!(oil.required_variables().len(), 5);
    }

    #[test]
    fn subsea_seeding_draws_diameters() {
        let oil = Oil3D::builder().build().unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let z = [-10.0, 0.0, -5.0];
        let mut seed = SeedContext {
            count: 3,
            z: &z,
            supplied: &["lon", "lat", "z"],
            rng: &mut rng,
        };
        let extra = oil.seed_attributes(&mut seed);
        assert_eq!(extra.len(), 1);
        assert_eq!(extra[0].0, DIAMETER);
        assert!(extra[0].1.iter().all(|d| (0.0005..0.005).contains(d)));

        let mut seed = SeedContext {
            count: 3,
            z: &z,
            supplied: &["lon", "lat", "z", "diameter"],
            rng: &mut rng,
        };
        assert!(oil.seed_attributes(&mut seed).is_empty());

        let surface = [0.0; 3];
        let mut seed = SeedContext {
            count: 3,
            z: &surface,
            supplied: &["lon", "lat"],
            rng: &mut rng,
        };
        assert!(oil.seed_attributes(&mut seed).is_empty());
    }

    proptest! {
        #[test]
        fn spectrum_quantile_is_monotone_within_bounds(
            min in 1e-6f64..1e-4,
            ratio in 1.5f64..1000.0,
            exponent in -3.0f64..3.0,
            u1 in 0.0f64..=1.0,
            u2 in 0.0f64..=1.0,
        ) {
            let spectrum = DropletSpectrum { min, max: min * ratio, exponent };
            let (lo, hi) = if u1 <= u2 { (u1, u2) } else { (u2, u1) };
            let (d_lo, d_hi) = (spectrum.quantile(lo), spectrum.quantile(hi));
            prop_assert!(d_lo >= min && d_hi <= spectrum.max);
            prop_assert!(d_lo <= d_hi * (1.0 + 1e-12), "{d_lo} > {d_hi}");
        }

        #[test]
        fn buoyancy_sets_the_direction(
            diameter in 1e-6f64..1e-2,
            light in 800.0f64..950.0,
            heavy in 1060.0f64..1200.0,
            t in 0.0f64..25.0,
        ) {
            prop_assert!(terminal_velocity(diameter, light, t, 34.0) > 0.0);
            prop_assert!(terminal_velocity(diameter, heavy, t, 34.0) < 0.0);
        }
    }
}
