//! Passive tracer substance.
//!
//! Elements follow the ocean current, optionally pushed by the wind and
//! by Stokes drift, moved vertically by the upward current, and mixed
//! through the water column. Elements that reach the surface during
//! mixing stay there.
//!
//! Constructed via the builder pattern: [`PassiveTracer::builder`].

use drift_core::variables as var;
use drift_core::{AttributeDef, ElementSchema, HookError};
use drift_mixing::Resurface;
use drift_substance::{StepContext, Substance};

/// Attribute holding the fraction of the wind speed an element drifts
/// with.
pub const WIND_DRIFT_FACTOR: &str = "wind_drift_factor";
/// Attribute holding the vertical velocity of an element relative to
/// the water, in m/s (positive up).
pub const TERMINAL_VELOCITY: &str = "terminal_velocity";

/// A tracer moved only by the environment.
#[derive(Debug)]
pub struct PassiveTracer {
    schema: ElementSchema,
    wind_drift: bool,
    stokes_drift: bool,
    vertical_advection: bool,
    turbulent_mixing: bool,
}

/// Builder for [`PassiveTracer`].
pub struct PassiveTracerBuilder {
    wind_drift_factor: f64,
    wind_drift: bool,
    stokes_drift: bool,
    vertical_advection: bool,
    turbulent_mixing: bool,
}

impl PassiveTracer {
    /// Create a builder. By default only the ocean current and a 2 %
    /// wind drift move the elements.
    pub fn builder() -> PassiveTracerBuilder {
        PassiveTracerBuilder {
            wind_drift_factor: 0.02,
            wind_drift: true,
            stokes_drift: false,
            vertical_advection: false,
            turbulent_mixing: false,
        }
    }
}

impl PassiveTracerBuilder {
    /// Default wind drift factor for elements seeded without one
    /// (default: 0.02).
    pub fn wind_drift_factor(mut self, factor: f64) -> Self {
        self.wind_drift_factor = factor;
        self
    }

    /// Enable drift with the wind (default: on).
    pub fn wind_drift(mut self, on: bool) -> Self {
        self.wind_drift = on;
        self
    }

    /// Enable Stokes drift (default: off).
    pub fn stokes_drift(mut self, on: bool) -> Self {
        self.stokes_drift = on;
        self
    }

    /// Enable vertical advection by the upward current (default: off).
    pub fn vertical_advection(mut self, on: bool) -> Self {
        self.vertical_advection = on;
        self
    }

    /// Enable vertical turbulent mixing (default: off).
    pub fn turbulent_mixing(mut self, on: bool) -> Self {
        self.turbulent_mixing = on;
        self
    }

    /// Build the substance.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the wind drift factor is negative or not finite.
    pub fn build(self) -> Result<PassiveTracer, String> {
        if !self.wind_drift_factor.is_finite() || self.wind_drift_factor < 0.0 {
            return Err(format!(
                "wind_drift_factor must be finite and >= 0, got {}",
                self.wind_drift_factor
            ));
        }
        let schema = ElementSchema::new(vec![
            AttributeDef::with_default(WIND_DRIFT_FACTOR, "1", self.wind_drift_factor),
            AttributeDef::with_default(TERMINAL_VELOCITY, "m s-1", 0.0),
        ])?;
        Ok(PassiveTracer {
            schema,
            wind_drift: self.wind_drift,
            stokes_drift: self.stokes_drift,
            vertical_advection: self.vertical_advection,
            turbulent_mixing: self.turbulent_mixing,
        })
    }
}

impl Substance for PassiveTracer {
    fn name(&self) -> &str {
        "PassiveTracer"
    }

    fn schema(&self) -> &ElementSchema {
        &self.schema
    }

    fn required_variables(&self) -> Vec<&str> {
        let mut vars = vec![var::X_SEA_WATER_VELOCITY, var::Y_SEA_WATER_VELOCITY];
        if self.wind_drift {
            vars.extend([var::X_WIND, var::Y_WIND]);
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
        if self.vertical_advection || self.turbulent_mixing {
            vars.push(var::SEA_FLOOR_DEPTH_BELOW_SEA_LEVEL);
        }
        vars
    }

    fn required_profiles(&self) -> Vec<&str> {
        if self.turbulent_mixing {
            vec![var::OCEAN_VERTICAL_DIFFUSIVITY]
        } else {
            Vec::new()
        }
    }

    fn update(&self, ctx: &mut StepContext<'_>) -> Result<(), HookError> {
        if self.turbulent_mixing {
            let w = ctx.attr(TERMINAL_VELOCITY)?.to_vec();
            ctx.mix_vertically(&w, &mut Resurface)?;
        }
        if self.vertical_advection {
            ctx.advect_vertical()?;
        }
        ctx.advect_ocean_current()?;
        if self.wind_drift {
            let factor = ctx.attr(WIND_DRIFT_FACTOR)?.to_vec();
            ctx.advect_wind(&factor)?;
        }
        if self.stokes_drift {
            ctx.advect_stokes_drift()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_validates_wind_drift_factor() {
        assert!(PassiveTracer::builder().wind_drift_factor(-0.1).build().is_err());
        assert!(PassiveTracer::builder().wind_drift_factor(f64::NAN).build().is_err());
        let t = PassiveTracer::builder().wind_drift_factor(0.03).build().unwrap();
        let id = t.schema().id(WIND_DRIFT_FACTOR).unwrap();
        assert_eq!(t.schema().def(id).unwrap().default, Some(0.03));
    }

    #[test]
    fn required_variables_follow_processes() {
        let t = PassiveTracer::builder().wind_drift(false).build().unwrap();
        assert_eq!(
            t.required_variables(),
            vec![var::X_SEA_WATER_VELOCITY, var::Y_SEA_WATER_VELOCITY]
        );
        assert!(t.required_profiles().is_empty());

        let t = PassiveTracer::builder()
            .stokes_drift(true)
            .turbulent_mixing(true)
            .build()
            .unwrap();
        let vars = t.required_variables();
        assert!(vars.contains(&var::X_WIND));
        assert!(vars.contains(&var::SEA_SURFACE_WAVE_STOKES_DRIFT_Y_VELOCITY));
        assert!(vars.contains(&var::SEA_FLOOR_DEPTH_BELOW_SEA_LEVEL));
        assert!(!vars.contains(&var::UPWARD_SEA_WATER_VELOCITY));
        assert_eq!(t.required_profiles(), vec![var::OCEAN_VERTICAL_DIFFUSIVITY]);
    }
}
