//! What happens when an element reaches the surface during mixing.

use rand_chacha::ChaCha8Rng;

/// Decision returned by a [`SurfaceHook`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SurfaceAction {
    /// Settle at the surface (`z = 0`).
    Stay,
    /// Mirror the overshoot back below the surface (`z = -z`).
    Reflect,
    /// Move the element to the given depth (≤ 0).
    Entrain {
        /// Target depth in metres.
        depth: f64,
    },
}

/// Callback invoked by the integrator whenever an element's depth
/// reaches or exceeds the surface after a sub-step.
///
/// Substance-specific code implements this to choose between
/// resurfacing and re-entrainment. The hook may draw from `rng`; calls
/// happen in ascending row order within each sub-step, so draws stay
/// reproducible.
pub trait SurfaceHook {
    /// Decide the fate of row `row`, whose updated depth is `z ≥ 0`,
    /// after a sub-step of `dt` seconds.
    fn at_surface(&mut self, row: usize, z: f64, dt: f64, rng: &mut ChaCha8Rng) -> SurfaceAction;
}

/// Every element that reaches the surface stays there.
#[derive(Clone, Copy, Debug, Default)]
pub struct Resurface;

impl SurfaceHook for Resurface {
    fn at_surface(&mut self, _row: usize, _z: f64, _dt: f64, _rng: &mut ChaCha8Rng) -> SurfaceAction {
        SurfaceAction::Stay
    }
}

/// The surface is a reflecting boundary.
#[derive(Clone, Copy, Debug, Default)]
pub struct ReflectAtSurface;

impl SurfaceHook for ReflectAtSurface {
    fn at_surface(&mut self, _row: usize, _z: f64, _dt: f64, _rng: &mut ChaCha8Rng) -> SurfaceAction {
        SurfaceAction::Reflect
    }
}

impl<F> SurfaceHook for F
where
    F: FnMut(usize, f64, f64, &mut ChaCha8Rng) -> SurfaceAction,
{
    fn at_surface(&mut self, row: usize, z: f64, dt: f64, rng: &mut ChaCha8Rng) -> SurfaceAction {
        self(row, z, dt, rng)
    }
}
