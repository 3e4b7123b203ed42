//! Horizontal and vertical advection of element positions.
//!
//! Velocities are in m/s (eastward, northward, upward); positions are
//! degrees and metres. The functions here work on plain slices; the
//! environment-aware wrappers live on
//! [`StepContext`](crate::StepContext).

use drift_core::geo::{metres_to_degrees, wrap_longitude};
use drift_core::Point;

/// Time integration scheme for horizontal advection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AdvectionScheme {
    /// Forward Euler: velocity sampled at the start position.
    #[default]
    Euler,
    /// Second-order Runge–Kutta: velocity sampled at the midpoint of
    /// an Euler half-step, half a time step later.
    RungeKutta2,
}

/// Longitudes leaving `[-180, 180]` wrap back into it, the same range
/// seeding produces.
fn shifted_longitude(lon: f64, dlon: f64) -> f64 {
    let moved = lon + dlon;
    if (-180.0..=180.0).contains(&moved) {
        moved
    } else {
        wrap_longitude(moved)
    }
}

/// Move each element by `(u, v)·dt`.
pub fn displace(lon: &mut [f64], lat: &mut [f64], u: &[f64], v: &[f64], dt: f64) {
    for i in 0..lon.len() {
        let (dlon, dlat) = metres_to_degrees(u[i] * dt, v[i] * dt, lat[i]);
        lon[i] = shifted_longitude(lon[i], dlon);
        lat[i] += dlat;
    }
}

/// Positions reached after half a time step at velocity `(u, v)`.
pub fn midpoints(lon: &[f64], lat: &[f64], z: &[f64], u: &[f64], v: &[f64], dt: f64) -> Vec<Point> {
    (0..lon.len())
        .map(|i| {
            let (dlon, dlat) = metres_to_degrees(0.5 * u[i] * dt, 0.5 * v[i] * dt, lat[i]);
            Point::new(shifted_longitude(lon[i], dlon), lat[i] + dlat, z[i])
        })
        .collect()
}

/// Move depths by `w·dt`, keeping each inside `[-floor_depth, 0]`.
///
/// `floor_depth` is the positive sea floor depth below each element.
pub fn vertical(z: &mut [f64], w: &[f64], floor_depth: &[f64], dt: f64) {
    for i in 0..z.len() {
        let floor = -floor_depth[i].max(0.0);
        let moved = z[i] + w[i] * dt;
        z[i] = if moved.is_nan() { moved } else { moved.clamp(floor, 0.0) };
    }
}
