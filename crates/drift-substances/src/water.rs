//! Sea water properties and wave parameters.

/// Gravitational acceleration in m/s².
pub const GRAVITY: f64 = 9.81;

/// Kinematic viscosity of sea water used for wave damping, in m²/s.
pub const WAVE_KINEMATIC_VISCOSITY: f64 = 1.0e-6;

/// Sea water density in kg/m³ at the surface from temperature `t` (°C)
/// and salinity `s` (PSU), UNESCO 1981 equation of state.
pub fn sea_water_density(t: f64, s: f64) -> f64 {
    const R4: f64 = 4.8314e-4;
    const DR350: f64 = 28.106331;

    let r1 = ((((6.536332e-9 * t - 1.120083e-6) * t + 1.001685e-4) * t - 9.095290e-3) * t
        + 6.793952e-2)
        * t
        - 28.263737;
    let r2 = (((5.3875e-9 * t - 8.2467e-7) * t + 7.6438e-5) * t - 4.0899e-3) * t + 8.24493e-1;
    let r3 = (-1.6546e-6 * t + 1.0227e-4) * t - 5.72466e-3;
    let sigma = r1 + (R4 * s + r3 * s.sqrt() + r2) * s;
    sigma + DR350 + 1000.0
}

/// Dynamic viscosity of sea water in kg/(m·s).
pub fn dynamic_viscosity(t: f64, s: f64) -> f64 {
    0.001 * (1.7915 - 0.0538 * t + 0.007 * t * t - 0.0023 * s)
}

/// Significant wave height, estimated from wind speed where no wave
/// data is available (`hs ≤ 0`).
pub fn significant_wave_height(hs: f64, wind_speed: f64) -> f64 {
    if hs > 0.0 {
        hs
    } else {
        0.0246 * wind_speed * wind_speed
    }
}

/// Wave period: the peak period if known, else the mean period, else
/// estimated from the wave height.
pub fn wave_period(peak: f64, mean: f64, hs: f64) -> f64 {
    if peak > 0.0 {
        peak
    } else if mean > 0.0 {
        mean
    } else {
        3.85 * hs.max(0.0).sqrt()
    }
}

/// Wave energy damping coefficient γ = 2νk² for deep water waves of
/// period `period`.
pub fn wave_damping_coefficient(period: f64) -> f64 {
    let omega = 2.0 * std::f64::consts::PI / period;
    let k = omega * omega / GRAVITY;
    2.0 * WAVE_KINEMATIC_VISCOSITY * k * k
}

/// Entrainment rate (1/s) of surface oil by breaking waves,
/// Tkalich & Chan (2002): `kb·ω·γ·Hs / (16·α·L)`.
///
/// Zero when there are no waves.
pub fn wave_entrainment_rate(hs: f64, period: f64, length_scale: f64) -> f64 {
    const KB: f64 = 0.4;
    const ALPHA: f64 = 1.5;
    if hs <= 0.0 || period <= 0.0 || length_scale <= 0.0 {
        return 0.0;
    }
    let omega = 2.0 * std::f64::consts::PI / period;
    KB * omega * wave_damping_coefficient(period) * hs / (16.0 * ALPHA * length_scale)
}
