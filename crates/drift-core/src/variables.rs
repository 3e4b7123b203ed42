//! Standard CF names of the environmental variables the engine and the
//! bundled substances understand.

/// Eastward ocean current (m/s).
pub const X_SEA_WATER_VELOCITY: &str = "x_sea_water_velocity";
/// Northward ocean current (m/s).
pub const Y_SEA_WATER_VELOCITY: &str = "y_sea_water_velocity";
/// Upward ocean current (m/s).
pub const UPWARD_SEA_WATER_VELOCITY: &str = "upward_sea_water_velocity";
/// Eastward wind at 10 m (m/s).
pub const X_WIND: &str = "x_wind";
/// Northward wind at 10 m (m/s).
pub const Y_WIND: &str = "y_wind";
/// Significant wave height (m).
pub const SEA_SURFACE_WAVE_SIGNIFICANT_HEIGHT: &str = "sea_surface_wave_significant_height";
/// Eastward Stokes drift (m/s).
pub const SEA_SURFACE_WAVE_STOKES_DRIFT_X_VELOCITY: &str =
    "sea_surface_wave_stokes_drift_x_velocity";
/// Northward Stokes drift (m/s).
pub const SEA_SURFACE_WAVE_STOKES_DRIFT_Y_VELOCITY: &str =
    "sea_surface_wave_stokes_drift_y_velocity";
/// Peak wave period (s).
pub const SEA_SURFACE_WAVE_PEAK_PERIOD: &str =
    "sea_surface_wave_period_at_variance_spectral_density_maximum";
/// Mean wave period from the second frequency moment (s).
pub const SEA_SURFACE_WAVE_MEAN_PERIOD: &str =
    "sea_surface_wave_mean_period_from_variance_spectral_density_second_frequency_moment";
/// Sea ice concentration (fraction).
pub const SEA_ICE_AREA_FRACTION: &str = "sea_ice_area_fraction";
/// Land (1) / sea (0) mask.
pub const LAND_BINARY_MASK: &str = "land_binary_mask";
/// Positive depth of the sea floor below sea level (m).
pub const SEA_FLOOR_DEPTH_BELOW_SEA_LEVEL: &str = "sea_floor_depth_below_sea_level";
/// Vertical eddy diffusivity (m²/s).
pub const OCEAN_VERTICAL_DIFFUSIVITY: &str = "ocean_vertical_diffusivity";
/// Sea water temperature (°C).
pub const SEA_WATER_TEMPERATURE: &str = "sea_water_temperature";
/// Sea water salinity (PSU).
pub const SEA_WATER_SALINITY: &str = "sea_water_salinity";
