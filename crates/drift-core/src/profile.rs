//! Vertical profiles sampled on fixed depth levels.
//!
//! A [`ProfileField`] holds one column of values per element, all
//! sampled on the same depth levels. Values between levels are linearly
//! interpolated; outside the level range the nearest level is used.

/// Half-width in metres of the centred difference used by
/// [`ProfileField::gradient_at`].
pub const GRADIENT_HALF_STEP: f64 = 1e-3;

/// Per-element vertical profiles on shared depth levels.
///
/// Levels are ordered from the shallowest (closest to 0) to the deepest,
/// strictly decreasing. Values are stored element-major:
/// `values[element * levels + level]`.
#[derive(Clone, Debug, PartialEq)]
pub struct ProfileField {
    depths: Vec<f64>,
    values: Vec<f64>,
}

impl ProfileField {
    /// Construct from depth levels and element-major values.
    ///
    /// # Errors
    ///
    /// Returns `Err` if `depths` is empty, not strictly decreasing, or
    /// non-finite, or if `values.len()` is not a multiple of the level
    /// count.
    pub fn new(depths: Vec<f64>, values: Vec<f64>) -> Result<Self, String> {
        if depths.is_empty() {
            return Err("profile needs at least one depth level".to_string());
        }
        if depths.iter().any(|d| !d.is_finite()) {
            return Err("profile depth levels must be finite".to_string());
        }
        if depths.windows(2).any(|w| w[1] >= w[0]) {
            return Err("profile depth levels must be strictly decreasing".to_string());
        }
        if values.len() % depths.len() != 0 {
            return Err(format!(
                "profile value count {} is not a multiple of level count {}",
                values.len(),
                depths.len()
            ));
        }
        Ok(Self { depths, values })
    }

    /// A depth-independent profile: one value per element on a single
    /// level at the surface.
    pub fn uniform(values: Vec<f64>) -> Self {
        Self {
            depths: vec![0.0],
            values,
        }
    }

    /// Depth levels from `z_top` down to `z_bottom` spaced by `resolution`.
    ///
    /// The bottom level is always included, even when the range is not a
    /// multiple of the resolution. Returns a single level when the range
    /// is empty or the resolution is not positive.
    pub fn levels_between(z_top: f64, z_bottom: f64, resolution: f64) -> Vec<f64> {
        if resolution.is_nan() || resolution <= 0.0 || z_bottom >= z_top {
            return vec![z_top];
        }
        let n = ((z_top - z_bottom) / resolution).ceil() as usize;
        let mut levels: Vec<f64> = (0..n)
            .map(|i| z_top - i as f64 * resolution)
            .filter(|&z| z > z_bottom)
            .collect();
        levels.push(z_bottom);
        levels
    }

    /// Number of element columns.
    pub fn len(&self) -> usize {
        self.values.len() / self.depths.len()
    }

    /// Whether the field holds no columns.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Shared depth levels.
    pub fn depths(&self) -> &[f64] {
        &self.depths
    }

    /// Profile column for element `i`.
    pub fn column(&self, i: usize) -> &[f64] {
        let n = self.depths.len();
        &self.values[i * n..(i + 1) * n]
    }

    /// Largest value across all columns (0 for an empty field).
    pub fn max_value(&self) -> f64 {
        self.values
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold(0.0, f64::max)
    }

    /// Linearly interpolated value of column `i` at depth `z`.
    pub fn value_at(&self, i: usize, z: f64) -> f64 {
        interpolate(&self.depths, self.column(i), z)
    }

    /// Vertical derivative `dV/dz` of column `i` at depth `z`, from a
    /// centred difference of the interpolant.
    pub fn gradient_at(&self, i: usize, z: f64) -> f64 {
        if self.depths.len() < 2 {
            return 0.0;
        }
        let col = self.column(i);
        let above = interpolate(&self.depths, col, z + GRADIENT_HALF_STEP);
        let below = interpolate(&self.depths, col, z - GRADIENT_HALF_STEP);
        (above - below) / (2.0 * GRADIENT_HALF_STEP)
    }

    /// Keep only the columns whose `keep` flag is set, preserving order.
    pub fn retain(&mut self, keep: &[bool]) {
        let n = self.depths.len();
        let mut out = Vec::with_capacity(self.values.len());
        for (i, &k) in keep.iter().enumerate() {
            if k {
                out.extend_from_slice(&self.values[i * n..(i + 1) * n]);
            }
        }
        self.values = out;
    }

    /// A new field made of the listed columns, in the given order.
    pub fn select(&self, indices: &[usize]) -> Self {
        let n = self.depths.len();
        let mut values = Vec::with_capacity(indices.len() * n);
        for &i in indices {
            values.extend_from_slice(self.column(i));
        }
        Self {
            depths: self.depths.clone(),
            values,
        }
    }
}

/// Linear interpolation of `column` (sampled on strictly decreasing
/// `depths`) at depth `z`, clamped to the end levels. A NaN depth
/// yields NaN.
pub fn interpolate(depths: &[f64], column: &[f64], z: f64) -> f64 {
    debug_assert_eq!(depths.len(), column.len());
    if z.is_nan() {
        return f64::NAN;
    }
    let last = depths.len() - 1;
    if z >= depths[0] {
        return column[0];
    }
    if z <= depths[last] {
        return column[last];
    }
    // First level at or below z; depths are decreasing.
    let lower = depths.partition_point(|&d| d > z);
    let upper = lower - 1;
    let (z_up, z_lo) = (depths[upper], depths[lower]);
    let w = (z_up - z) / (z_up - z_lo);
    column[upper] * (1.0 - w) + column[lower] * w
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn linear_profile() -> ProfileField {
        // Two elements: K = 0.01 at surface to 0.11 at -10 m, and constant 0.5.
        ProfileField::new(
            vec![0.0, -5.0, -10.0],
            vec![0.01, 0.06, 0.11, 0.5, 0.5, 0.5],
        )
        .unwrap()
    }

    #[test]
    fn interpolates_between_levels() {
        let p = linear_profile();
        assert_eq!(p.len(), 2);
        assert!((p.value_at(0, -2.5) - 0.035).abs() < 1e-12);
        assert!((p.value_at(0, -7.5) - 0.085).abs() < 1e-12);
        assert_eq!(p.value_at(1, -3.3), 0.5);
    }

    #[test]
    fn clamps_outside_levels() {
        let p = linear_profile();
        assert_eq!(p.value_at(0, 1.0), 0.01);
        assert_eq!(p.value_at(0, -50.0), 0.11);
    }

    #[test]
    fn gradient_of_linear_profile() {
        let p = linear_profile();
        // dK/dz with z positive upward: K decreases upward.
        let g = p.gradient_at(0, -4.0);
        assert!((g - (-0.01)).abs() < 1e-9, "gradient {g}");
        assert_eq!(p.gradient_at(1, -4.0), 0.0);
    }

    #[test]
    fn uniform_profile_is_constant() {
        let p = ProfileField::uniform(vec![0.02, 0.03]);
        assert_eq!(p.value_at(0, -100.0), 0.02);
        assert_eq!(p.value_at(1, 0.0), 0.03);
        assert_eq!(p.gradient_at(0, -1.0), 0.0);
        assert_eq!(p.max_value(), 0.03);
    }

    #[test]
    fn nan_depth_interpolates_to_nan() {
        let p = linear_profile();
        assert!(p.value_at(0, f64::NAN).is_nan());
        assert!(p.gradient_at(0, f64::NAN).is_nan());
        let u = ProfileField::uniform(vec![0.02]);
        assert!(u.value_at(0, f64::NAN).is_nan());
    }

    #[test]
    fn rejects_malformed_levels() {
        assert!(ProfileField::new(vec![], vec![]).is_err());
        assert!(ProfileField::new(vec![0.0, 0.0], vec![1.0, 1.0]).is_err());
        assert!(ProfileField::new(vec![-1.0, 0.0], vec![1.0, 1.0]).is_err());
        assert!(ProfileField::new(vec![0.0, -1.0], vec![1.0, 1.0, 1.0]).is_err());
    }

    #[test]
    fn levels_include_bottom() {
        assert_eq!(
            ProfileField::levels_between(0.0, -10.0, 4.0),
            vec![0.0, -4.0, -8.0, -10.0]
        );
        assert_eq!(
            ProfileField::levels_between(0.0, -10.0, 5.0),
            vec![0.0, -5.0, -10.0]
        );
        assert_eq!(ProfileField::levels_between(0.0, 0.0, 1.0), vec![0.0]);
    }

    #[test]
    fn retain_and_select_columns() {
        let mut p = linear_profile();
        let sel = p.select(&[1]);
        assert_eq!(sel.column(0), &[0.5, 0.5, 0.5]);
        p.retain(&[false, true]);
        assert_eq!(p.len(), 1);
        assert_eq!(p.column(0), &[0.5, 0.5, 0.5]);
    }

    proptest! {
        #[test]
        fn interpolation_stays_within_column_bounds(
            col in prop::collection::vec(-10.0f64..10.0, 4),
            z in -50.0f64..5.0,
        ) {
            let depths = [0.0, -3.0, -9.0, -20.0];
            let v = interpolate(&depths, &col, z);
            let lo = col.iter().copied().fold(f64::INFINITY, f64::min);
            let hi = col.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            prop_assert!(v >= lo - 1e-9 && v <= hi + 1e-9);
        }
    }
}
