//! The [`Reader`] trait implemented by environmental data sources.

use std::sync::Arc;

use drift_core::{BoundingBox, Point, ReaderError, TimeInterval};

/// An external provider of named environmental variables over a bounded
/// region of space and time.
///
/// # Contract
///
/// - Coverage metadata (`bounds`, `validity`, `variables`,
///   `extrapolates_in_time`) is static: it is read once at registration
///   and never re-queried.
/// - `get` and `get_profile` must be deterministic for identical inputs.
/// - A value that is NaN or infinite means "no data at this point"
///   (masked cell); the aggregator treats it as uncovered.
/// - Spatial and temporal interpolation are the reader's business.
///
/// # Object safety
///
/// This trait is object-safe; readers are stored as `Box<dyn Reader>`.
///
/// # Examples
///
/// ```
/// use drift_core::{BoundingBox, Point, ReaderError, TimeInterval};
/// use drift_env::Reader;
///
/// struct Calm;
///
/// impl Reader for Calm {
///     fn name(&self) -> &str { "calm" }
///     fn variables(&self) -> Vec<String> { vec!["x_wind".into()] }
///     fn bounds(&self) -> BoundingBox { BoundingBox::GLOBAL }
///     fn validity(&self) -> TimeInterval { TimeInterval::ALWAYS }
///     fn get(&self, _v: &str, points: &[Point], _t: f64) -> Result<Vec<f64>, ReaderError> {
///         Ok(vec![0.0; points.len()])
///     }
/// }
///
/// let r = Calm;
/// assert!(r.covers(&Point::new(3.0, 60.0, 0.0), 0.0));
/// ```
pub trait Reader: Send + Sync {
    /// Human-readable name for logs and error reports.
    fn name(&self) -> &str;

    /// Variable names this reader can supply.
    fn variables(&self) -> Vec<String>;

    /// Declared horizontal coverage.
    fn bounds(&self) -> BoundingBox;

    /// Declared temporal validity.
    fn validity(&self) -> TimeInterval;

    /// Whether queries outside [`validity`](Self::validity) may be
    /// answered by clamping the time to the interval.
    ///
    /// Default: `false`, so out-of-interval points are uncovered.
    fn extrapolates_in_time(&self) -> bool {
        false
    }

    /// Whether this reader has data at `point` and `time`.
    ///
    /// Default: the point lies in [`bounds`](Self::bounds) and the time
    /// in [`validity`](Self::validity). Readers with irregular coverage
    /// (a curvilinear grid, say) may narrow this further.
    fn covers(&self, point: &Point, time: f64) -> bool {
        self.bounds().contains(point) && self.validity().contains(time)
    }

    /// Values of `variable` at `points` and `time`, one per point.
    fn get(&self, variable: &str, points: &[Point], time: f64) -> Result<Vec<f64>, ReaderError>;

    /// Vertical profiles of `variable` below each point, sampled on
    /// `depths`, returned element-major (`points.len() * depths.len()`
    /// values).
    ///
    /// Default: one [`get`](Self::get) call per depth level with the
    /// points moved to that depth.
    fn get_profile(
        &self,
        variable: &str,
        points: &[Point],
        time: f64,
        depths: &[f64],
    ) -> Result<Vec<f64>, ReaderError> {
        let n_levels = depths.len();
        let mut out = vec![0.0; points.len() * n_levels];
        for (level, &z) in depths.iter().enumerate() {
            let at_level: Vec<Point> = points.iter().map(|p| Point::new(p.lon, p.lat, z)).collect();
            let values = self.get(variable, &at_level, time)?;
            if values.len() != points.len() {
                return Err(ReaderError::new(format!(
                    "returned {} values for {} points",
                    values.len(),
                    points.len()
                )));
            }
            for (i, v) in values.into_iter().enumerate() {
                out[i * n_levels + level] = v;
            }
        }
        Ok(out)
    }
}

impl<R: Reader + ?Sized> Reader for Arc<R> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn variables(&self) -> Vec<String> {
        (**self).variables()
    }

    fn bounds(&self) -> BoundingBox {
        (**self).bounds()
    }

    fn validity(&self) -> TimeInterval {
        (**self).validity()
    }

    fn extrapolates_in_time(&self) -> bool {
        (**self).extrapolates_in_time()
    }

    fn covers(&self, point: &Point, time: f64) -> bool {
        (**self).covers(point, time)
    }

    fn get(&self, variable: &str, points: &[Point], time: f64) -> Result<Vec<f64>, ReaderError> {
        (**self).get(variable, points, time)
    }

    fn get_profile(
        &self,
        variable: &str,
        points: &[Point],
        time: f64,
        depths: &[f64],
    ) -> Result<Vec<f64>, ReaderError> {
        (**self).get_profile(variable, points, time, depths)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Linear in depth: value = 10 + z.
    struct DepthLinear;

    impl Reader for DepthLinear {
        fn name(&self) -> &str {
            "depth_linear"
        }
        fn variables(&self) -> Vec<String> {
            vec!["sea_water_temperature".into()]
        }
        fn bounds(&self) -> BoundingBox {
            BoundingBox::new(0.0, 10.0, 50.0, 70.0)
        }
        fn validity(&self) -> TimeInterval {
            TimeInterval::between(0.0, 3600.0)
        }
        fn get(&self, _v: &str, points: &[Point], _t: f64) -> Result<Vec<f64>, ReaderError> {
            Ok(points.iter().map(|p| 10.0 + p.z).collect())
        }
    }

    #[test]
    fn default_covers_uses_bounds_and_validity() {
        let r = DepthLinear;
        assert!(r.covers(&Point::new(5.0, 60.0, 0.0), 100.0));
        assert!(!r.covers(&Point::new(15.0, 60.0, 0.0), 100.0));
        assert!(!r.covers(&Point::new(5.0, 60.0, 0.0), 7200.0));
        assert!(!r.extrapolates_in_time());
    }

    #[test]
    fn default_profile_is_element_major() {
        let r = DepthLinear;
        let pts = [Point::new(1.0, 60.0, 0.0), Point::new(2.0, 60.0, -7.0)];
        let v = r
            .get_profile("sea_water_temperature", &pts, 0.0, &[0.0, -5.0, -10.0])
            .unwrap();
        assert_eq!(v, vec![10.0, 5.0, 0.0, 10.0, 5.0, 0.0]);
    }
}
