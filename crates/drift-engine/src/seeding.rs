//! Seed requests and the radius scatter.
//!
//! A [`SeedRequest`] describes `count` elements released together
//! around one point. Positions are scattered uniformly over a disc of
//! the requested radius; the substance may add attribute values of its
//! own through [`Substance::seed_attributes`](drift_substance::Substance::seed_attributes).

use rand::Rng;
use rand_chacha::ChaCha8Rng;

use drift_core::geo::destination;
use drift_core::SeedError;
use drift_pool::AttrValue;

/// Depth at which seeded elements start.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SeedDepth {
    /// A fixed depth in metres (≤ 0, positive up).
    Depth(f64),
    /// On the sea floor, resolved from `sea_floor_depth_below_sea_level`
    /// when the elements are released.
    Seafloor,
}

/// A request to schedule `count` elements.
///
/// ```
/// use drift_engine::{SeedDepth, SeedRequest};
///
/// let req = SeedRequest::new(4.0, 60.0, 0.0, 100)
///     .radius(1000.0)
///     .depth(-5.0)
///     .attribute("wind_drift_factor", 0.03);
/// assert_eq!(req.seed_depth(), SeedDepth::Depth(-5.0));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct SeedRequest {
    lon: f64,
    lat: f64,
    time: f64,
    count: usize,
    radius: f64,
    depth: SeedDepth,
    attributes: Vec<(String, AttrValue)>,
}

impl SeedRequest {
    /// `count` elements at the surface at `(lon, lat)`, released at
    /// `time`.
    pub fn new(lon: f64, lat: f64, time: f64, count: usize) -> Self {
        Self {
            lon,
            lat,
            time,
            count,
            radius: 0.0,
            depth: SeedDepth::Depth(0.0),
            attributes: Vec::new(),
        }
    }

    /// Scatter positions uniformly within `radius` metres of the
    /// center (default: 0).
    pub fn radius(mut self, radius: f64) -> Self {
        self.radius = radius;
        self
    }

    /// Start at a fixed depth (default: the surface).
    pub fn depth(mut self, z: f64) -> Self {
        self.depth = SeedDepth::Depth(z);
        self
    }

    /// Start on the sea floor.
    pub fn at_seafloor(mut self) -> Self {
        self.depth = SeedDepth::Seafloor;
        self
    }

    /// Set a schema attribute for every element, either one value or
    /// one per element. An attribute named `lon`, `lat` or `z` replaces
    /// the generated position column.
    pub fn attribute(mut self, name: &str, value: impl Into<AttrValue>) -> Self {
        let value = value.into();
        match self.attributes.iter_mut().find(|(n, _)| n == name) {
            Some(entry) => entry.1 = value,
            None => self.attributes.push((name.to_string(), value)),
        }
        self
    }

    /// Release time.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Number of elements.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Requested starting depth.
    pub fn seed_depth(&self) -> SeedDepth {
        self.depth
    }

    /// Whether the caller supplied `name`.
    pub fn supplies(&self, name: &str) -> bool {
        self.attributes.iter().any(|(n, _)| n == name)
    }

    pub(crate) fn attributes(&self) -> &[(String, AttrValue)] {
        &self.attributes
    }

    /// Check the request-level parameters. Attribute values are checked
    /// by the pool.
    pub(crate) fn validate(&self) -> Result<(), SeedError> {
        if self.count == 0 {
            return Err(SeedError::ZeroCount);
        }
        for (name, v) in [("lon", self.lon), ("lat", self.lat), ("radius", self.radius)] {
            if !v.is_finite() {
                return Err(SeedError::NonFinite {
                    attribute: name.to_string(),
                });
            }
        }
        if self.radius < 0.0 {
            return Err(SeedError::OutOfRange {
                attribute: "radius".to_string(),
                value: self.radius,
                expected: "radius >= 0",
            });
        }
        if let SeedDepth::Depth(z) = self.depth {
            if !z.is_finite() {
                return Err(SeedError::NonFinite {
                    attribute: "z".to_string(),
                });
            }
            if z > 0.0 {
                return Err(SeedError::OutOfRange {
                    attribute: "z".to_string(),
                    value: z,
                    expected: "z <= 0",
                });
            }
        }
        Ok(())
    }

    /// Scatter the horizontal positions.
    pub(crate) fn positions(&self, rng: &mut ChaCha8Rng) -> (Vec<f64>, Vec<f64>) {
        scatter(self.lon, self.lat, self.radius, self.count, rng)
    }
}

/// `count` positions uniform over the disc of `radius` metres around
/// `(lon, lat)`.
///
/// The distance is `radius·√u` for uniform `u`, which gives equal
/// density per unit area. A zero radius returns the center exactly
/// without consuming random draws.
pub fn scatter(
    lon: f64,
    lat: f64,
    radius: f64,
    count: usize,
    rng: &mut ChaCha8Rng,
) -> (Vec<f64>, Vec<f64>) {
    if radius <= 0.0 {
        return (vec![lon; count], vec![lat; count]);
    }
    let mut lons = Vec::with_capacity(count);
    let mut lats = Vec::with_capacity(count);
    for _ in 0..count {
        let distance = radius * rng.random::<f64>().sqrt();
        let bearing = rng.random_range(0.0..std::f64::consts::TAU);
        let (x, y) = destination(lon, lat, bearing, distance);
        lons.push(x);
        lats.push(y);
    }
    (lons, lats)
}
