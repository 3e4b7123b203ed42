//! Geographic primitives: points, bounding boxes, time intervals and
//! spherical-earth distance helpers.

/// Mean earth radius in metres used for all horizontal conversions.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// A query or element position.
///
/// `z` is the vertical coordinate in metres, positive upward: `0` is the
/// sea surface and water-column positions are negative.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    /// Longitude in degrees east.
    pub lon: f64,
    /// Latitude in degrees north.
    pub lat: f64,
    /// Vertical position in metres (≤ 0 in the water column).
    pub z: f64,
}

impl Point {
    /// Construct a point.
    pub fn new(lon: f64, lat: f64, z: f64) -> Self {
        Self { lon, lat, z }
    }

    /// Whether all three coordinates are finite.
    pub fn is_finite(&self) -> bool {
        self.lon.is_finite() && self.lat.is_finite() && self.z.is_finite()
    }
}

/// Horizontal extent in degrees, inclusive on all edges.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    /// Western edge.
    pub lon_min: f64,
    /// Eastern edge.
    pub lon_max: f64,
    /// Southern edge.
    pub lat_min: f64,
    /// Northern edge.
    pub lat_max: f64,
}

impl BoundingBox {
    /// The whole globe.
    pub const GLOBAL: Self = Self {
        lon_min: -360.0,
        lon_max: 360.0,
        lat_min: -90.0,
        lat_max: 90.0,
    };

    /// Construct a bounding box from its four edges.
    pub fn new(lon_min: f64, lon_max: f64, lat_min: f64, lat_max: f64) -> Self {
        Self {
            lon_min,
            lon_max,
            lat_min,
            lat_max,
        }
    }

    /// Whether the box is well-formed: finite edges, min ≤ max, and
    /// latitudes inside [-90, 90].
    pub fn validate(&self) -> Result<(), String> {
        let edges = [self.lon_min, self.lon_max, self.lat_min, self.lat_max];
        if edges.iter().any(|v| !v.is_finite()) {
            return Err(format!("bounding box edges must be finite: {self:?}"));
        }
        if self.lon_min > self.lon_max {
            return Err(format!(
                "lon_min ({}) exceeds lon_max ({})",
                self.lon_min, self.lon_max
            ));
        }
        if self.lat_min > self.lat_max {
            return Err(format!(
                "lat_min ({}) exceeds lat_max ({})",
                self.lat_min, self.lat_max
            ));
        }
        if self.lat_min < -90.0 || self.lat_max > 90.0 {
            return Err(format!(
                "latitudes must lie in [-90, 90], got [{}, {}]",
                self.lat_min, self.lat_max
            ));
        }
        Ok(())
    }

    /// Whether the horizontal position of `point` lies inside the box.
    pub fn contains(&self, point: &Point) -> bool {
        point.lon >= self.lon_min
            && point.lon <= self.lon_max
            && point.lat >= self.lat_min
            && point.lat <= self.lat_max
    }
}

/// A temporal validity interval in seconds, possibly open on either end.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TimeInterval {
    /// First valid time, or `None` for unbounded.
    pub start: Option<f64>,
    /// Last valid time, or `None` for unbounded.
    pub end: Option<f64>,
}

impl TimeInterval {
    /// Valid at all times.
    pub const ALWAYS: Self = Self {
        start: None,
        end: None,
    };

    /// A closed interval `[start, end]`.
    pub fn between(start: f64, end: f64) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }

    /// Whether the interval is well-formed (finite bounds, start ≤ end).
    pub fn validate(&self) -> Result<(), String> {
        if let Some(s) = self.start {
            if !s.is_finite() {
                return Err(format!("interval start must be finite, got {s}"));
            }
        }
        if let Some(e) = self.end {
            if !e.is_finite() {
                return Err(format!("interval end must be finite, got {e}"));
            }
        }
        if let (Some(s), Some(e)) = (self.start, self.end) {
            if s > e {
                return Err(format!("interval start ({s}) is after end ({e})"));
            }
        }
        Ok(())
    }

    /// Whether `time` lies inside the interval.
    pub fn contains(&self, time: f64) -> bool {
        self.start.is_none_or(|s| time >= s) && self.end.is_none_or(|e| time <= e)
    }

    /// Clamp `time` into the interval.
    pub fn clamp(&self, time: f64) -> f64 {
        let mut t = time;
        if let Some(s) = self.start {
            t = t.max(s);
        }
        if let Some(e) = self.end {
            t = t.min(e);
        }
        t
    }
}

/// Great-circle distance in metres between two horizontal positions
/// (haversine formula).
pub fn great_circle_distance(lon1: f64, lat1: f64, lon2: f64, lat2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let dphi = (lat2 - lat1).to_radians();
    let dlambda = (lon2 - lon1).to_radians();
    let a = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * a.sqrt().min(1.0).asin()
}

/// Position reached by travelling `distance` metres from `(lon, lat)`
/// along the initial `bearing` (radians clockwise from north).
pub fn destination(lon: f64, lat: f64, bearing: f64, distance: f64) -> (f64, f64) {
    let delta = distance / EARTH_RADIUS_M;
    let phi1 = lat.to_radians();
    let lambda1 = lon.to_radians();
    let sin_phi2 = phi1.sin() * delta.cos() + phi1.cos() * delta.sin() * bearing.cos();
    let phi2 = sin_phi2.clamp(-1.0, 1.0).asin();
    let y = bearing.sin() * delta.sin() * phi1.cos();
    let x = delta.cos() - phi1.sin() * sin_phi2;
    let lambda2 = lambda1 + y.atan2(x);
    (wrap_longitude(lambda2.to_degrees()), phi2.to_degrees())
}

/// Convert an eastward/northward displacement in metres at latitude
/// `lat` into a `(dlon, dlat)` displacement in degrees.
pub fn metres_to_degrees(dx: f64, dy: f64, lat: f64) -> (f64, f64) {
    let dlat = (dy / EARTH_RADIUS_M).to_degrees();
    let coslat = lat.to_radians().cos().max(1e-12);
    let dlon = (dx / (EARTH_RADIUS_M * coslat)).to_degrees();
    (dlon, dlat)
}

/// Wrap a longitude into `[-180, 180)`.
pub fn wrap_longitude(lon: f64) -> f64 {
    (lon + 180.0).rem_euclid(360.0) - 180.0
}
