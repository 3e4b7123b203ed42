//! Test utilities and mock types for Drift development.
//!
//! Provides mock implementations of [`Reader`] covering the situations
//! the aggregator and engine must handle (constant fields, analytic
//! fields, failing sources, coastlines), fixture substances in
//! [`fixtures`], and [`StepHarness`] for driving one substance hook in
//! isolation.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;
pub mod harness;

pub use harness::StepHarness;

use std::sync::atomic::{AtomicUsize, Ordering};

use drift_core::{BoundingBox, Point, ReaderError, TimeInterval};
use drift_env::Reader;

/// Shared coverage metadata for the mock readers.
#[derive(Clone, Debug)]
struct Coverage {
    bounds: BoundingBox,
    validity: TimeInterval,
    extrapolate: bool,
}

impl Default for Coverage {
    fn default() -> Self {
        Self {
            bounds: BoundingBox::GLOBAL,
            validity: TimeInterval::ALWAYS,
            extrapolate: false,
        }
    }
}

/// Reader returning one constant per variable everywhere it covers.
///
/// Counts calls so tests can check which readers were consulted.
pub struct ConstantReader {
    name: String,
    values: Vec<(String, f64)>,
    coverage: Coverage,
    calls: AtomicUsize,
}

impl ConstantReader {
    /// A global, always-valid reader serving `value` for each variable.
    pub fn new(name: impl Into<String>, variables: &[&str], value: f64) -> Self {
        Self {
            name: name.into(),
            values: variables.iter().map(|v| (v.to_string(), value)).collect(),
            coverage: Coverage::default(),
            calls: AtomicUsize::new(0),
        }
    }

    /// Serve `value` for `variable`, adding it if not yet declared.
    pub fn with_value(mut self, variable: &str, value: f64) -> Self {
        match self.values.iter_mut().find(|(v, _)| v == variable) {
            Some(entry) => entry.1 = value,
            None => self.values.push((variable.to_string(), value)),
        }
        self
    }

    /// Restrict horizontal coverage.
    pub fn with_bounds(mut self, bounds: BoundingBox) -> Self {
        self.coverage.bounds = bounds;
        self
    }

    /// Restrict temporal coverage.
    pub fn with_validity(mut self, validity: TimeInterval) -> Self {
        self.coverage.validity = validity;
        self
    }

    /// Allow time clamping outside the validity interval.
    pub fn extrapolating(mut self) -> Self {
        self.coverage.extrapolate = true;
        self
    }

    /// Number of `get`/`get_profile` calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

impl Reader for ConstantReader {
    fn name(&self) -> &str {
        &self.name
    }

    fn variables(&self) -> Vec<String> {
        self.values.iter().map(|(v, _)| v.clone()).collect()
    }

    fn bounds(&self) -> BoundingBox {
        self.coverage.bounds
    }

    fn validity(&self) -> TimeInterval {
        self.coverage.validity
    }

    fn extrapolates_in_time(&self) -> bool {
        self.coverage.extrapolate
    }

    fn get(&self, variable: &str, points: &[Point], _time: f64) -> Result<Vec<f64>, ReaderError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        let value = self
            .values
            .iter()
            .find(|(v, _)| v == variable)
            .map(|(_, x)| *x)
            .ok_or_else(|| ReaderError::new(format!("variable '{variable}' not provided")))?;
        Ok(vec![value; points.len()])
    }
}

type FieldFn = dyn Fn(&str, &Point, f64) -> f64 + Send + Sync;

/// Reader evaluating an analytic function of variable, position and time.
pub struct FnReader {
    name: String,
    variables: Vec<String>,
    coverage: Coverage,
    f: Box<FieldFn>,
}

impl FnReader {
    /// A global reader evaluating `f(variable, point, time)`.
    pub fn new(
        name: impl Into<String>,
        variables: &[&str],
        f: impl Fn(&str, &Point, f64) -> f64 + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            variables: variables.iter().map(|v| v.to_string()).collect(),
            coverage: Coverage::default(),
            f: Box::new(f),
        }
    }

    /// Restrict horizontal coverage.
    pub fn with_bounds(mut self, bounds: BoundingBox) -> Self {
        self.coverage.bounds = bounds;
        self
    }
}

impl Reader for FnReader {
    fn name(&self) -> &str {
        &self.name
    }

    fn variables(&self) -> Vec<String> {
        self.variables.clone()
    }

    fn bounds(&self) -> BoundingBox {
        self.coverage.bounds
    }

    fn validity(&self) -> TimeInterval {
        self.coverage.validity
    }

    fn get(&self, variable: &str, points: &[Point], time: f64) -> Result<Vec<f64>, ReaderError> {
        Ok(points.iter().map(|p| (self.f)(variable, p, time)).collect())
    }
}

/// Reader that claims global coverage but raises on every query.
pub struct FailingReader {
    name: String,
    variables: Vec<String>,
    calls: AtomicUsize,
}

impl FailingReader {
    pub fn new(name: impl Into<String>, variables: &[&str]) -> Self {
        Self {
            name: name.into(),
            variables: variables.iter().map(|v| v.to_string()).collect(),
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of failed queries so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

impl Reader for FailingReader {
    fn name(&self) -> &str {
        &self.name
    }

    fn variables(&self) -> Vec<String> {
        self.variables.clone()
    }

    fn bounds(&self) -> BoundingBox {
        BoundingBox::GLOBAL
    }

    fn validity(&self) -> TimeInterval {
        TimeInterval::ALWAYS
    }

    fn get(&self, _variable: &str, _points: &[Point], _time: f64) -> Result<Vec<f64>, ReaderError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        Err(ReaderError::new("simulated I/O failure"))
    }
}

/// `land_binary_mask` reader with land east of a meridian.
pub struct LandMaskReader {
    coast_lon: f64,
}

impl LandMaskReader {
    /// Land wherever `lon >= coast_lon`.
    pub fn east_of(coast_lon: f64) -> Self {
        Self { coast_lon }
    }
}

impl Reader for LandMaskReader {
    fn name(&self) -> &str {
        "land_mask"
    }

    fn variables(&self) -> Vec<String> {
        vec![drift_core::variables::LAND_BINARY_MASK.to_string()]
    }

    fn bounds(&self) -> BoundingBox {
        BoundingBox::GLOBAL
    }

    fn validity(&self) -> TimeInterval {
        TimeInterval::ALWAYS
    }

    fn get(&self, _variable: &str, points: &[Point], _time: f64) -> Result<Vec<f64>, ReaderError> {
        Ok(points
            .iter()
            .map(|p| if p.lon >= self.coast_lon { 1.0 } else { 0.0 })
            .collect())
    }
}
