//! Reader registration records and the priority-ordered registry.

use std::error::Error;
use std::fmt;

use indexmap::IndexSet;
use smallvec::SmallVec;

use drift_core::{BoundingBox, Point, TimeInterval};

use crate::reader::Reader;

/// Errors from registering a reader.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RegistryError {
    /// Another reader already holds this priority rank.
    DuplicatePriority {
        /// The contested rank.
        priority: u32,
        /// Name of the reader already registered at that rank.
        existing: String,
        /// Name of the reader being registered.
        reader: String,
    },
    /// The reader's declared metadata is malformed.
    InvalidRegistration {
        /// Name of the reader.
        reader: String,
        /// What is wrong with it.
        reason: String,
    },
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicatePriority {
                priority,
                existing,
                reader,
            } => write!(
                f,
                "reader '{reader}' requests priority {priority}, already held by '{existing}'"
            ),
            Self::InvalidRegistration { reader, reason } => {
                write!(f, "invalid registration for reader '{reader}': {reason}")
            }
        }
    }
}

impl Error for RegistryError {}

/// A reader together with its coverage metadata and priority rank,
/// captured once at registration.
pub struct ReaderRegistration {
    reader: Box<dyn Reader>,
    name: String,
    bounds: BoundingBox,
    validity: TimeInterval,
    variables: IndexSet<String>,
    extrapolate: bool,
    priority: u32,
}

impl ReaderRegistration {
    /// Capture `reader`'s metadata and validate it.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidRegistration`] if the reader has
    /// an empty name, declares no variables, or declares a malformed
    /// bounding box or validity interval.
    pub fn new(reader: Box<dyn Reader>, priority: u32) -> Result<Self, RegistryError> {
        let name = reader.name().to_string();
        let invalid = |reason: String| RegistryError::InvalidRegistration {
            reader: name.clone(),
            reason,
        };
        if name.is_empty() {
            return Err(invalid("reader name must not be empty".to_string()));
        }
        let variables: IndexSet<String> = reader.variables().into_iter().collect();
        if variables.is_empty() {
            return Err(invalid("reader declares no variables".to_string()));
        }
        let bounds = reader.bounds();
        bounds.validate().map_err(invalid)?;
        let validity = reader.validity();
        validity.validate().map_err(invalid)?;
        let extrapolate = reader.extrapolates_in_time();
        Ok(Self {
            reader,
            name,
            bounds,
            validity,
            variables,
            extrapolate,
            priority,
        })
    }

    /// The reader's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Priority rank; lower ranks are asked first.
    pub fn priority(&self) -> u32 {
        self.priority
    }

    /// Declared horizontal coverage.
    pub fn bounds(&self) -> BoundingBox {
        self.bounds
    }

    /// Declared temporal validity.
    pub fn validity(&self) -> TimeInterval {
        self.validity
    }

    /// Variables the reader claims to provide, in declaration order.
    pub fn variables(&self) -> impl Iterator<Item = &str> {
        self.variables.iter().map(String::as_str)
    }

    /// Whether the reader claims `variable`.
    pub fn provides(&self, variable: &str) -> bool {
        self.variables.contains(variable)
    }

    /// The time actually passed to the reader for a query at `time`:
    /// clamped into the validity interval for extrapolation-tolerant
    /// readers, unchanged otherwise.
    pub fn effective_time(&self, time: f64) -> f64 {
        if self.extrapolate {
            self.validity.clamp(time)
        } else {
            time
        }
    }

    /// Whether this reader is consulted for `point` at `time`.
    pub fn covers(&self, point: &Point, time: f64) -> bool {
        let t = self.effective_time(time);
        self.bounds.contains(point) && self.validity.contains(t) && self.reader.covers(point, t)
    }

    /// The underlying reader.
    pub fn reader(&self) -> &dyn Reader {
        self.reader.as_ref()
    }
}

impl fmt::Debug for ReaderRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReaderRegistration")
            .field("name", &self.name)
            .field("priority", &self.priority)
            .field("bounds", &self.bounds)
            .field("validity", &self.validity)
            .field("variables", &self.variables)
            .field("extrapolate", &self.extrapolate)
            .finish()
    }
}

/// Candidate list for one variable; most variables have few readers.
pub type Candidates<'a> = SmallVec<[&'a ReaderRegistration; 4]>;

/// Registered readers in ascending priority order.
///
/// Priorities are unique, so the order is total and fixed once the run
/// starts.
#[derive(Debug, Default)]
pub struct ReaderRegistry {
    entries: Vec<ReaderRegistration>,
}

impl ReaderRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a registration, keeping the priority order.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicatePriority`] if the rank is taken.
    pub fn register(&mut self, registration: ReaderRegistration) -> Result<(), RegistryError> {
        match self
            .entries
            .binary_search_by_key(&registration.priority, |e| e.priority)
        {
            Ok(existing) => Err(RegistryError::DuplicatePriority {
                priority: registration.priority,
                existing: self.entries[existing].name.clone(),
                reader: registration.name,
            }),
            Err(pos) => {
                log::debug!(
                    "registered reader '{}' at priority {} for {:?}",
                    registration.name,
                    registration.priority,
                    registration.variables
                );
                self.entries.insert(pos, registration);
                Ok(())
            }
        }
    }

    /// Build a registration for `reader` and add it.
    ///
    /// # Errors
    ///
    /// See [`ReaderRegistration::new`] and [`register`](Self::register).
    pub fn register_reader(
        &mut self,
        reader: Box<dyn Reader>,
        priority: u32,
    ) -> Result<(), RegistryError> {
        self.register(ReaderRegistration::new(reader, priority)?)
    }

    /// Readers that claim `variable`, highest priority first.
    pub fn candidates(&self, variable: &str) -> Candidates<'_> {
        self.entries.iter().filter(|e| e.provides(variable)).collect()
    }

    /// All registrations, highest priority first.
    pub fn iter(&self) -> impl Iterator<Item = &ReaderRegistration> {
        self.entries.iter()
    }

    /// Number of registered readers.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no reader is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use drift_core::ReaderError;

    struct Stub {
        name: &'static str,
        vars: Vec<String>,
        bounds: BoundingBox,
        validity: TimeInterval,
        extrapolate: bool,
    }

    impl Stub {
        fn new(name: &'static str, vars: &[&str]) -> Self {
            Self {
                name,
                vars: vars.iter().map(|v| v.to_string()).collect(),
                bounds: BoundingBox::GLOBAL,
                validity: TimeInterval::ALWAYS,
                extrapolate: false,
            }
        }
    }

    impl Reader for Stub {
        fn name(&self) -> &str {
            self.name
        }
        fn variables(&self) -> Vec<String> {
            self.vars.clone()
        }
        fn bounds(&self) -> BoundingBox {
            self.bounds
        }
        fn validity(&self) -> TimeInterval {
            self.validity
        }
        fn extrapolates_in_time(&self) -> bool {
            self.extrapolate
        }
        fn get(&self, _v: &str, points: &[Point], _t: f64) -> Result<Vec<f64>, ReaderError> {
            Ok(vec![0.0; points.len()])
        }
    }

    #[test]
    fn registry_orders_by_priority() {
        let mut reg = ReaderRegistry::new();
        reg.register_reader(Box::new(Stub::new("b", &["x_wind"])), 5).unwrap();
        reg.register_reader(Box::new(Stub::new("a", &["x_wind", "y_wind"])), 1).unwrap();
        reg.register_reader(Box::new(Stub::new("c", &["y_wind"])), 3).unwrap();
        let names: Vec<_> = reg.iter().map(|r| r.name()).collect();
        assert_eq!(names, vec!["a", "c", "b"]);
        let x: Vec<_> = reg.candidates("x_wind").iter().map(|r| r.name()).collect();
        assert_eq!(x, vec!["a", "b"]);
        assert!(reg.candidates("land_binary_mask").is_empty());
    }

    #[test]
    fn duplicate_priority_is_rejected() {
        let mut reg = ReaderRegistry::new();
        reg.register_reader(Box::new(Stub::new("a", &["x_wind"])), 1).unwrap();
        let err = reg
            .register_reader(Box::new(Stub::new("b", &["x_wind"])), 1)
            .unwrap_err();
        assert!(matches!(err, RegistryError::DuplicatePriority { priority: 1, .. }));
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn malformed_metadata_is_rejected() {
        let empty = ReaderRegistration::new(Box::new(Stub::new("e", &[])), 0);
        assert!(matches!(empty, Err(RegistryError::InvalidRegistration { .. })));

        let mut inverted = Stub::new("inv", &["x_wind"]);
        inverted.bounds = BoundingBox::new(10.0, 0.0, 0.0, 10.0);
        assert!(ReaderRegistration::new(Box::new(inverted), 0).is_err());

        let mut backwards = Stub::new("t", &["x_wind"]);
        backwards.validity = TimeInterval::between(100.0, 0.0);
        assert!(ReaderRegistration::new(Box::new(backwards), 0).is_err());
    }

    #[test]
    fn coverage_respects_time_unless_extrapolating() {
        let mut strict = Stub::new("strict", &["x_wind"]);
        strict.validity = TimeInterval::between(0.0, 100.0);
        let strict = ReaderRegistration::new(Box::new(strict), 0).unwrap();
        let p = Point::new(0.0, 0.0, 0.0);
        assert!(strict.covers(&p, 50.0));
        assert!(!strict.covers(&p, 150.0));

        let mut lax = Stub::new("lax", &["x_wind"]);
        lax.validity = TimeInterval::between(0.0, 100.0);
        lax.extrapolate = true;
        let lax = ReaderRegistration::new(Box::new(lax), 1).unwrap();
        assert!(lax.covers(&p, 150.0));
        assert_eq!(lax.effective_time(150.0), 100.0);
    }
}
