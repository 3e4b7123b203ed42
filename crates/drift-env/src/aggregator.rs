//! The environment aggregator: prioritized reader lookup with fallbacks.
//!
//! For each requested variable the covering readers are asked in
//! priority order. Each point takes its value from the first reader
//! that covers it and returns a finite value; a reader that raises is
//! skipped as if it covered nothing. Points still uncovered after the
//! last reader get the variable's fallback constant, or are reported
//! missing when there is none.

use indexmap::IndexMap;

use drift_core::{EnvError, Point, ProfileField, ReaderError};

use crate::fallback::FallbackTable;
use crate::reader::Reader;
use crate::registry::ReaderRegistry;
use crate::snapshot::EnvironmentSnapshot;

/// Counters describing how a query was answered.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QueryStats {
    /// Reader calls that raised or returned a malformed result.
    pub reader_failures: u32,
    /// Point-variable pairs answered by a reader.
    pub reader_points: u64,
    /// Point-variable pairs filled from the fallback table.
    pub fallback_points: u64,
}

impl QueryStats {
    fn absorb(&mut self, other: &QueryStats) {
        self.reader_failures += other.reader_failures;
        self.reader_points += other.reader_points;
        self.fallback_points += other.fallback_points;
    }
}

/// Result of a query that tolerates missing data.
///
/// Uncovered entries in the snapshot are NaN; `missing` lists, per
/// variable, the point indices that neither a reader nor a fallback
/// could fill.
#[derive(Clone, Debug)]
pub struct QueryOutcome {
    /// Values for every requested variable.
    pub snapshot: EnvironmentSnapshot,
    /// Uncovered point indices (ascending) per variable.
    pub missing: IndexMap<String, Vec<usize>>,
    /// How the query was answered.
    pub stats: QueryStats,
    /// Reader failures recovered by falling through, in query order.
    pub reader_errors: Vec<EnvError>,
}

impl QueryOutcome {
    /// Whether every point got a value for every variable.
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }

    /// Union of the missing point indices across all variables,
    /// ascending.
    pub fn missing_points(&self) -> Vec<usize> {
        let mut all: Vec<usize> = self.missing.values().flatten().copied().collect();
        all.sort_unstable();
        all.dedup();
        all
    }

    /// The first missing variable as an error.
    pub fn first_missing(&self) -> Option<EnvError> {
        self.missing
            .first()
            .map(|(variable, points)| EnvError::MissingEnvironmentData {
                variable: variable.clone(),
                points: points.clone(),
            })
    }

    /// The snapshot, or `MissingEnvironmentData` for the first variable
    /// with uncovered points.
    ///
    /// # Errors
    ///
    /// Returns [`EnvError::MissingEnvironmentData`] if any point is
    /// uncovered.
    pub fn into_result(self) -> Result<EnvironmentSnapshot, EnvError> {
        match self.first_missing() {
            Some(e) => Err(e),
            None => Ok(self.snapshot),
        }
    }
}

/// Read-only view over the registered readers and fallback table.
///
/// The aggregator holds no state of its own; identical inputs produce
/// identical snapshots as long as the readers are deterministic.
#[derive(Clone, Copy, Debug)]
pub struct Environment<'a> {
    registry: &'a ReaderRegistry,
    fallbacks: &'a FallbackTable,
}

impl<'a> Environment<'a> {
    /// Aggregate over `registry`, filling gaps from `fallbacks`.
    pub fn new(registry: &'a ReaderRegistry, fallbacks: &'a FallbackTable) -> Self {
        Self {
            registry,
            fallbacks,
        }
    }

    /// The fallback table in use.
    pub fn fallbacks(&self) -> &'a FallbackTable {
        self.fallbacks
    }

    /// One value per point for each variable.
    ///
    /// # Errors
    ///
    /// Returns [`EnvError::MissingEnvironmentData`] naming the first
    /// variable with a point that no reader or fallback covers.
    pub fn get(
        &self,
        variables: &[&str],
        points: &[Point],
        time: f64,
    ) -> Result<EnvironmentSnapshot, EnvError> {
        self.query(variables, &[], points, time, &[]).into_result()
    }

    /// One vertical profile per point for each variable, sampled on
    /// `depths`.
    ///
    /// # Errors
    ///
    /// As for [`get`](Self::get).
    pub fn get_profiles(
        &self,
        variables: &[&str],
        points: &[Point],
        time: f64,
        depths: &[f64],
    ) -> Result<EnvironmentSnapshot, EnvError> {
        self.query(&[], variables, points, time, depths).into_result()
    }

    /// Point values for `variables` and profiles for
    /// `profile_variables`, without failing on missing data.
    ///
    /// Depth levels are sorted shallow to deep and deduplicated;
    /// non-finite levels are dropped and an empty list means the
    /// surface only.
    pub fn query(
        &self,
        variables: &[&str],
        profile_variables: &[&str],
        points: &[Point],
        time: f64,
        depths: &[f64],
    ) -> QueryOutcome {
        let mut outcome = QueryOutcome {
            snapshot: EnvironmentSnapshot::new(time, points.len()),
            missing: IndexMap::new(),
            stats: QueryStats::default(),
            reader_errors: Vec::new(),
        };

        for &variable in variables {
            let resolved = self.resolve(variable, points, time, 1, |reader, pts, t| {
                reader.get(variable, pts, t)
            });
            let values = outcome.record(variable, resolved);
            outcome.snapshot.insert(variable, values);
        }

        if !profile_variables.is_empty() {
            let levels = sanitize_levels(depths);
            for &variable in profile_variables {
                let resolved = self.resolve(variable, points, time, levels.len(), |reader, pts, t| {
                    reader.get_profile(variable, pts, t, &levels)
                });
                let values = outcome.record(variable, resolved);
                // Levels are sanitized above and rows are `levels.len()`
                // wide, so construction cannot fail.
                let profile = ProfileField::new(levels.clone(), values)
                    .unwrap_or_else(|_| ProfileField::uniform(vec![f64::NAN; points.len()]));
                outcome.snapshot.insert_profile(variable, profile);
            }
        }
        outcome
    }

    /// Fill `width` values per point for one variable.
    fn resolve(
        &self,
        variable: &str,
        points: &[Point],
        time: f64,
        width: usize,
        fetch: impl Fn(&dyn Reader, &[Point], f64) -> Result<Vec<f64>, ReaderError>,
    ) -> Resolved {
        let mut r = Resolved {
            values: vec![f64::NAN; points.len() * width],
            missing: Vec::new(),
            stats: QueryStats::default(),
            errors: Vec::new(),
        };
        let mut pending: Vec<usize> = (0..points.len()).collect();

        for reg in self.registry.candidates(variable) {
            if pending.is_empty() {
                break;
            }
            let (take, mut rest): (Vec<usize>, Vec<usize>) = pending
                .iter()
                .partition(|&&i| reg.covers(&points[i], time));
            if take.is_empty() {
                continue;
            }
            let sub: Vec<Point> = take.iter().map(|&i| points[i]).collect();
            let fetched = fetch(reg.reader(), &sub, reg.effective_time(time)).and_then(|v| {
                if v.len() == take.len() * width {
                    Ok(v)
                } else {
                    Err(ReaderError::new(format!(
                        "returned {} values, expected {}",
                        v.len(),
                        take.len() * width
                    )))
                }
            });
            match fetched {
                Ok(vals) => {
                    for (k, &i) in take.iter().enumerate() {
                        let row = &vals[k * width..(k + 1) * width];
                        if row.iter().all(|v| v.is_finite()) {
                            r.values[i * width..(i + 1) * width].copy_from_slice(row);
                            r.stats.reader_points += 1;
                        } else {
                            rest.push(i);
                        }
                    }
                    rest.sort_unstable();
                    pending = rest;
                }
                Err(reason) => {
                    log::warn!(
                        "reader '{}' failed for '{}' at {} point(s), falling through: {}",
                        reg.name(),
                        variable,
                        take.len(),
                        reason
                    );
                    r.stats.reader_failures += 1;
                    r.errors.push(EnvError::ReaderUnavailable {
                        reader: reg.name().to_string(),
                        reason,
                    });
                }
            }
        }

        if pending.is_empty() {
            return r;
        }
        match self.fallbacks.get(variable) {
            Some(fallback) => {
                log::debug!(
                    "fallback {} used for '{}' at {} point(s)",
                    fallback,
                    variable,
                    pending.len()
                );
                for &i in &pending {
                    r.values[i * width..(i + 1) * width].fill(fallback);
                }
                r.stats.fallback_points += pending.len() as u64;
            }
            None => r.missing = pending,
        }
        r
    }
}

struct Resolved {
    values: Vec<f64>,
    missing: Vec<usize>,
    stats: QueryStats,
    errors: Vec<EnvError>,
}

impl QueryOutcome {
    fn record(&mut self, variable: &str, resolved: Resolved) -> Vec<f64> {
        self.stats.absorb(&resolved.stats);
        self.reader_errors.extend(resolved.errors);
        if !resolved.missing.is_empty() {
            self.missing.insert(variable.to_string(), resolved.missing);
        }
        resolved.values
    }
}

fn sanitize_levels(depths: &[f64]) -> Vec<f64> {
    let mut levels: Vec<f64> = depths.iter().copied().filter(|d| d.is_finite()).collect();
    levels.sort_by(|a, b| b.total_cmp(a));
    levels.dedup();
    if levels.is_empty() {
        levels.push(0.0);
    }
    levels
}
