//! Per-step metrics for the simulation engine.
//!
//! [`StepMetrics`] captures timing and element counts for a single
//! step. The engine keeps the most recent one, readable through
//! [`Engine::last_metrics`](crate::Engine::last_metrics).

/// Timing and count metrics collected during a single step.
///
/// All durations are in microseconds.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StepMetrics {
    /// Wall-clock time for the entire step.
    pub total_us: u64,
    /// Time spent querying the environment, including sea floor
    /// lookups for newly released elements.
    pub environment_us: u64,
    /// Time spent in the substance's `prepare_step` and `update`.
    pub update_us: u64,
    /// Time spent on numerical, domain and land checks.
    pub boundary_us: u64,
    /// Time spent recording output.
    pub output_us: u64,
    /// Elements released this step.
    pub released: usize,
    /// Elements deactivated this step, for any reason.
    pub deactivated: usize,
    /// Elements active at the end of the step.
    pub active: usize,
    /// Mixing sub-steps taken during the update.
    pub mixing_substeps: usize,
    /// Reader calls that failed and were skipped.
    pub reader_failures: u32,
    /// Point-variable pairs filled from the fallback table.
    pub fallback_points: u64,
}

impl StepMetrics {
    pub(crate) fn absorb_query(&mut self, stats: &drift_env::QueryStats) {
        self.reader_failures += stats.reader_failures;
        self.fallback_points += stats.fallback_points;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_metrics_are_zero() {
        let m = StepMetrics::default();
        assert_eq!(m.total_us, 0);
        assert_eq!(m.environment_us, 0);
        assert_eq!(m.update_us, 0);
        assert_eq!(m.boundary_us, 0);
        assert_eq!(m.output_us, 0);
        assert_eq!(m.released, 0);
        assert_eq!(m.deactivated, 0);
        assert_eq!(m.active, 0);
        assert_eq!(m.mixing_substeps, 0);
        assert_eq!(m.reader_failures, 0);
        assert_eq!(m.fallback_points, 0);
    }

    #[test]
    fn query_stats_accumulate() {
        let mut m = StepMetrics::default();
        let stats = drift_env::QueryStats {
            reader_failures: 1,
            reader_points: 10,
            fallback_points: 4,
        };
        m.absorb_query(&stats);
        m.absorb_query(&stats);
        assert_eq!(m.reader_failures, 2);
        assert_eq!(m.fallback_points, 8);
    }
}
