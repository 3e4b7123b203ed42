//! Domain and land checks applied after each update.

use drift_core::variables::LAND_BINARY_MASK;
use drift_core::BoundingBox;
use drift_env::{Environment, FallbackTable, QueryStats, ReaderRegistry};
use drift_pool::ActiveState;

/// Rows whose position lies outside `domain`.
pub fn outside_domain(state: &ActiveState, domain: &BoundingBox) -> Vec<usize> {
    (0..state.len())
        .filter(|&i| !domain.contains(&state.point(i)))
        .collect()
}

/// Whether any source can answer `land_binary_mask`.
pub fn land_mask_available(registry: &ReaderRegistry, fallbacks: &FallbackTable) -> bool {
    fallbacks.get(LAND_BINARY_MASK).is_some() || !registry.candidates(LAND_BINARY_MASK).is_empty()
}

/// Rows on land at `time`, with the statistics of the mask query.
///
/// A mask value above 0.5 is land. Points the mask does not cover
/// count as sea.
pub fn on_land(env: &Environment<'_>, state: &ActiveState, time: f64) -> (Vec<usize>, QueryStats) {
    if state.is_empty() {
        return (Vec::new(), QueryStats::default());
    }
    let outcome = env.query(&[LAND_BINARY_MASK], &[], &state.points(), time, &[]);
    let rows: Vec<usize> = outcome
        .snapshot
        .get(LAND_BINARY_MASK)
        .map(|mask| {
            mask.iter()
                .enumerate()
                .filter(|(_, m)| **m > 0.5)
                .map(|(i, _)| i)
                .collect()
        })
        .unwrap_or_default();
    (rows, outcome.stats)
}
