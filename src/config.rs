//! Tuning knobs for the improvement pipeline.

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SolveOptions {
    /// Number of solver + improvement runs; each run perturbs the solver input.
    pub runs: usize,
    /// Maximum spread of route durations around the mean, in percent.
    pub balancing_threshold_percent: f64,
    /// A stop whose closeness score exceeds the route average times this
    /// coefficient is dropped into the reassignment pool.
    pub non_nearby_coefficient: f64,
    /// A point moves to another route when its own score exceeds the other
    /// route's score times this ratio.
    pub closeness_ratio: f64,
    /// Upper bound on the active reassignment working set.
    pub active_points_limit: usize,
    /// Passes of the move/swap helper.
    pub move_swap_passes: usize,
    /// Forbid taking the last delivery off a route.
    pub require_non_empty_routes: bool,
}

impl Default for SolveOptions {
    fn default() -> Self {
        Self {
            runs: 1,
            balancing_threshold_percent: 30.0,
            non_nearby_coefficient: 1.5,
            closeness_ratio: 1.2,
            active_points_limit: 30,
            move_swap_passes: 5,
            require_non_empty_routes: false,
        }
    }
}
