//! Local-search heuristics run over the seed assignment.
//!
//! Every heuristic edits routes only through the [`RoutesManager`] and only
//! commits routes that are valid, so the pipeline never loses feasibility
//! once the cleaner has run.

pub mod balancing;
pub mod move_swap;
pub mod nearby;
pub mod pickup_position;
pub mod reassign_points;
pub mod swap_full_route;

use crate::config::SolveOptions;
use crate::context::AssignmentContext;
use crate::error::Result;
use crate::events::{Event, EventKind, EventLevel, EventSink};
use crate::reassign::{ReassignmentPool, SoftAssignmentRoutesCleaner};
use crate::routing::RoutesManager;

pub use balancing::RouteBalancingHelper;
pub use move_swap::MoveAndSwapPointsHelper;
pub use nearby::{NearbyAssignByCloseness, NearbyReassignByClosenessDiff, UnassignNonNearby};
pub use pickup_position::PickupRationalPosition;
pub use reassign_points::RoutePointsReassignHelper;
pub use swap_full_route::SwapFullRouteHelper;

pub trait Heuristic {
    fn name(&self) -> &'static str;

    /// Runs one pass and returns the number of committed changes.
    fn process(&mut self, manager: &mut RoutesManager<'_>, pool: &mut ReassignmentPool) -> Result<usize>;
}

/// The heuristics in the order they run.
pub fn default_pipeline(options: &SolveOptions) -> Vec<Box<dyn Heuristic>> {
    vec![
        Box::new(UnassignNonNearby::new(options.non_nearby_coefficient, options.require_non_empty_routes)),
        Box::new(NearbyReassignByClosenessDiff::new(options.closeness_ratio, options.require_non_empty_routes)),
        Box::new(RoutePointsReassignHelper::new(options.active_points_limit)),
        Box::new(NearbyAssignByCloseness),
        Box::new(MoveAndSwapPointsHelper::new(options.move_swap_passes, options.require_non_empty_routes)),
        Box::new(SwapFullRouteHelper),
        Box::new(RouteBalancingHelper::new(options.balancing_threshold_percent, options.require_non_empty_routes)),
        Box::new(PickupRationalPosition),
    ]
}

/// Collects skipped points, repairs invalid routes and runs the pipeline.
pub fn improve(
    manager: &mut RoutesManager<'_>,
    pool: &mut ReassignmentPool,
    options: &SolveOptions,
    events: &dyn EventSink,
) -> Result<()> {
    let skipped = pool.find_skipped_points(manager)?;
    if skipped > 0 {
        events.emit(
            EventLevel::Info,
            Event::new(EventKind::SkippedObjects, format!("{} deliveries skipped by the solver", skipped)),
        );
    }

    let cleaner = SoftAssignmentRoutesCleaner;
    let removed = cleaner.clean(manager, pool)?;
    tracing::debug!(skipped, removed, "seed assignment repaired");

    for mut heuristic in default_pipeline(options) {
        let changes = heuristic.process(manager, pool)?;
        tracing::debug!(
            heuristic = heuristic.name(),
            changes,
            pooled = pool.len(),
            duration = manager.total_duration(),
            "heuristic finished"
        );
    }

    if !manager.invalid_routes().is_empty() {
        cleaner.clean(manager, pool)?;
    }
    Ok(())
}

/// Time budget for a vehicle's whole route.
pub(crate) fn route_budget(context: &AssignmentContext, vehicle: usize) -> i64 {
    context.vehicle(vehicle).available_time()
}

/// Spread of route durations in percent of their mean.
pub fn duration_spread(durations: &[i64]) -> f64 {
    if durations.is_empty() {
        return 0.0;
    }
    let mean = durations.iter().sum::<i64>() as f64 / durations.len() as f64;
    if mean <= 0.0 {
        return 0.0;
    }
    let max = durations.iter().copied().max().unwrap_or(0);
    let min = durations.iter().copied().min().unwrap_or(0);
    (max - min) as f64 / mean * 100.0
}
