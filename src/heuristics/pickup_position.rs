use itertools::Itertools;

use crate::context::AssignmentContext;
use crate::error::Result;
use crate::heuristics::Heuristic;
use crate::model::RoutePointIndex;
use crate::reassign::ReassignmentPool;
use crate::routing::{Route, RoutesManager};

/// Largest run of consecutive pickups reordered exhaustively.
const PERMUTATION_WINDOW: usize = 4;

/// Tidies pickup order: pickups at the same place are visited together, and
/// short runs of pickups are reordered when that shortens the route.
#[derive(Debug, Clone, Copy, Default)]
pub struct PickupRationalPosition;

impl Heuristic for PickupRationalPosition {
    fn name(&self) -> &'static str {
        "pickup_rational_position"
    }

    fn process(&mut self, manager: &mut RoutesManager<'_>, _pool: &mut ReassignmentPool) -> Result<usize> {
        let context = manager.context();
        let mut changes = 0;
        for vehicle in 0..context.vehicles().len() {
            let original = manager.route(vehicle).clone();
            let grouped = place_same_pickups_near(context, &original).unwrap_or_else(|| original.clone());
            let improved = reorder_pickup_runs(context, &grouped).unwrap_or(grouped);
            if improved != original {
                manager.rewrite_routes([improved])?;
                changes += 1;
            }
        }
        Ok(changes)
    }
}

/// Pulls later pickups at an already visited pickup location forward, right
/// after the earlier ones. Kept only if the route stays valid and no longer.
pub fn place_same_pickups_near(context: &AssignmentContext, route: &Route) -> Option<Route> {
    let fixed = context.vehicle(route.vehicle()).fixed_prefix_len().min(route.len());
    let points: Vec<RoutePointIndex> = route.job_points().iter().copied().collect();
    let (head, tail) = points.split_at(fixed);

    let mut ordered: Vec<RoutePointIndex> = Vec::with_capacity(tail.len());
    let mut moved = vec![false; tail.len()];
    for (position, &index) in tail.iter().enumerate() {
        if moved[position] {
            continue;
        }
        ordered.push(index);
        if !context.site(index).is_pickup() {
            continue;
        }
        for later in position + 1..tail.len() {
            let other = tail[later];
            if !moved[later] && context.site(other).is_pickup() && context.same_location(index, other) {
                ordered.push(other);
                moved[later] = true;
            }
        }
    }

    if ordered.as_slice() == tail {
        return None;
    }
    let candidate = Route::new(route.vehicle(), head.iter().copied().chain(ordered));
    let accepted = candidate.is_valid(context)
        && candidate.get_route_duration(context) <= route.get_route_duration(context);
    accepted.then_some(candidate)
}

/// Tries every order of each window of up to four consecutive pickups and
/// keeps the shortest valid route.
pub fn reorder_pickup_runs(context: &AssignmentContext, route: &Route) -> Option<Route> {
    let fixed = context.vehicle(route.vehicle()).fixed_prefix_len().min(route.len());
    let mut best = route.clone();
    let mut best_duration = route.get_route_duration(context);
    let mut improved = false;

    for (start, end) in pickup_runs(context, &best, fixed) {
        let window = PERMUTATION_WINDOW.min(end - start);
        for offset in start..=end - window {
            let points: Vec<RoutePointIndex> = best.job_points().iter().copied().collect();
            let segment = &points[offset..offset + window];
            for order in segment.iter().copied().permutations(window) {
                if order.as_slice() == segment {
                    continue;
                }
                let candidate = Route::new(
                    route.vehicle(),
                    points[..offset]
                        .iter()
                        .copied()
                        .chain(order)
                        .chain(points[offset + window..].iter().copied()),
                );
                if candidate.is_valid(context) && candidate.get_route_duration(context) < best_duration {
                    best_duration = candidate.get_route_duration(context);
                    best = candidate;
                    improved = true;
                }
            }
        }
    }
    improved.then_some(best)
}

/// `(start, end)` of every run of at least two consecutive pickups after the
/// fixed prefix.
fn pickup_runs(context: &AssignmentContext, route: &Route, fixed: usize) -> Vec<(usize, usize)> {
    let mut runs = Vec::new();
    let mut start = None;
    for (position, &index) in route.job_points().iter().enumerate().skip(fixed) {
        match (context.site(index).is_pickup(), start) {
            (true, None) => start = Some(position),
            (false, Some(run)) => {
                if position - run >= 2 {
                    runs.push((run, position));
                }
                start = None;
            }
            _ => {}
        }
    }
    if let Some(run) = start
        && route.len() - run >= 2
    {
        runs.push((run, route.len()));
    }
    runs
}
