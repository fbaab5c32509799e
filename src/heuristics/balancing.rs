use crate::context::AssignmentContext;
use crate::error::Result;
use crate::heuristics::{Heuristic, duration_spread, route_budget};
use crate::model::RoutePointIndex;
use crate::reassign::{PointToReassign, ReassignmentPool};
use crate::routing::{Route, RoutesManager};

/// Evens out route durations while their spread exceeds a threshold.
///
/// Stops move out of the longest route into the routes with the most time
/// left, or into the shortest route from the others. A move is kept only if
/// the spread drops.
#[derive(Debug, Clone)]
pub struct RouteBalancingHelper {
    threshold_percent: f64,
    require_non_empty: bool,
}

impl RouteBalancingHelper {
    pub fn new(threshold_percent: f64, require_non_empty: bool) -> Self {
        Self {
            threshold_percent,
            require_non_empty,
        }
    }

    fn spread_after(manager: &RoutesManager<'_>, changed: &[&Route]) -> f64 {
        let context = manager.context();
        let durations: Vec<i64> = manager
            .routes()
            .iter()
            .map(|route| {
                changed
                    .iter()
                    .find(|candidate| candidate.vehicle() == route.vehicle())
                    .copied()
                    .unwrap_or(route)
                    .get_route_duration(context)
            })
            .collect();
        duration_spread(&durations)
    }

    /// First move of a stop from `source` to `target` that lowers the spread.
    fn find_move(&self, manager: &mut RoutesManager<'_>, source: usize, target: usize, spread: f64) -> Option<(Route, Route)> {
        let context = manager.context();
        let source_route = manager.route(source).clone();
        let target_route = manager.route(target).clone();

        for delivery in by_closeness(context, &source_route, &target_route) {
            let Some((without, point)) = source_route.take_point_for_reassign(context, delivery, self.require_non_empty)
            else {
                continue;
            };
            if !without.is_valid(context) {
                continue;
            }
            let Some(with) = manager.find_best_place(target, &point, route_budget(context, target)) else {
                continue;
            };
            if Self::spread_after(manager, &[&without, &with]) < spread {
                return Some((without, with));
            }
        }
        None
    }
}

/// Deliveries of `source`, closest to `target` first.
fn by_closeness(context: &AssignmentContext, source: &Route, target: &Route) -> Vec<RoutePointIndex> {
    let mut scored: Vec<_> = source
        .deliveries(context)
        .into_iter()
        .map(|delivery| {
            let point = PointToReassign::of(context, delivery);
            (target.calculate_point_closeness_score(context, &point), delivery)
        })
        .collect();
    scored.sort_by(|a, b| a.0.total_cmp(&b.0));
    scored.into_iter().map(|(_, delivery)| delivery).collect()
}

impl Heuristic for RouteBalancingHelper {
    fn name(&self) -> &'static str {
        "route_balancing"
    }

    fn process(&mut self, manager: &mut RoutesManager<'_>, _pool: &mut ReassignmentPool) -> Result<usize> {
        let context = manager.context();
        let vehicles = context.vehicles().len();
        let mut moves = 0;

        for _ in 0..2 * vehicles {
            let durations: Vec<i64> = manager
                .routes()
                .iter()
                .map(|route| route.get_route_duration(context))
                .collect();
            let spread = duration_spread(&durations);
            if spread <= self.threshold_percent {
                break;
            }

            let longest = (0..vehicles).max_by_key(|&vehicle| durations[vehicle]).unwrap_or(0);
            let shortest = (0..vehicles).min_by_key(|&vehicle| durations[vehicle]).unwrap_or(0);

            // Out of the longest route, most spare time first.
            let mut targets: Vec<usize> = (0..vehicles).filter(|&vehicle| vehicle != longest).collect();
            targets.sort_by_key(|&vehicle| std::cmp::Reverse(route_budget(context, vehicle) - durations[vehicle]));
            let mut found = targets
                .into_iter()
                .find_map(|target| self.find_move(manager, longest, target, spread));

            // Into the shortest route, longest donors first.
            if found.is_none() {
                let mut sources: Vec<usize> = (0..vehicles).filter(|&vehicle| vehicle != shortest).collect();
                sources.sort_by_key(|&vehicle| std::cmp::Reverse(durations[vehicle]));
                found = sources
                    .into_iter()
                    .find_map(|source| self.find_move(manager, source, shortest, spread));
            }

            let Some((source, target)) = found else {
                break;
            };
            manager.rewrite_routes([source, target])?;
            moves += 1;
        }
        Ok(moves)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{context, driver_at, job};

    #[test]
    fn test_long_route_gives_stops_away() {
        let context = context(
            vec![driver_at("a", (0.0, 0.0)), driver_at("b", (0.0, 0.0))],
            vec![job("1", (5.0, 0.0)), job("2", (0.0, 5.0)), job("3", (5.0, 5.0)), job("4", (-5.0, 0.0))],
        );
        let mut manager = RoutesManager::new(&context, vec![Route::new(0, context.deliveries().to_vec())]).unwrap();
        let before: Vec<i64> = manager.routes().iter().map(|route| route.get_route_duration(&context)).collect();

        let moves = RouteBalancingHelper::new(30.0, false)
            .process(&mut manager, &mut ReassignmentPool::new())
            .unwrap();

        let after: Vec<i64> = manager.routes().iter().map(|route| route.get_route_duration(&context)).collect();
        assert!(moves >= 1);
        assert!(duration_spread(&after) < duration_spread(&before));
        assert!(!manager.route(1).is_empty());
        assert!(manager.invalid_routes().is_empty());
    }

    #[test]
    fn test_moves_are_bounded_by_twice_the_fleet() {
        // A zero threshold is never met, so only the round limit stops the loop.
        let drivers = (0..3).map(|i| driver_at(&format!("d{}", i), (0.0, 0.0))).collect();
        let jobs = (0..12)
            .map(|i| job(&i.to_string(), ((i % 4) as f64 * 3.0 - 4.0, (i / 4) as f64 * 3.0 - 3.0)))
            .collect();
        let context = context(drivers, jobs);
        let mut manager = RoutesManager::new(&context, vec![Route::new(0, context.deliveries().to_vec())]).unwrap();

        let moves = RouteBalancingHelper::new(0.0, false)
            .process(&mut manager, &mut ReassignmentPool::new())
            .unwrap();

        assert!(moves >= 1);
        assert!(moves <= 2 * context.vehicles().len());
        assert_eq!(manager.assigned_deliveries().len(), 12);
    }

    #[test]
    fn test_balanced_routes_are_left_alone() {
        let context = context(
            vec![driver_at("a", (0.0, 0.0)), driver_at("b", (0.0, 0.0))],
            vec![job("1", (5.0, 0.0)), job("2", (-5.0, 0.0))],
        );
        let (east, west) = (context.deliveries()[0], context.deliveries()[1]);
        let routes = vec![Route::new(0, [east]), Route::new(1, [west])];
        let mut manager = RoutesManager::new(&context, routes.clone()).unwrap();
        let mut helper = RouteBalancingHelper::new(30.0, false);

        assert_eq!(helper.process(&mut manager, &mut ReassignmentPool::new()).unwrap(), 0);
        assert_eq!(helper.process(&mut manager, &mut ReassignmentPool::new()).unwrap(), 0);
        assert_eq!(manager.routes(), routes.as_slice());
    }
}
