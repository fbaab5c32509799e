use std::collections::VecDeque;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::context::AssignmentContext;
use crate::error::Result;
use crate::heuristics::{Heuristic, route_budget};
use crate::model::RoutePointIndex;
use crate::reassign::{PointToReassign, ReassignmentPool};
use crate::routing::{InsertionCache, Route, RoutesManager};

const FARTHEST_POINTS: usize = 3;
const TARGET_ROUTES: usize = 5;
const CHANGES_PER_ROUTE: usize = 3;
const HISTORY_LEN: usize = 256;

/// Moves or swaps the stops farthest from their route with stops of closer
/// routes when the combined duration drops.
#[derive(Debug, Clone)]
pub struct MoveAndSwapPointsHelper {
    passes: usize,
    require_non_empty: bool,
    /// Hashes of recently committed route pairs; a pair seen before is not
    /// produced again, which keeps moves from cycling.
    history: VecDeque<u64>,
}

impl MoveAndSwapPointsHelper {
    pub fn new(passes: usize, require_non_empty: bool) -> Self {
        Self {
            passes,
            require_non_empty,
            history: VecDeque::with_capacity(HISTORY_LEN),
        }
    }

    fn remember(&mut self, source: &Route, target: &Route) -> bool {
        let mut hasher = DefaultHasher::new();
        source.hash(&mut hasher);
        target.hash(&mut hasher);
        let state = hasher.finish();
        if self.history.contains(&state) {
            return false;
        }
        if self.history.len() == HISTORY_LEN {
            self.history.pop_front();
        }
        self.history.push_back(state);
        true
    }

    fn farthest_points(&self, context: &AssignmentContext, route: &Route) -> Vec<RoutePointIndex> {
        let mut scored: Vec<(f64, RoutePointIndex)> = route
            .deliveries(context)
            .into_iter()
            .filter(|&delivery| route.take_point_for_reassign(context, delivery, self.require_non_empty).is_some())
            .map(|delivery| {
                let point = PointToReassign::of(context, delivery);
                (route.calculate_point_closeness_score(context, &point), delivery)
            })
            .collect();
        scored.sort_by(|a, b| b.0.total_cmp(&a.0));
        scored.into_iter().take(FARTHEST_POINTS).map(|(_, delivery)| delivery).collect()
    }

    fn try_move(
        &self,
        manager: &mut RoutesManager<'_>,
        source: usize,
        target: usize,
        delivery: RoutePointIndex,
    ) -> Option<(Route, Route)> {
        let context = manager.context();
        let (source_route, target_route) = (manager.route(source).clone(), manager.route(target).clone());
        let (without, point) = source_route.take_point_for_reassign(context, delivery, self.require_non_empty)?;
        if !without.is_valid(context) {
            return None;
        }
        let with = manager.find_best_place(target, &point, route_budget(context, target))?;
        let before = source_route.get_route_duration(context) + target_route.get_route_duration(context);
        let after = without.get_route_duration(context) + with.get_route_duration(context);
        (after < before).then_some((without, with))
    }

    fn try_swap(
        &self,
        manager: &RoutesManager<'_>,
        source: usize,
        target: usize,
        delivery: RoutePointIndex,
    ) -> Option<(Route, Route)> {
        let context = manager.context();
        let (source_route, target_route) = (manager.route(source), manager.route(target));
        let (source_without, point) = source_route.take_point_for_reassign(context, delivery, false)?;
        let before = source_route.get_route_duration(context) + target_route.get_route_duration(context);

        // The target's stops closest to the source route are swapped first.
        let mut others: Vec<(f64, RoutePointIndex)> = target_route
            .deliveries(context)
            .into_iter()
            .map(|other| {
                let other_point = PointToReassign::of(context, other);
                (source_without.calculate_point_closeness_score(context, &other_point), other)
            })
            .collect();
        others.sort_by(|a, b| a.0.total_cmp(&b.0));

        // Swap candidates are evaluated against a scratch cache.
        let mut cache = InsertionCache::new();
        for (_, other) in others.into_iter().take(TARGET_ROUTES) {
            let Some((target_without, other_point)) = target_route.take_point_for_reassign(context, other, false) else {
                continue;
            };
            let Some(new_source) =
                source_without.find_best_place(context, &mut cache, &other_point, route_budget(context, source))
            else {
                continue;
            };
            let Some(new_target) =
                target_without.find_best_place(context, &mut cache, &point, route_budget(context, target))
            else {
                continue;
            };
            let after = new_source.get_route_duration(context) + new_target.get_route_duration(context);
            if after < before {
                return Some((new_source, new_target));
            }
        }
        None
    }
}

impl Heuristic for MoveAndSwapPointsHelper {
    fn name(&self) -> &'static str {
        "move_and_swap_points"
    }

    fn process(&mut self, manager: &mut RoutesManager<'_>, _pool: &mut ReassignmentPool) -> Result<usize> {
        let context = manager.context();
        let vehicles = context.vehicles().len();
        let mut total = 0;

        for _ in 0..self.passes {
            let mut changes = vec![0usize; vehicles];
            let mut changed = false;

            for source in 0..vehicles {
                let farthest = self.farthest_points(context, manager.route(source));
                for delivery in farthest {
                    if changes[source] >= CHANGES_PER_ROUTE {
                        break;
                    }
                    // An earlier swap may have taken it away.
                    if !manager.route(source).contains(delivery) {
                        continue;
                    }
                    let point = PointToReassign::of(context, delivery);
                    let own = manager.route(source).calculate_point_closeness_score(context, &point);

                    let mut targets: Vec<(f64, usize)> = manager
                        .routes()
                        .iter()
                        .filter(|route| route.vehicle() != source && changes[route.vehicle()] < CHANGES_PER_ROUTE)
                        .filter(|route| point.is_available_for(context, route.vehicle()))
                        .map(|route| (route.calculate_point_closeness_score(context, &point), route.vehicle()))
                        .filter(|(score, _)| *score < own)
                        .collect();
                    targets.sort_by(|a, b| a.0.total_cmp(&b.0));

                    for (_, target) in targets.into_iter().take(TARGET_ROUTES) {
                        let Some((new_source, new_target)) = self
                            .try_move(manager, source, target, delivery)
                            .or_else(|| self.try_swap(manager, source, target, delivery))
                        else {
                            continue;
                        };
                        if !self.remember(&new_source, &new_target) {
                            continue;
                        }
                        manager.rewrite_routes([new_source, new_target])?;
                        changes[source] += 1;
                        changes[target] += 1;
                        total += 1;
                        changed = true;
                        break;
                    }
                }
            }

            if !changed {
                break;
            }
        }
        Ok(total)
    }
}
