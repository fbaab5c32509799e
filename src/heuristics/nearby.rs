//! Closeness-driven moves: stops far from the rest of their route leave it,
//! and pooled stops go to the route they are closest to.

use crate::error::Result;
use crate::heuristics::{Heuristic, route_budget};
use crate::model::RoutePointIndex;
use crate::reassign::{PointToReassign, ReassignmentPool};
use crate::routing::RoutesManager;

/// Moves stops whose closeness score exceeds `coefficient` times their
/// route's average score into the pool.
#[derive(Debug, Clone)]
pub struct UnassignNonNearby {
    coefficient: f64,
    require_non_empty: bool,
}

impl UnassignNonNearby {
    pub fn new(coefficient: f64, require_non_empty: bool) -> Self {
        Self {
            coefficient,
            require_non_empty,
        }
    }
}

impl Heuristic for UnassignNonNearby {
    fn name(&self) -> &'static str {
        "unassign_non_nearby"
    }

    fn process(&mut self, manager: &mut RoutesManager<'_>, pool: &mut ReassignmentPool) -> Result<usize> {
        let context = manager.context();
        let mut dropped = 0;

        for vehicle in 0..context.vehicles().len() {
            let route = manager.route(vehicle).clone();
            let deliveries = route.deliveries(context);
            // A lone stop has nothing to be far from.
            if deliveries.len() < 2 {
                continue;
            }

            let mut scores: Vec<(RoutePointIndex, f64)> = deliveries
                .into_iter()
                .map(|delivery| {
                    let point = PointToReassign::of(context, delivery);
                    (delivery, route.calculate_point_closeness_score(context, &point))
                })
                .filter(|(_, score)| score.is_finite())
                .collect();
            if scores.is_empty() {
                continue;
            }
            let average = scores.iter().map(|(_, score)| score).sum::<f64>() / scores.len() as f64;
            scores.sort_by(|a, b| b.1.total_cmp(&a.1));

            let mut current = route;
            let mut changed = false;
            for (delivery, score) in scores {
                if score <= average * self.coefficient {
                    break;
                }
                let Some((without, point)) = current.take_point_for_reassign(context, delivery, self.require_non_empty)
                else {
                    continue;
                };
                if without.is_valid(context) {
                    current = without;
                    pool.push(point);
                    dropped += 1;
                    changed = true;
                }
            }
            if changed {
                manager.rewrite_routes([current])?;
            }
        }
        Ok(dropped)
    }
}

/// Moves a stop to another route when its own route is farther than
/// `ratio` times the other one. Stops after a pass with no move.
#[derive(Debug, Clone)]
pub struct NearbyReassignByClosenessDiff {
    ratio: f64,
    require_non_empty: bool,
}

impl NearbyReassignByClosenessDiff {
    pub fn new(ratio: f64, require_non_empty: bool) -> Self {
        Self {
            ratio,
            require_non_empty,
        }
    }

    /// `(gain, from, to, delivery)` for every stop closer to another route.
    fn candidates(&self, manager: &RoutesManager<'_>) -> Vec<(f64, usize, usize, RoutePointIndex)> {
        let context = manager.context();
        let mut candidates = Vec::new();
        for from in manager.routes() {
            for delivery in from.deliveries(context) {
                let point = PointToReassign::of(context, delivery);
                let own = from.calculate_point_closeness_score(context, &point);
                for to in manager.routes() {
                    if to.vehicle() == from.vehicle() || !point.is_available_for(context, to.vehicle()) {
                        continue;
                    }
                    let other = to.calculate_point_closeness_score(context, &point);
                    if other.is_finite() && own > other * self.ratio {
                        candidates.push((own - other, from.vehicle(), to.vehicle(), delivery));
                    }
                }
            }
        }
        candidates.sort_by(|a, b| b.0.total_cmp(&a.0));
        candidates
    }
}

impl Heuristic for NearbyReassignByClosenessDiff {
    fn name(&self) -> &'static str {
        "nearby_reassign_by_closeness_diff"
    }

    fn process(&mut self, manager: &mut RoutesManager<'_>, _pool: &mut ReassignmentPool) -> Result<usize> {
        let context = manager.context();
        let limit = context.deliveries().len() * context.vehicles().len() + 1;
        let mut moves = 0;

        for _ in 0..limit {
            let mut moved = false;
            for (_, from, to, delivery) in self.candidates(manager) {
                let Some((without, point)) =
                    manager
                        .route(from)
                        .take_point_for_reassign(context, delivery, self.require_non_empty)
                else {
                    continue;
                };
                if !without.is_valid(context) {
                    continue;
                }
                let Some(with) = manager.find_best_place(to, &point, route_budget(context, to)) else {
                    continue;
                };
                manager.rewrite_routes([without, with])?;
                moves += 1;
                moved = true;
                break;
            }
            if !moved {
                break;
            }
        }
        Ok(moves)
    }
}

/// Places pooled points into the closest route that accepts them.
#[derive(Debug, Clone, Copy, Default)]
pub struct NearbyAssignByCloseness;

impl Heuristic for NearbyAssignByCloseness {
    fn name(&self) -> &'static str {
        "nearby_assign_by_closeness"
    }

    fn process(&mut self, manager: &mut RoutesManager<'_>, pool: &mut ReassignmentPool) -> Result<usize> {
        let context = manager.context();
        let mut assigned = 0;

        // Each pass places at least one point or ends the loop.
        for _ in 0..=pool.len() {
            let mut changed = false;
            for point in pool.points().to_vec() {
                let mut closest: Vec<(f64, usize)> = manager
                    .routes()
                    .iter()
                    .filter(|route| point.is_available_for(context, route.vehicle()))
                    .map(|route| (route.calculate_point_closeness_score(context, &point), route.vehicle()))
                    .collect();
                closest.sort_by(|a, b| a.0.total_cmp(&b.0));

                for (_, vehicle) in closest {
                    if let Some(route) = manager.find_best_place(vehicle, &point, route_budget(context, vehicle)) {
                        manager.rewrite_routes([route])?;
                        pool.remove(point.delivery);
                        assigned += 1;
                        changed = true;
                        break;
                    }
                }
            }
            if !changed {
                break;
            }
        }
        Ok(assigned)
    }
}
