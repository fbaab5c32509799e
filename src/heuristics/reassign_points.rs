use std::collections::HashMap;

use crate::error::Result;
use crate::heuristics::{Heuristic, route_budget};
use crate::model::RoutePointIndex;
use crate::reassign::ReassignmentPool;
use crate::routing::RoutesManager;

/// Greedy reinsertion of pooled points.
///
/// Works through the pool one active batch at a time. Within a batch the
/// cheapest insertion (smallest increase in route duration) over all
/// `(route, point)` pairs is committed until nothing fits.
#[derive(Debug, Clone)]
pub struct RoutePointsReassignHelper {
    active_limit: usize,
    /// Marginal duration of inserting a point into a route; `None` when it
    /// does not fit. Entries of a route are dropped when it changes.
    costs: HashMap<(usize, RoutePointIndex), Option<i64>>,
}

impl RoutePointsReassignHelper {
    pub fn new(active_limit: usize) -> Self {
        Self {
            active_limit: active_limit.max(1),
            costs: HashMap::new(),
        }
    }

    fn marginal_cost(&mut self, manager: &mut RoutesManager<'_>, vehicle: usize, delivery: RoutePointIndex, pool: &ReassignmentPool) -> Option<i64> {
        if let Some(&cost) = self.costs.get(&(vehicle, delivery)) {
            return cost;
        }
        let context = manager.context();
        let cost = pool.get(delivery).and_then(|point| {
            let current = manager.route(vehicle).get_route_duration(context);
            manager
                .find_best_place(vehicle, point, route_budget(context, vehicle))
                .map(|route| route.get_route_duration(context) - current)
        });
        self.costs.insert((vehicle, delivery), cost);
        cost
    }

    fn insert_batch(&mut self, manager: &mut RoutesManager<'_>, pool: &mut ReassignmentPool) -> Result<usize> {
        let vehicles = manager.context().vehicles().len();
        let mut inserted = 0;
        loop {
            let mut best: Option<(i64, usize, RoutePointIndex)> = None;
            for delivery in pool.active().to_vec() {
                for vehicle in 0..vehicles {
                    if let Some(cost) = self.marginal_cost(manager, vehicle, delivery, pool)
                        && best.is_none_or(|(current, _, _)| cost < current)
                    {
                        best = Some((cost, vehicle, delivery));
                    }
                }
            }

            let Some((_, vehicle, delivery)) = best else {
                return Ok(inserted);
            };
            let context = manager.context();
            let route = pool
                .get(delivery)
                .and_then(|point| manager.find_best_place(vehicle, point, route_budget(context, vehicle)));
            match route {
                Some(route) => {
                    manager.rewrite_routes([route])?;
                    pool.remove(delivery);
                    self.costs.retain(|&(cached, _), _| cached != vehicle);
                    inserted += 1;
                }
                None => {
                    // Stale cost; forget it and look again.
                    self.costs.insert((vehicle, delivery), None);
                }
            }
        }
    }
}

impl Heuristic for RoutePointsReassignHelper {
    fn name(&self) -> &'static str {
        "route_points_reassign"
    }

    fn process(&mut self, manager: &mut RoutesManager<'_>, pool: &mut ReassignmentPool) -> Result<usize> {
        self.costs.clear();
        pool.reset_attempts();

        let mut inserted = 0;
        while pool.activate_points_to_reassign(manager, self.active_limit) > 0 {
            inserted += self.insert_batch(manager, pool)?;
            pool.finish_active();
        }
        pool.reset_attempts();
        Ok(inserted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reassign::PointToReassign;
    use crate::routing::Route;
    use crate::test_support::{HOUR, context, driver_at, job};

    #[test]
    fn test_pooled_points_are_inserted_cheapest_first() {
        let context = context(
            vec![driver_at("a", (0.0, 0.0)), driver_at("b", (10.0, 0.0))],
            vec![job("1", (1.0, 0.0)), job("2", (9.0, 0.0)), job("3", (2.0, 0.0))],
        );
        let mut manager = RoutesManager::new(&context, Vec::new()).unwrap();
        let mut pool = ReassignmentPool::new();
        for &delivery in context.deliveries() {
            pool.push(PointToReassign::of(&context, delivery));
        }
        let [one, two, three] = [0, 1, 2].map(|i| context.deliveries()[i]);

        let inserted = RoutePointsReassignHelper::new(2).process(&mut manager, &mut pool).unwrap();

        assert_eq!(inserted, 3);
        assert!(pool.is_empty());
        assert!(manager.route(0).contains(one) && manager.route(0).contains(three));
        assert_eq!(manager.route(1), &Route::new(1, [two]));
    }

    #[test]
    fn test_points_that_fit_nowhere_stay_pooled() {
        let mut late = job("1", (50.0, 0.0));
        late.deliver_before = Some(8 * HOUR + 60);
        let context = context(vec![driver_at("a", (0.0, 0.0))], vec![late, job("2", (1.0, 0.0))]);
        let mut manager = RoutesManager::new(&context, Vec::new()).unwrap();
        let mut pool = ReassignmentPool::new();
        for &delivery in context.deliveries() {
            pool.push(PointToReassign::of(&context, delivery));
        }

        let inserted = RoutePointsReassignHelper::new(1).process(&mut manager, &mut pool).unwrap();

        assert_eq!(inserted, 1);
        assert_eq!(pool.len(), 1);
        assert_eq!(pool.points()[0].delivery, context.deliveries()[0]);
        assert!(pool.active().is_empty());
    }
}
