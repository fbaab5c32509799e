use std::collections::{BTreeSet, HashMap, HashSet};

use crate::context::AssignmentContext;
use crate::error::{Error, Result};
use crate::model::RoutePointIndex;
use crate::reassign::PointToReassign;
use crate::routing::Route;
use crate::routing::cache::InsertionCache;
use crate::traits::InitialAssignment;

/// Owns the current route of every vehicle. All edits go through
/// [`RoutesManager::rewrite_routes`], which refuses any state where a
/// delivery is served twice.
#[derive(Debug, Clone)]
pub struct RoutesManager<'a> {
    context: &'a AssignmentContext,
    routes: Vec<Route>,
    cache: InsertionCache,
}

impl<'a> RoutesManager<'a> {
    /// Wraps one route per vehicle; vehicles without a route start empty.
    pub fn new(context: &'a AssignmentContext, routes: Vec<Route>) -> Result<Self> {
        let mut manager = Self {
            context,
            routes: (0..context.vehicles().len()).map(|vehicle| Route::new(vehicle, [])).collect(),
            cache: InsertionCache::new(),
        };
        manager.rewrite_routes(routes)?;
        Ok(manager)
    }

    /// Builds routes from raw solver output.
    ///
    /// Start/end nodes and points of dropped orders are stripped, the
    /// required start sequences are moved to the head of their vehicle's
    /// route and pickups are moved next to their delivery. A delivery listed
    /// by two vehicles is an error.
    pub fn from_assignment(context: &'a AssignmentContext, assignment: &InitialAssignment) -> Result<Self> {
        let vehicle_count = context.vehicles().len();
        let mut raw: Vec<Vec<RoutePointIndex>> = vec![Vec::new(); vehicle_count];
        for (&vehicle, points) in assignment {
            if vehicle >= vehicle_count {
                return Err(Error::InvalidParameters(format!("assignment for unknown vehicle {}", vehicle)));
            }
            for &index in points {
                if !context.contains_point(index) {
                    return Err(Error::UnknownPoint(index));
                }
                if context.is_active_job_point(index) {
                    raw[vehicle].push(index);
                }
            }
        }

        for vehicle in context.vehicles() {
            let fixed = vehicle.required_job_points();
            if fixed.is_empty() {
                continue;
            }
            for points in raw.iter_mut() {
                points.retain(|index| !fixed.contains(index));
            }
            raw[vehicle.index].splice(0..0, fixed.iter().copied());
        }

        let mut delivery_owner: HashMap<RoutePointIndex, usize> = HashMap::new();
        for (vehicle, points) in raw.iter().enumerate() {
            for &index in points.iter().filter(|&&index| context.is_delivery(index)) {
                if delivery_owner.insert(index, vehicle).is_some() {
                    return Err(Error::DuplicateDelivery(index));
                }
            }
        }

        let routes = raw
            .into_iter()
            .enumerate()
            .map(|(vehicle, points)| Route::new(vehicle, pair_pickups(context, vehicle, &points, &delivery_owner)))
            .collect();
        Self::new(context, routes)
    }

    pub fn context(&self) -> &'a AssignmentContext {
        self.context
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn route(&self, vehicle: usize) -> &Route {
        &self.routes[vehicle]
    }

    pub fn cache(&self) -> &InsertionCache {
        &self.cache
    }

    /// Best insertion of `point` into the current route of `vehicle`.
    pub fn find_best_place(&mut self, vehicle: usize, point: &PointToReassign, max_duration: i64) -> Option<Route> {
        self.routes[vehicle].find_best_place(self.context, &mut self.cache, point, max_duration)
    }

    /// Replaces the routes of the given vehicles in one step.
    ///
    /// The new state is staged first; nothing is committed if a delivery
    /// would end up in two routes.
    pub fn rewrite_routes(&mut self, routes: impl IntoIterator<Item = Route>) -> Result<()> {
        let mut staged = self.routes.clone();
        for route in routes {
            let vehicle = route.vehicle();
            let slot = staged
                .get_mut(vehicle)
                .ok_or_else(|| Error::InvalidParameters(format!("route for unknown vehicle {}", vehicle)))?;
            *slot = route;
        }

        let mut seen = HashSet::new();
        for route in &staged {
            for index in route.job_points().iter().copied() {
                if self.context.is_delivery(index) && !seen.insert(index) {
                    return Err(Error::DuplicateDelivery(index));
                }
            }
        }

        self.routes = staged;
        Ok(())
    }

    pub fn assigned_deliveries(&self) -> BTreeSet<RoutePointIndex> {
        self.routes
            .iter()
            .flat_map(|route| route.deliveries(self.context))
            .collect()
    }

    pub fn total_duration(&self) -> i64 {
        self.routes
            .iter()
            .map(|route| route.get_route_duration(self.context))
            .sum()
    }

    pub fn used_vehicles(&self) -> usize {
        self.routes.iter().filter(|route| !route.is_empty()).count()
    }

    pub fn invalid_routes(&self) -> Vec<usize> {
        self.routes
            .iter()
            .filter(|route| !route.is_valid(self.context))
            .map(Route::vehicle)
            .collect()
    }

    pub fn into_routes(self) -> Vec<Route> {
        self.routes
    }
}

/// Keeps pickups of deliveries served by `vehicle` before their delivery and
/// drops the others.
fn pair_pickups(
    context: &AssignmentContext,
    vehicle: usize,
    points: &[RoutePointIndex],
    delivery_owner: &HashMap<RoutePointIndex, usize>,
) -> Vec<RoutePointIndex> {
    let mut placed = HashSet::new();
    let mut paired = Vec::with_capacity(points.len());
    for (position, &index) in points.iter().enumerate() {
        if context.is_delivery(index) {
            for &pickup in context.pickups_of(index) {
                if placed.insert(pickup) {
                    paired.push(pickup);
                }
            }
            paired.push(index);
            continue;
        }
        let keep = context.delivery_of(index).is_some_and(|delivery| {
            delivery_owner.get(&delivery) == Some(&vehicle) && points[position..].contains(&delivery)
        });
        if keep && placed.insert(index) {
            paired.push(index);
        }
    }
    paired
}
