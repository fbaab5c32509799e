use std::cell::OnceCell;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use im::Vector;

use crate::context::AssignmentContext;
use crate::model::RoutePointIndex;
use crate::reassign::PointToReassign;
use crate::routing::cache::InsertionCache;
use crate::routing::schedule::{self, Schedule, TWO_DAYS};

/// Ordered job points served by one vehicle, start and end nodes excluded.
///
/// Routes are values: every edit returns a new route, so the derived
/// schedule and validity are computed at most once per state.
#[derive(Debug, Clone)]
pub struct Route {
    vehicle: usize,
    job_points: Vector<RoutePointIndex>,
    schedule: OnceCell<Arc<Schedule>>,
    finish: OnceCell<i64>,
    valid: OnceCell<bool>,
}

impl PartialEq for Route {
    fn eq(&self, other: &Self) -> bool {
        self.vehicle == other.vehicle && self.job_points == other.job_points
    }
}

impl Eq for Route {}

impl Hash for Route {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.vehicle.hash(state);
        self.job_points.hash(state);
    }
}

impl Route {
    pub fn new(vehicle: usize, job_points: impl IntoIterator<Item = RoutePointIndex>) -> Self {
        Self::from_vector(vehicle, job_points.into_iter().collect())
    }

    fn from_vector(vehicle: usize, job_points: Vector<RoutePointIndex>) -> Self {
        Self {
            vehicle,
            job_points,
            schedule: OnceCell::new(),
            finish: OnceCell::new(),
            valid: OnceCell::new(),
        }
    }

    /// The same stops served by another vehicle.
    pub fn for_vehicle(&self, vehicle: usize) -> Self {
        Self::from_vector(vehicle, self.job_points.clone())
    }

    pub fn vehicle(&self) -> usize {
        self.vehicle
    }

    pub fn job_points(&self) -> &Vector<RoutePointIndex> {
        &self.job_points
    }

    pub fn len(&self) -> usize {
        self.job_points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.job_points.is_empty()
    }

    pub fn contains(&self, index: RoutePointIndex) -> bool {
        self.job_points.contains(&index)
    }

    pub fn deliveries(&self, context: &AssignmentContext) -> Vec<RoutePointIndex> {
        self.job_points
            .iter()
            .copied()
            .filter(|&index| context.is_delivery(index))
            .collect()
    }

    pub fn schedule(&self, context: &AssignmentContext) -> &Schedule {
        self.schedule.get_or_init(|| {
            Arc::new(schedule::simulate(
                context,
                context.vehicle(self.vehicle),
                self.job_points.iter().copied(),
            ))
        })
    }

    pub fn get_route_finish_time(&self, context: &AssignmentContext) -> i64 {
        *self.finish.get_or_init(|| {
            let vehicle = context.vehicle(self.vehicle);
            if vehicle.breaks.is_empty() {
                schedule::finish_without_breaks(context, vehicle, self.job_points.iter().copied())
            } else {
                self.schedule(context).finish
            }
        })
    }

    /// Time from shift start to finish; zero for an empty route.
    pub fn get_route_duration(&self, context: &AssignmentContext) -> i64 {
        if self.is_empty() {
            return 0;
        }
        match self.get_route_finish_time(context) {
            TWO_DAYS => TWO_DAYS,
            finish => finish - context.vehicle(self.vehicle).start_time,
        }
    }

    /// Every stop starts service inside its window. Unless `only_orders`,
    /// the vehicle must also fit its breaks and be done by shift end.
    pub fn is_time_windows_valid(&self, context: &AssignmentContext, only_orders: bool) -> bool {
        if self.is_empty() {
            return true;
        }
        let schedule = self.schedule(context);
        let orders_valid = schedule
            .visits
            .iter()
            .all(|visit| visit.start <= context.window(visit.point).1);
        if only_orders {
            return orders_valid;
        }
        orders_valid
            && schedule.breaks_feasible
            && schedule.finish <= context.vehicle(self.vehicle).end_time
    }

    pub fn is_capacity_valid(&self, context: &AssignmentContext) -> bool {
        self.is_capacity_valid_with_offset(context, 0)
    }

    /// Load never exceeds the vehicle capacity. Goods of deliveries without
    /// pickups are loaded at the depot; `offset` is load already committed
    /// before the route starts.
    pub fn is_capacity_valid_with_offset(&self, context: &AssignmentContext, offset: i64) -> bool {
        let Some(capacity) = context.vehicle(self.vehicle).capacity else {
            return true;
        };
        let preload: i64 = self
            .job_points
            .iter()
            .filter(|&&index| context.is_delivery(index) && context.pickups_of(index).is_empty())
            .map(|&index| -context.site(index).capacity_delta())
            .sum();

        let mut load = preload + offset;
        if load > capacity {
            return false;
        }
        for &index in &self.job_points {
            load += context.site(index).capacity_delta();
            if load > capacity {
                return false;
            }
        }
        true
    }

    pub fn is_skills_valid(&self, context: &AssignmentContext) -> bool {
        self.job_points
            .iter()
            .all(|&index| context.is_node_available(self.vehicle, index))
    }

    /// Pickups ride with their delivery and come before it.
    pub fn is_pairing_valid(&self, context: &AssignmentContext) -> bool {
        let positions: HashMap<RoutePointIndex, usize> = self
            .job_points
            .iter()
            .enumerate()
            .map(|(position, &index)| (index, position))
            .collect();

        positions.iter().all(|(&index, &position)| {
            if context.is_delivery(index) {
                context
                    .pickups_of(index)
                    .iter()
                    .all(|pickup| positions.get(pickup).is_some_and(|&at| at < position))
            } else {
                context
                    .delivery_of(index)
                    .and_then(|delivery| positions.get(&delivery))
                    .is_some_and(|&at| at > position)
            }
        })
    }

    pub fn is_start_sequence_valid(&self, context: &AssignmentContext) -> bool {
        let required = context.vehicle(self.vehicle).required_job_points();
        self.job_points.len() >= required.len()
            && self.job_points.iter().zip(required).all(|(a, b)| a == b)
    }

    pub fn is_valid(&self, context: &AssignmentContext) -> bool {
        *self.valid.get_or_init(|| {
            self.is_skills_valid(context)
                && self.is_pairing_valid(context)
                && self.is_start_sequence_valid(context)
                && self.is_capacity_valid(context)
                && self.is_time_windows_valid(context, false)
        })
    }

    pub fn with_block(&self, position: usize, block: &[RoutePointIndex]) -> Self {
        let mut job_points = self.job_points.clone();
        for (offset, &index) in block.iter().enumerate() {
            job_points.insert(position + offset, index);
        }
        Self::from_vector(self.vehicle, job_points)
    }

    pub fn without_point(&self, point: &PointToReassign) -> Self {
        let job_points = self
            .job_points
            .iter()
            .copied()
            .filter(|&index| !point.contains(index))
            .collect();
        Self::from_vector(self.vehicle, job_points)
    }

    /// Detaches `delivery` and its pickups. Refused for mandatory points,
    /// points of the required start sequence and, when `require_non_empty`,
    /// the last delivery of the route.
    pub fn take_point_for_reassign(
        &self,
        context: &AssignmentContext,
        delivery: RoutePointIndex,
        require_non_empty: bool,
    ) -> Option<(Route, PointToReassign)> {
        if !context.is_delivery(delivery) || !self.contains(delivery) {
            return None;
        }
        let point = PointToReassign::of(context, delivery);
        if !point.allow_skip(context) {
            return None;
        }
        let fixed = context.vehicle(self.vehicle).required_job_points();
        if fixed.iter().any(|&index| point.contains(index)) {
            return None;
        }
        if require_non_empty && self.deliveries(context).len() == 1 {
            return None;
        }
        Some((self.without_point(&point), point))
    }

    /// Cheapest valid route obtained by inserting the point's block at some
    /// position, as long as its duration stays within `max_duration`.
    pub fn find_best_place(
        &self,
        context: &AssignmentContext,
        cache: &mut InsertionCache,
        point: &PointToReassign,
        max_duration: i64,
    ) -> Option<Route> {
        if self.contains(point.delivery) || !point.is_available_for(context, self.vehicle) {
            return None;
        }
        let block = point.block();
        let first = context
            .vehicle(self.vehicle)
            .fixed_prefix_len()
            .min(self.len());

        let mut best: Option<(i64, usize)> = None;
        for position in first..=self.len() {
            let key = InsertionCache::key(self, point.delivery, position);
            let duration = match cache.get(key) {
                Some(duration) => duration,
                None => {
                    let candidate = self.with_block(position, &block);
                    let duration = candidate
                        .is_valid(context)
                        .then(|| candidate.get_route_duration(context));
                    cache.insert(key, duration);
                    duration
                }
            };
            if let Some(duration) = duration
                && duration <= max_duration
                && best.is_none_or(|(current, _)| duration < current)
            {
                best = Some((duration, position));
            }
        }
        best.map(|(_, position)| self.with_block(position, &block))
    }

    /// Mean travel time from the point to its nearest stops on this route
    /// (the closest 80%), real depots included. Lower means closer.
    pub fn calculate_point_closeness_score(&self, context: &AssignmentContext, point: &PointToReassign) -> f64 {
        let vehicle = context.vehicle(self.vehicle);
        let endpoints = [vehicle.start, vehicle.end]
            .into_iter()
            .filter(|&index| context.site(index).fake_depot_vehicle().is_none());
        let mut times: Vec<i64> = endpoints
            .chain(self.job_points.iter().copied().filter(|&index| !point.contains(index)))
            .map(|other| context.total_time(self.vehicle, point.delivery, other))
            .collect();
        if times.is_empty() {
            return f64::INFINITY;
        }
        times.sort_unstable();
        let nearest = (4 * times.len()).div_ceil(5);
        times[..nearest].iter().sum::<i64>() as f64 / nearest as f64
    }
}
