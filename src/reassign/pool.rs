use std::collections::BTreeSet;

use crate::error::{Error, Result};
use crate::model::RoutePointIndex;
use crate::reassign::PointToReassign;
use crate::routing::{Route, RoutesManager};

/// Points waiting to be placed into some route.
///
/// Only a bounded active subset is offered to the reassignment heuristics at
/// a time; points already tried in the current round are set aside until
/// [`ReassignmentPool::reset_attempts`].
#[derive(Debug, Clone, Default)]
pub struct ReassignmentPool {
    points: Vec<PointToReassign>,
    active: Vec<RoutePointIndex>,
    attempted: BTreeSet<RoutePointIndex>,
    /// Mandatory points no vehicle may serve; reported, never pooled.
    unplaceable: Vec<PointToReassign>,
    skipped_collected: bool,
}

impl ReassignmentPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collects deliveries missing from every route. Mandatory ones are
    /// forced into the cheapest route they may enter; the cleaner repairs
    /// whatever that breaks. Runs once per pool.
    pub fn find_skipped_points(&mut self, manager: &mut RoutesManager<'_>) -> Result<usize> {
        if self.skipped_collected {
            return Err(Error::SkippedPointsAlreadyCollected);
        }
        self.skipped_collected = true;

        let context = manager.context();
        let assigned = manager.assigned_deliveries();
        let skipped: Vec<RoutePointIndex> = context
            .deliveries()
            .iter()
            .copied()
            .filter(|delivery| !assigned.contains(delivery) && !self.contains(*delivery))
            .collect();

        for &delivery in &skipped {
            let point = PointToReassign::of(context, delivery);
            if point.allow_skip(context) {
                self.push(point);
                continue;
            }
            match force_insert(manager, &point) {
                Some(route) => manager.rewrite_routes([route])?,
                None => {
                    tracing::warn!(%delivery, "mandatory delivery has no capable vehicle");
                    self.unplaceable.push(point);
                }
            }
        }
        Ok(skipped.len())
    }

    /// Picks up to `limit` not yet tried points for the next round, the ones
    /// cheapest to serve alone first.
    pub fn activate_points_to_reassign(&mut self, manager: &RoutesManager<'_>, limit: usize) -> usize {
        let context = manager.context();
        let mut ranked: Vec<(i64, RoutePointIndex)> = self
            .points
            .iter()
            .filter(|point| !self.attempted.contains(&point.delivery))
            .map(|point| {
                let rank = (0..context.vehicles().len())
                    .filter(|&vehicle| point.is_available_for(context, vehicle))
                    .map(|vehicle| Route::new(vehicle, point.block()).get_route_duration(context))
                    .min()
                    .unwrap_or(i64::MAX);
                (rank, point.delivery)
            })
            .collect();
        ranked.sort();
        self.active = ranked.into_iter().take(limit).map(|(_, delivery)| delivery).collect();
        self.active.len()
    }

    /// Marks the active points as tried and clears the active set.
    pub fn finish_active(&mut self) {
        self.attempted.extend(self.active.drain(..));
    }

    pub fn reset_attempts(&mut self) {
        self.attempted.clear();
        self.active.clear();
    }

    pub fn push(&mut self, point: PointToReassign) {
        if !self.contains(point.delivery) {
            self.points.push(point);
        }
    }

    pub fn remove(&mut self, delivery: RoutePointIndex) -> Option<PointToReassign> {
        self.active.retain(|&active| active != delivery);
        let position = self.points.iter().position(|point| point.delivery == delivery)?;
        Some(self.points.remove(position))
    }

    pub fn get(&self, delivery: RoutePointIndex) -> Option<&PointToReassign> {
        self.points.iter().find(|point| point.delivery == delivery)
    }

    pub fn contains(&self, delivery: RoutePointIndex) -> bool {
        self.get(delivery).is_some()
    }

    pub fn points(&self) -> &[PointToReassign] {
        &self.points
    }

    pub fn active(&self) -> &[RoutePointIndex] {
        &self.active
    }

    pub fn unplaceable(&self) -> &[PointToReassign] {
        &self.unplaceable
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Points that stay unserved: pooled plus unplaceable.
    pub fn skipped_count(&self) -> usize {
        self.points.len() + self.unplaceable.len()
    }
}

/// Cheapest valid insertion of a mandatory point, or failing that the
/// cheapest invalid one at the end of a route the point may enter.
fn force_insert(manager: &mut RoutesManager<'_>, point: &PointToReassign) -> Option<Route> {
    let context = manager.context();
    let capable: Vec<usize> = (0..context.vehicles().len())
        .filter(|&vehicle| point.is_available_for(context, vehicle))
        .collect();

    let valid = capable
        .iter()
        .filter_map(|&vehicle| manager.find_best_place(vehicle, point, i64::MAX))
        .min_by_key(|route| route.get_route_duration(context));
    if valid.is_some() {
        return valid;
    }

    capable
        .iter()
        .map(|&vehicle| {
            let route = manager.route(vehicle);
            route.with_block(route.len(), &point.block())
        })
        .min_by_key(|route| route.get_route_duration(context))
}
