//! Planner entry point and the bundled greedy seed solver.

use serde::Serialize;

use crate::config::SolveOptions;
use crate::context::AssignmentContext;
use crate::error::{Error, Result};
use crate::events::{Event, EventKind, EventLevel, EventSink};
use crate::heuristics;
use crate::model::{EngineParameters, RoutePointIndex, Site};
use crate::reassign::{PointToReassign, ReassignmentPool};
use crate::routing::{InsertionCache, Route, RoutesManager};
use crate::tracker::{BestResult, BestResultTracker};
use crate::traits::{ConstraintSolver, DirectionsProvider, InitialAssignment};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnassignedReason {
    /// The routing provider could not reach the order.
    NotAccessible,
    /// No vehicle has the skills (or is the pinned driver) for the order.
    NoCapableVehicle,
    /// Capable vehicles exist but no route has room for the order.
    NoFeasibleInsertion,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopKind {
    Start,
    Pickup,
    Delivery,
    End,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StopResult {
    pub site_id: String,
    pub order_id: Option<String>,
    pub kind: StopKind,
    pub arrival: i64,
    pub departure: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteResult {
    pub vehicle_id: String,
    pub stops: Vec<StopResult>,
    pub breaks: Vec<(i64, i64)>,
    pub driving_time: i64,
    pub driving_distance: i64,
    pub finish_time: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnassignedJob {
    pub job_id: String,
    pub reason: UnassignedReason,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannerResult {
    pub routes: Vec<RouteResult>,
    pub unassigned: Vec<UnassignedJob>,
}

/// Cheapest-insertion seed: deliveries are inserted one by one at the
/// position that grows the route duration least. The delivery order is
/// rotated by the attempt number so repeated runs start differently.
#[derive(Debug, Clone, Copy, Default)]
pub struct GreedyInsertionSolver;

impl ConstraintSolver for GreedyInsertionSolver {
    fn initial_assignment(&self, context: &AssignmentContext, attempt: usize) -> Result<InitialAssignment> {
        let mut routes: Vec<Route> = context
            .vehicles()
            .iter()
            .map(|vehicle| Route::new(vehicle.index, vehicle.required_job_points().iter().copied()))
            .collect();
        let fixed: Vec<RoutePointIndex> = routes.iter().flat_map(|route| route.job_points().iter().copied()).collect();

        let mut deliveries: Vec<RoutePointIndex> = context
            .deliveries()
            .iter()
            .copied()
            .filter(|delivery| !fixed.contains(delivery))
            .collect();
        if !deliveries.is_empty() {
            let shift = attempt % deliveries.len();
            deliveries.rotate_left(shift);
        }

        let mut cache = InsertionCache::new();
        for delivery in deliveries {
            let point = PointToReassign::of(context, delivery);
            let mut best: Option<(i64, Route)> = None;

            for route in &routes {
                if !point.is_available_for(context, route.vehicle()) {
                    continue;
                }
                let budget = context.vehicle(route.vehicle()).available_time();
                if let Some(candidate) = route.find_best_place(context, &mut cache, &point, budget) {
                    let cost = candidate.get_route_duration(context) - route.get_route_duration(context);
                    if best.as_ref().is_none_or(|(best_cost, _)| cost < *best_cost) {
                        best = Some((cost, candidate));
                    }
                }
            }

            if let Some((_, candidate)) = best {
                let vehicle = candidate.vehicle();
                routes[vehicle] = candidate;
            }
        }

        Ok(routes
            .into_iter()
            .map(|route| (route.vehicle(), route.job_points().iter().copied().collect()))
            .collect())
    }
}

/// Improves a seed assignment and returns the final routes and pool.
pub fn improve_assignment<'a>(
    context: &'a AssignmentContext,
    assignment: &InitialAssignment,
    options: &SolveOptions,
    events: &dyn EventSink,
) -> Result<(RoutesManager<'a>, ReassignmentPool)> {
    let mut manager = RoutesManager::from_assignment(context, assignment)?;
    let mut pool = ReassignmentPool::new();
    heuristics::improve(&mut manager, &mut pool, options, events)?;
    Ok((manager, pool))
}

/// Builds the context, runs `options.runs` optimization runs and returns
/// the best plan found.
pub fn solve<P, S>(
    params: &EngineParameters,
    provider: &P,
    constraint_solver: &S,
    options: &SolveOptions,
    events: &dyn EventSink,
) -> Result<PlannerResult>
where
    P: DirectionsProvider,
    S: ConstraintSolver,
{
    let context = AssignmentContext::build(params, provider, events)?;
    let mut tracker = BestResultTracker::new();

    for attempt in 0..options.runs.max(1) {
        let assignment = constraint_solver.initial_assignment(&context, attempt)?;
        let (manager, pool) = improve_assignment(&context, &assignment, options, events)?;
        let improved = tracker.record(&manager, &pool, attempt);
        events.emit(
            EventLevel::Dev,
            Event::new(
                EventKind::RunFinished,
                format!(
                    "run {}: {} skipped, {} vehicles, {}s total{}",
                    attempt,
                    pool.skipped_count(),
                    manager.used_vehicles(),
                    manager.total_duration(),
                    if improved { " (best so far)" } else { "" }
                ),
            ),
        );
    }

    let best = tracker
        .into_best()
        .ok_or_else(|| Error::InvalidParameters("no optimization run completed".to_string()))?;
    Ok(planner_result(&context, &best))
}

fn planner_result(context: &AssignmentContext, best: &BestResult) -> PlannerResult {
    let routes = best.routes.iter().map(|route| route_result(context, route)).collect();

    let mut unassigned: Vec<UnassignedJob> = context
        .inactive_orders()
        .iter()
        .map(|order| UnassignedJob {
            job_id: order.clone(),
            reason: UnassignedReason::NotAccessible,
        })
        .collect();
    for point in best.pool.points().iter().chain(best.pool.unplaceable()) {
        let capable = (0..context.vehicles().len()).any(|vehicle| point.is_available_for(context, vehicle));
        let reason = if capable {
            UnassignedReason::NoFeasibleInsertion
        } else {
            UnassignedReason::NoCapableVehicle
        };
        if let Some(job) = context.job(point.delivery) {
            unassigned.push(UnassignedJob {
                job_id: job.order_id.clone(),
                reason,
            });
        }
    }

    PlannerResult { routes, unassigned }
}

fn route_result(context: &AssignmentContext, route: &Route) -> RouteResult {
    let vehicle = context.vehicle(route.vehicle());
    let schedule = route.schedule(context);

    let mut stops = Vec::with_capacity(schedule.visits.len() + 2);
    if !route.is_empty() {
        stops.push(StopResult {
            site_id: context.site(vehicle.start).unique_id().to_string(),
            order_id: None,
            kind: StopKind::Start,
            arrival: vehicle.start_time,
            departure: vehicle.start_time,
        });
    }
    for visit in &schedule.visits {
        let site = context.site(visit.point);
        stops.push(StopResult {
            site_id: site.unique_id().to_string(),
            order_id: site.job().map(|job| job.order_id.clone()),
            kind: match site {
                Site::Pickup { .. } => StopKind::Pickup,
                _ => StopKind::Delivery,
            },
            arrival: visit.arrival,
            departure: visit.departure,
        });
    }
    if !route.is_empty() {
        stops.push(StopResult {
            site_id: context.site(vehicle.end).unique_id().to_string(),
            order_id: None,
            kind: StopKind::End,
            arrival: schedule.end_arrival,
            departure: schedule.end_arrival,
        });
    }

    RouteResult {
        vehicle_id: vehicle.driver_id.clone(),
        stops,
        breaks: schedule.breaks.clone(),
        driving_time: schedule.driving_time,
        driving_distance: schedule.driving_distance,
        finish_time: schedule.finish,
    }
}
