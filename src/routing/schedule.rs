//! Timeline simulation of a route, breaks included.

use crate::context::AssignmentContext;
use crate::model::{RoutePointIndex, SECONDS_PER_DAY, Vehicle};

/// Finish time reported when the vehicle cannot fit its breaks.
pub const TWO_DAYS: i64 = 2 * SECONDS_PER_DAY;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Visit {
    pub point: RoutePointIndex,
    pub arrival: i64,
    /// Service start, after waiting for the window to open.
    pub start: i64,
    pub departure: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schedule {
    pub visits: Vec<Visit>,
    /// Taken breaks as `(start, end)`.
    pub breaks: Vec<(i64, i64)>,
    pub end_arrival: i64,
    /// Time the vehicle is done, trailing breaks included; `TWO_DAYS` if a
    /// break could not be placed.
    pub finish: i64,
    pub breaks_feasible: bool,
    pub driving_time: i64,
    pub driving_distance: i64,
}

/// Runs the vehicle through `points` and back to its end node.
///
/// A break is taken right before the first activity that would otherwise
/// finish after the break's latest start. A break still pending after the
/// last activity is taken at the end only once its window is open.
pub fn simulate(context: &AssignmentContext, vehicle: &Vehicle, points: impl IntoIterator<Item = RoutePointIndex>) -> Schedule {
    let mut points = points.into_iter().peekable();
    if points.peek().is_none() {
        return Schedule {
            visits: Vec::new(),
            breaks: Vec::new(),
            end_arrival: vehicle.start_time,
            finish: vehicle.start_time,
            breaks_feasible: true,
            driving_time: 0,
            driving_distance: 0,
        };
    }

    let mut pending = vehicle.breaks.iter().peekable();
    let mut breaks = Vec::new();
    let mut breaks_feasible = true;
    let mut visits = Vec::new();
    let mut now = vehicle.start_time;
    let mut previous = vehicle.start;
    let mut driving_time = 0;
    let mut driving_distance = 0;
    let mut end_arrival = now;

    for point in points.chain(std::iter::once(vehicle.end)) {
        let travel = context.total_time(vehicle.index, previous, point);
        driving_time += travel;
        driving_distance += context.distance(vehicle.index, previous, point);
        let is_end = point == vehicle.end;
        let (open, _) = context.window(point);
        let service = context.site(point).service_secs();

        loop {
            let arrival = now + travel;
            let start = if is_end { arrival } else { arrival.max(open) };
            let departure = start + service;
            match pending.peek() {
                Some(brk) if departure > brk.latest_start() => {
                    if now > brk.latest_start() {
                        breaks_feasible = false;
                    }
                    let taken = now.max(brk.earliest_start());
                    breaks.push((taken, taken + brk.duration()));
                    now = taken + brk.duration();
                    pending.next();
                }
                _ => {
                    if is_end {
                        end_arrival = arrival;
                    } else {
                        visits.push(Visit {
                            point,
                            arrival,
                            start,
                            departure,
                        });
                    }
                    now = departure;
                    break;
                }
            }
        }
        previous = point;
    }

    // Breaks whose window has not opened yet fall after the working day.
    for brk in pending {
        if now < brk.earliest_start() {
            break;
        }
        if now > brk.latest_start() {
            breaks_feasible = false;
        }
        let taken = now.max(brk.earliest_start());
        breaks.push((taken, taken + brk.duration()));
        now = taken + brk.duration();
    }

    Schedule {
        visits,
        breaks,
        end_arrival,
        finish: if breaks_feasible { now } else { TWO_DAYS },
        breaks_feasible,
        driving_time,
        driving_distance,
    }
}

/// Finish time of a route whose vehicle has no breaks.
pub fn finish_without_breaks(context: &AssignmentContext, vehicle: &Vehicle, points: impl IntoIterator<Item = RoutePointIndex>) -> i64 {
    let mut now = vehicle.start_time;
    let mut previous = vehicle.start;
    let mut empty = true;
    for point in points {
        empty = false;
        let arrival = now + context.total_time(vehicle.index, previous, point);
        now = arrival.max(context.window(point).0) + context.site(point).service_secs();
        previous = point;
    }
    if empty {
        return vehicle.start_time;
    }
    now + context.total_time(vehicle.index, previous, vehicle.end)
}
