//! Shared fixtures for the planner integration tests.
//!
//! - `ManhattanDirections`: a grid provider with exact, predictable legs
//! - builders for drivers, orders and parameters
//! - real Las Vegas places for the haversine and OSRM scenarios

#![allow(dead_code)]

pub mod vegas;

use dispatch_planner::{
    DirectionsProvider, DriverRecord, EngineParameters, JobRecord, Leg, PickupRecord, Result,
};

pub const HOUR: i64 = 3600;

/// One minute and one kilometer per grid unit. Points listed in
/// `unreachable` cannot be routed to or from.
#[derive(Debug, Default, Clone)]
pub struct ManhattanDirections {
    pub unreachable: Vec<(f64, f64)>,
}

impl ManhattanDirections {
    pub fn with_unreachable(points: &[(f64, f64)]) -> Self {
        Self {
            unreachable: points.to_vec(),
        }
    }
}

impl DirectionsProvider for ManhattanDirections {
    fn directions(&self, waypoints: &[(f64, f64)]) -> Result<Vec<Option<Leg>>> {
        Ok(waypoints
            .windows(2)
            .map(|pair| {
                if self.unreachable.contains(&pair[0]) || self.unreachable.contains(&pair[1]) {
                    return None;
                }
                let units = (pair[0].0 - pair[1].0).abs() + (pair[0].1 - pair[1].1).abs();
                Some(Leg {
                    distance: (units * 1000.0).round() as i64,
                    duration: (units * 60.0).round() as i64,
                })
            })
            .collect())
    }

    fn max_waypoints(&self) -> usize {
        25
    }

    fn is_symmetric(&self) -> bool {
        true
    }
}

/// 08:00-18:00 driver starting and ending at `home`.
pub fn driver_at(id: &str, home: (f64, f64)) -> DriverRecord {
    let mut driver = DriverRecord::new(id, 8 * HOUR, 18 * HOUR);
    driver.start_location = Some(home);
    driver.end_location = Some(home);
    driver
}

/// 08:00-18:00 driver based at a depot.
pub fn driver_from_depot(id: &str, depot: &str) -> DriverRecord {
    let mut driver = DriverRecord::new(id, 8 * HOUR, 18 * HOUR);
    driver.start_depot = Some(depot.to_string());
    driver.end_depot = Some(depot.to_string());
    driver
}

pub fn order(id: &str, location: (f64, f64)) -> JobRecord {
    JobRecord::new(id, location)
}

pub fn mandatory(id: &str, location: (f64, f64)) -> JobRecord {
    let mut job = order(id, location);
    job.allow_skip = false;
    job
}

/// Order collected at `pickup` before delivery.
pub fn order_with_pickup(id: &str, location: (f64, f64), pickup: (f64, f64)) -> JobRecord {
    let mut job = order(id, location);
    job.pickups.push(PickupRecord {
        id: format!("{}-p", id),
        location: pickup,
        pickup_after: None,
        pickup_before: None,
        capacity: 1.0,
        service_secs: None,
    });
    job
}

/// Parameters for day 0 in UTC, so windows are plain seconds of the day.
pub fn params(drivers: Vec<DriverRecord>, jobs: Vec<JobRecord>) -> EngineParameters {
    EngineParameters {
        day: 0,
        utc_offset_secs: 0,
        default_pickup_service_secs: 0,
        default_delivery_service_secs: 0,
        depots: Vec::new(),
        drivers,
        jobs,
    }
}
