//! Fixtures shared by the unit tests.

use crate::context::AssignmentContext;
use crate::error::Result;
use crate::events::RecordedEvents;
use crate::model::{DriverRecord, EngineParameters, JobRecord};
use crate::traits::{DirectionsProvider, Leg};

/// One minute and one kilometer per unit of Manhattan distance.
pub struct ManhattanDirections;

impl DirectionsProvider for ManhattanDirections {
    fn directions(&self, waypoints: &[(f64, f64)]) -> Result<Vec<Option<Leg>>> {
        Ok(waypoints
            .windows(2)
            .map(|pair| {
                let units = (pair[0].0 - pair[1].0).abs() + (pair[0].1 - pair[1].1).abs();
                Some(Leg {
                    distance: (units * 1000.0).round() as i64,
                    duration: (units * 60.0).round() as i64,
                })
            })
            .collect())
    }

    fn max_waypoints(&self) -> usize {
        50
    }
}

pub const HOUR: i64 = 3600;

/// Driver on an 08:00-18:00 shift without fixed start or end.
pub fn driver(id: &str) -> DriverRecord {
    DriverRecord::new(id, 8 * HOUR, 18 * HOUR)
}

/// Driver starting and ending at `location`.
pub fn driver_at(id: &str, location: (f64, f64)) -> DriverRecord {
    let mut record = driver(id);
    record.start_location = Some(location);
    record.end_location = Some(location);
    record
}

pub fn job(id: &str, location: (f64, f64)) -> JobRecord {
    JobRecord::new(id, location)
}

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

pub fn context(drivers: Vec<DriverRecord>, jobs: Vec<JobRecord>) -> AssignmentContext {
    AssignmentContext::build(&params(drivers, jobs), &ManhattanDirections, &RecordedEvents::new())
        .unwrap()
}
