//! Problem model: input records, sites, vehicles and the index types used by
//! the solver-facing node space.

pub mod params;
pub mod site;
pub mod vehicle;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use params::{BreakRecord, DepotRecord, DriverRecord, EngineParameters, JobRecord, PickupRecord};
pub use site::{JobSite, Site};
pub use vehicle::{Vehicle, VehicleBreak};

/// Capacities are scaled to integers; three decimal digits survive.
pub const CAPACITY_SCALE: f64 = 1000.0;

pub const SECONDS_PER_DAY: i64 = 24 * 3600;

/// Converts a fractional capacity into the fixed-point units used internally.
pub fn to_fixed_point(capacity: f64) -> i64 {
    (capacity * CAPACITY_SCALE).round() as i64
}

pub fn from_fixed_point(units: i64) -> f64 {
    units as f64 / CAPACITY_SCALE
}

/// Position in the solver's node space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RoutePointIndex(pub usize);

impl fmt::Display for RoutePointIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Index into the site table (and the rows of the matrices).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);
