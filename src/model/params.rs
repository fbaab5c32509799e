//! Input records handed over by the host scheduler.
//!
//! Times of day are seconds from local midnight; job windows are absolute
//! unix timestamps and get converted by the assignment context.

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct EngineParameters {
    /// Planned day, in days since the unix epoch.
    pub day: i64,
    /// Offset of the local timezone from UTC.
    #[serde(default)]
    pub utc_offset_secs: i64,
    #[serde(default)]
    pub default_pickup_service_secs: i64,
    #[serde(default)]
    pub default_delivery_service_secs: i64,
    #[serde(default)]
    pub depots: Vec<DepotRecord>,
    pub drivers: Vec<DriverRecord>,
    pub jobs: Vec<JobRecord>,
}

impl EngineParameters {
    /// Unix timestamp of the local midnight that starts `day`.
    pub fn day_start(&self) -> i64 {
        self.day * crate::model::SECONDS_PER_DAY - self.utc_offset_secs
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DepotRecord {
    pub id: String,
    pub location: (f64, f64),
}

#[derive(Debug, Clone, Deserialize)]
pub struct BreakRecord {
    pub start: i64,
    pub end: i64,
    #[serde(default)]
    pub drift_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DriverRecord {
    pub id: String,
    pub start_time: i64,
    pub end_time: i64,
    /// Depot the shift starts from; takes precedence over `start_location`.
    #[serde(default)]
    pub start_depot: Option<String>,
    #[serde(default)]
    pub end_depot: Option<String>,
    #[serde(default)]
    pub start_location: Option<(f64, f64)>,
    #[serde(default)]
    pub end_location: Option<(f64, f64)>,
    #[serde(default)]
    pub capacity: Option<f64>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub breaks: Vec<BreakRecord>,
    /// Unique ids of the sites the route has to begin with, start site first.
    #[serde(default)]
    pub required_start_sequence: Option<Vec<String>>,
}

impl DriverRecord {
    pub fn new(id: impl Into<String>, start_time: i64, end_time: i64) -> Self {
        Self {
            id: id.into(),
            start_time,
            end_time,
            start_depot: None,
            end_depot: None,
            start_location: None,
            end_location: None,
            capacity: None,
            skills: Vec::new(),
            breaks: Vec::new(),
            required_start_sequence: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PickupRecord {
    pub id: String,
    pub location: (f64, f64),
    #[serde(default)]
    pub pickup_after: Option<i64>,
    #[serde(default)]
    pub pickup_before: Option<i64>,
    #[serde(default)]
    pub capacity: f64,
    #[serde(default)]
    pub service_secs: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JobRecord {
    /// Order id; the delivery site is `delivery#<id>`.
    pub id: String,
    pub location: (f64, f64),
    #[serde(default)]
    pub deliver_after: Option<i64>,
    #[serde(default)]
    pub deliver_before: Option<i64>,
    #[serde(default)]
    pub capacity: f64,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub driver_id: Option<String>,
    #[serde(default)]
    pub service_secs: Option<i64>,
    #[serde(default = "default_allow_skip")]
    pub allow_skip: bool,
    #[serde(default)]
    pub pickups: Vec<PickupRecord>,
}

fn default_allow_skip() -> bool {
    true
}

impl JobRecord {
    pub fn new(id: impl Into<String>, location: (f64, f64)) -> Self {
        Self {
            id: id.into(),
            location,
            deliver_after: None,
            deliver_before: None,
            capacity: 0.0,
            skills: Vec::new(),
            driver_id: None,
            service_secs: None,
            allow_skip: true,
            pickups: Vec::new(),
        }
    }
}
