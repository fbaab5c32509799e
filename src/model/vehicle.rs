//! Vehicles (drivers) and their breaks.

use crate::model::RoutePointIndex;

/// A break that may slide by `drift_secs` around its nominal start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VehicleBreak {
    pub start: i64,
    pub end: i64,
    pub drift_secs: i64,
}

impl VehicleBreak {
    pub fn new(start: i64, end: i64, drift_minutes: i64) -> Self {
        Self {
            start,
            end,
            drift_secs: drift_minutes * 60,
        }
    }

    pub fn duration(&self) -> i64 {
        self.end - self.start
    }

    pub fn earliest_start(&self) -> i64 {
        self.start - self.drift_secs
    }

    pub fn latest_start(&self) -> i64 {
        self.start + self.drift_secs
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Vehicle {
    pub index: usize,
    pub driver_id: String,
    pub start_time: i64,
    pub end_time: i64,
    pub start: RoutePointIndex,
    pub end: RoutePointIndex,
    /// Fixed-point capacity; `None` means unlimited.
    pub capacity: Option<i64>,
    pub skills: Vec<String>,
    pub breaks: Vec<VehicleBreak>,
    /// Start node followed by the job points that must open the route.
    pub required_start_sequence: Option<Vec<RoutePointIndex>>,
}

impl Vehicle {
    /// Time budget of the shift.
    pub fn available_time(&self) -> i64 {
        self.end_time - self.start_time
    }

    pub fn has_skills(&self, required: &[String]) -> bool {
        required.iter().all(|skill| self.skills.contains(skill))
    }

    /// Job points that must open the route, in order.
    pub fn required_job_points(&self) -> &[RoutePointIndex] {
        match self.required_start_sequence.as_deref() {
            Some([first, rest @ ..]) if *first == self.start => rest,
            Some(sequence) => sequence,
            None => &[],
        }
    }

    /// Number of job points fixed at the head of the route.
    pub fn fixed_prefix_len(&self) -> usize {
        self.required_job_points().len()
    }
}
