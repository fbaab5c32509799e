//! Sites visited by vehicles.

/// Separator used inside unique ids.
pub const ID_SEPARATOR: char = '#';

/// Payload shared by pickups and deliveries.
#[derive(Debug, Clone, PartialEq)]
pub struct JobSite {
    pub unique_id: String,
    pub order_id: String,
    pub location: (f64, f64),
    /// Service may start within this window (solver seconds).
    pub window: (i64, i64),
    /// Signed load change in fixed-point units.
    pub capacity_delta: i64,
    pub skills: Vec<String>,
    pub driver: Option<String>,
    pub service_secs: i64,
    pub allow_skip: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Site {
    Depot {
        unique_id: String,
        location: (f64, f64),
    },
    /// Synthetic start or end of a vehicle without a fixed location.
    FakeDepot { unique_id: String, vehicle: usize },
    /// A concrete start/end location that is not a depot (e.g. a driver's home).
    Location {
        unique_id: String,
        location: (f64, f64),
    },
    Pickup {
        job: JobSite,
        /// Order id of the delivery this pickup feeds.
        delivery_order_id: String,
    },
    Delivery { job: JobSite },
}

impl Site {
    pub fn unique_id(&self) -> &str {
        match self {
            Site::Depot { unique_id, .. }
            | Site::FakeDepot { unique_id, .. }
            | Site::Location { unique_id, .. } => unique_id,
            Site::Pickup { job, .. } | Site::Delivery { job } => &job.unique_id,
        }
    }

    pub fn location(&self) -> Option<(f64, f64)> {
        match self {
            Site::Depot { location, .. } | Site::Location { location, .. } => Some(*location),
            Site::FakeDepot { .. } => None,
            Site::Pickup { job, .. } | Site::Delivery { job } => Some(job.location),
        }
    }

    pub fn job(&self) -> Option<&JobSite> {
        match self {
            Site::Pickup { job, .. } | Site::Delivery { job } => Some(job),
            _ => None,
        }
    }

    pub fn is_delivery(&self) -> bool {
        matches!(self, Site::Delivery { .. })
    }

    pub fn is_pickup(&self) -> bool {
        matches!(self, Site::Pickup { .. })
    }

    pub fn fake_depot_vehicle(&self) -> Option<usize> {
        match self {
            Site::FakeDepot { vehicle, .. } => Some(*vehicle),
            _ => None,
        }
    }

    pub fn service_secs(&self) -> i64 {
        self.job().map(|job| job.service_secs).unwrap_or(0)
    }

    pub fn capacity_delta(&self) -> i64 {
        self.job().map(|job| job.capacity_delta).unwrap_or(0)
    }
}

pub fn delivery_unique_id(order_id: &str) -> String {
    format!("delivery{sep}{}", order_id, sep = ID_SEPARATOR)
}

pub fn pickup_unique_id(pickup_id: &str, order_id: &str) -> String {
    format!("pickup{sep}{}{sep}{}", pickup_id, order_id, sep = ID_SEPARATOR)
}

pub fn depot_unique_id(depot_id: &str) -> String {
    format!("depot{sep}{}", depot_id, sep = ID_SEPARATOR)
}
