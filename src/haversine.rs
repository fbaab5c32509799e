//! Haversine directions provider (fallback when OSRM is unavailable).
//!
//! Uses great-circle distance to estimate travel time.
//! Less accurate than OSRM (ignores roads) but always available.

use crate::error::Result;
use crate::traits::{DirectionsProvider, Leg};

/// Average driving speed assumption for time estimation.
const DEFAULT_SPEED_KMH: f64 = 40.0;

/// Earth radius in kilometers.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine-based directions provider.
///
/// Estimates legs using straight-line distance and an assumed speed.
#[derive(Debug, Clone)]
pub struct HaversineMatrix {
    /// Assumed average driving speed in km/h.
    pub speed_kmh: f64,
}

impl Default for HaversineMatrix {
    fn default() -> Self {
        Self {
            speed_kmh: DEFAULT_SPEED_KMH,
        }
    }
}

impl HaversineMatrix {
    pub fn new(speed_kmh: f64) -> Self {
        Self { speed_kmh }
    }

    /// Calculate haversine distance between two points in kilometers.
    fn haversine_km(from: (f64, f64), to: (f64, f64)) -> f64 {
        let (lat1, lng1) = from;
        let (lat2, lng2) = to;

        let lat1_rad = lat1.to_radians();
        let lat2_rad = lat2.to_radians();
        let delta_lat = (lat2 - lat1).to_radians();
        let delta_lng = (lng2 - lng1).to_radians();

        let a = (delta_lat / 2.0).sin().powi(2)
            + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().asin();

        EARTH_RADIUS_KM * c
    }

    /// Convert distance in km to travel time in seconds.
    fn km_to_seconds(&self, km: f64) -> i64 {
        let hours = km / self.speed_kmh;
        (hours * 3600.0).round() as i64
    }

    fn leg(&self, from: (f64, f64), to: (f64, f64)) -> Leg {
        let km = Self::haversine_km(from, to);
        Leg {
            distance: (km * 1000.0).round() as i64,
            duration: self.km_to_seconds(km),
        }
    }
}

impl DirectionsProvider for HaversineMatrix {
    fn directions(&self, waypoints: &[(f64, f64)]) -> Result<Vec<Option<Leg>>> {
        Ok(waypoints
            .windows(2)
            .map(|pair| Some(self.leg(pair[0], pair[1])))
            .collect())
    }

    fn max_waypoints(&self) -> usize {
        usize::MAX
    }

    fn is_symmetric(&self) -> bool {
        true
    }
}
