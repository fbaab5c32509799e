//! OSRM HTTP adapter for multi-waypoint directions.

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::traits::{DirectionsProvider, Leg};

#[derive(Debug, Clone)]
pub struct OsrmConfig {
    pub base_url: String,
    pub profile: String,
    pub timeout_secs: u64,
    /// Waypoints per `/route` request.
    pub max_waypoints: usize,
}

impl Default for OsrmConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            profile: "car".to_string(),
            timeout_secs: 10,
            max_waypoints: 100,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OsrmClient {
    config: OsrmConfig,
    client: reqwest::blocking::Client,
}

impl OsrmClient {
    pub fn new(config: OsrmConfig) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    fn route_url(&self, waypoints: &[(f64, f64)]) -> String {
        let coords = waypoints
            .iter()
            .map(|(lat, lng)| format!("{:.6},{:.6}", lng, lat))
            .collect::<Vec<_>>()
            .join(";");

        format!(
            "{}/route/v1/{}/{}?overview=false&steps=false",
            self.config.base_url, self.config.profile, coords
        )
    }
}

impl DirectionsProvider for OsrmClient {
    fn directions(&self, waypoints: &[(f64, f64)]) -> Result<Vec<Option<Leg>>> {
        if waypoints.len() < 2 {
            return Ok(Vec::new());
        }

        let body = self
            .client
            .get(self.route_url(waypoints))
            .send()?
            .json::<OsrmRouteResponse>()?;

        legs_from_response(body, waypoints.len() - 1)
    }

    fn max_waypoints(&self) -> usize {
        self.config.max_waypoints
    }
}

fn legs_from_response(body: OsrmRouteResponse, expected: usize) -> Result<Vec<Option<Leg>>> {
    match body.code.as_str() {
        "Ok" => {
            let legs = body
                .routes
                .into_iter()
                .next()
                .map(|route| route.legs)
                .unwrap_or_default();
            if legs.len() != expected {
                return Err(Error::Directions(format!(
                    "expected {} legs, OSRM returned {}",
                    expected,
                    legs.len()
                )));
            }
            Ok(legs
                .into_iter()
                .map(|leg| {
                    Some(Leg {
                        distance: leg.distance.round() as i64,
                        duration: leg.duration.round() as i64,
                    })
                })
                .collect())
        }
        // A snapped waypoint without a road connection; the legs stay unknown.
        "NoRoute" | "NoSegment" => Ok(vec![None; expected]),
        other => Err(Error::Directions(format!(
            "OSRM answered {}: {}",
            other,
            body.message.unwrap_or_default()
        ))),
    }
}

#[derive(Debug, Deserialize)]
struct OsrmRouteResponse {
    code: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    legs: Vec<OsrmLeg>,
}

#[derive(Debug, Deserialize)]
struct OsrmLeg {
    distance: f64,
    duration: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_url_uses_lng_lat_order() {
        let client = OsrmClient::new(OsrmConfig::default()).unwrap();
        let url = client.route_url(&[(36.1, -115.2), (36.3, -115.4)]);
        assert_eq!(
            url,
            "http://localhost:5000/route/v1/car/-115.200000,36.100000;-115.400000,36.300000?overview=false&steps=false"
        );
    }

    #[test]
    fn test_legs_are_rounded() {
        let body: OsrmRouteResponse = serde_json::from_str(
            r#"{"code":"Ok","routes":[{"legs":[{"distance":10.6,"duration":3.2},{"distance":0,"duration":0}]}]}"#,
        )
        .unwrap();
        let legs = legs_from_response(body, 2).unwrap();
        assert_eq!(legs[0], Some(Leg { distance: 11, duration: 3 }));
        assert_eq!(legs[1], Some(Leg::default()));
    }

    #[test]
    fn test_no_route_marks_legs_unknown() {
        let body: OsrmRouteResponse = serde_json::from_str(r#"{"code":"NoRoute"}"#).unwrap();
        assert_eq!(legs_from_response(body, 3).unwrap(), vec![None, None, None]);
    }

    #[test]
    fn test_error_code_is_reported() {
        let body: OsrmRouteResponse =
            serde_json::from_str(r#"{"code":"InvalidQuery","message":"bad coords"}"#).unwrap();
        assert!(matches!(legs_from_response(body, 1), Err(Error::Directions(_))));
    }
}
