//! Routable Las Vegas / Henderson places (coordinates from OpenStreetMap).
//!
//! Casinos double as depots; restaurants are delivery addresses.

use dispatch_planner::{DepotRecord, JobRecord};

#[derive(Debug, Clone, Copy)]
pub struct Place {
    pub name: &'static str,
    pub lat: f64,
    pub lng: f64,
}

impl Place {
    pub const fn new(name: &'static str, lat: f64, lng: f64) -> Self {
        Self { name, lat, lng }
    }

    pub fn coords(&self) -> (f64, f64) {
        (self.lat, self.lng)
    }
}

pub const DEPOTS: &[Place] = &[
    Place::new("wynn", 36.1263781, -115.1658180),
    Place::new("mgm-grand", 36.1023654, -115.1688720),
    Place::new("longhorn", 36.1070664, -115.0591256),
];

/// Restaurants along the Strip.
pub const STRIP: &[Place] = &[
    Place::new("hard-rock-cafe", 36.1041592, -115.1722166),
    Place::new("sw-steakhouse", 36.1262145, -115.1669146),
    Place::new("public-house", 36.1219193, -115.1689317),
    Place::new("brooklyn-bowl", 36.1175388, -115.1695094),
    Place::new("gordon-ramsay-burgr", 36.1107195, -115.1720818),
    Place::new("spago", 36.1139368, -115.1741462),
    Place::new("hash-house", 36.1181377, -115.1710989),
    Place::new("otto-pizzeria", 36.1231219, -115.1684514),
    Place::new("raos", 36.1163982, -115.1763053),
    Place::new("il-fornaio", 36.1024474, -115.1740110),
    Place::new("charlie-palmer", 36.0910624, -115.1743364),
    Place::new("grand-lux-cafe", 36.1216416, -115.1685024),
];

/// Restaurants east of the Strip, towards Boulder Highway.
pub const EAST_SIDE: &[Place] = &[
    Place::new("golden-china", 36.1171166, -115.0904647),
    Place::new("lindo-michoacan", 36.1294005, -115.1135106),
    Place::new("tomo-sushi", 36.0992464, -115.1142123),
    Place::new("sushi-twister", 36.1007300, -115.0526259),
    Place::new("chuck-wagon", 36.1072491, -115.0593482),
    Place::new("dennys-boulder", 36.1061288, -115.0578247),
    Place::new("viva-el-salvador", 36.1013492, -115.0646473),
    Place::new("roma-pizza", 36.1012461, -115.0753039),
];

pub fn depots() -> Vec<DepotRecord> {
    DEPOTS
        .iter()
        .map(|place| DepotRecord {
            id: place.name.to_string(),
            location: place.coords(),
        })
        .collect()
}

/// One order per place, ids taken from the place names.
pub fn orders(places: &[Place]) -> Vec<JobRecord> {
    places
        .iter()
        .map(|place| JobRecord::new(place.name, place.coords()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_places_are_in_the_valley() {
        for place in DEPOTS.iter().chain(STRIP).chain(EAST_SIDE) {
            assert!(place.lat > 35.9 && place.lat < 36.3, "{} lat out of range", place.name);
            assert!(place.lng > -115.4 && place.lng < -114.8, "{} lng out of range", place.name);
        }
    }
}
