//! Dispatch records around the Las Vegas depot.

use fleet_map::dto::{AddressRecord, OrderRecord, RouteStep, RouteStepsResponse, StepKind};
use fleet_map::geo::Coordinate;

/// A named location with coordinates.
#[derive(Debug, Clone, Copy)]
pub struct Location {
    pub name: &'static str,
    pub lat: f64,
    pub lng: f64,
}

impl Location {
    pub const fn new(name: &'static str, lat: f64, lng: f64) -> Self {
        Self { name, lat, lng }
    }

    pub fn coordinate(&self) -> Coordinate {
        Coordinate::from_lat_lng(self.lat, self.lng)
    }

    pub fn address(&self) -> AddressRecord {
        AddressRecord {
            id: None,
            name: Some(self.name.to_string()),
            latitude: self.lat,
            longitude: self.lng,
        }
    }
}

pub const DEPOT: Location = Location::new("Longhorn Casino", 36.1070664, -115.0591256);

pub const STOPS: &[Location] = &[
    Location::new("Hard Rock Cafe", 36.1041592, -115.1722166),
    Location::new("SW Steakhouse", 36.1262145, -115.1669146),
    Location::new("Brooklyn Bowl", 36.1175388, -115.1695094),
    Location::new("Gordon Ramsay BurGR", 36.1107195, -115.1720818),
    Location::new("Spago by Wolfgang Puck", 36.1139368, -115.1741462),
    Location::new("BLT Steakhouse", 36.1135528, -115.1690095),
];

pub fn order(id: &str, from: Location, to: Location) -> OrderRecord {
    OrderRecord {
        id: id.to_string(),
        name: None,
        source: from.address(),
        destination: to.address(),
    }
}

fn step(kind: StepKind, location: Location, job: Option<String>) -> RouteStep {
    RouteStep {
        kind,
        location: [location.lng, location.lat],
        job,
        geometry: None,
    }
}

/// Depot -> stops -> depot, without geometry.
pub fn vehicle_route(vehicle_id: &str, stops: &[Location]) -> RouteStepsResponse {
    let mut steps = vec![step(StepKind::Start, DEPOT, None)];
    for (index, stop) in stops.iter().enumerate() {
        steps.push(step(
            StepKind::Job,
            *stop,
            Some(format!("{}-job-{}", vehicle_id, index)),
        ));
    }
    steps.push(step(StepKind::End, DEPOT, None));

    RouteStepsResponse {
        vehicle_id: vehicle_id.to_string(),
        geometry: None,
        steps,
    }
}
