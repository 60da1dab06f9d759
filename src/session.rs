//! Per-session display orchestration.
//!
//! A [`MapSession`] is created for each open console. It turns validated
//! backend records into map points, routes and focus changes.

use std::error::Error;
use std::fmt;

use rayon::prelude::*;
use tracing::{debug, info};

use crate::colors::vehicle_colors;
use crate::config::MapConfig;
use crate::dto::{DtoError, OrderRecord, RouteStep, RouteStepsResponse, StepKind};
use crate::geo::Coordinate;
use crate::map_state::{Focus, MapPoint, MapRoute, MapStore};
use crate::polyline::{decode, decode_with, DecodeError, PrecisionMode};
use crate::traits::RouteGeometryProvider;

pub const PICKUP_COLOR: &str = "#16a34a";
pub const DROPOFF_COLOR: &str = "#dc2626";

#[derive(Debug)]
pub enum SessionError {
    Invalid(DtoError),
    Decode { route_id: String, source: DecodeError },
    Provider(Box<dyn Error + Send + Sync>),
}

impl From<DtoError> for SessionError {
    fn from(err: DtoError) -> Self {
        SessionError::Invalid(err)
    }
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::Invalid(err) => write!(f, "invalid record: {}", err),
            SessionError::Decode { route_id, source } => {
                write!(f, "route {} has a malformed geometry: {}", route_id, source)
            }
            SessionError::Provider(err) => write!(f, "routing engine failed: {}", err),
        }
    }
}

impl Error for SessionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            SessionError::Invalid(err) => Some(err),
            SessionError::Decode { source, .. } => Some(source),
            SessionError::Provider(err) => Some(err.as_ref()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MapSession {
    config: MapConfig,
    store: MapStore,
    precision: PrecisionMode,
}

impl MapSession {
    /// `precision` is used for geometries coming from the optimization backend.
    pub fn new(config: MapConfig, precision: PrecisionMode) -> Self {
        let store = MapStore::new(&config);
        Self {
            config,
            store,
            precision,
        }
    }

    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    pub fn store(&self) -> &MapStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut MapStore {
        &mut self.store
    }

    /// Shows the pickup and drop-off markers of one order.
    pub fn select_order(&mut self, order: &OrderRecord) -> Result<(), SessionError> {
        order.validate()?;
        let pickup = MapPoint::new(
            "Pickup",
            order.source.name.clone().unwrap_or_else(|| order.label().to_string()),
            PICKUP_COLOR,
            order.source.coordinate(),
        )
        .with_id(format!("{}:source", order.id));
        let dropoff = MapPoint::new(
            "Drop-off",
            order.destination.name.clone().unwrap_or_else(|| order.label().to_string()),
            DROPOFF_COLOR,
            order.destination.coordinate(),
        )
        .with_id(format!("{}:destination", order.id));

        self.store.set_points(vec![pickup, dropoff]);
        Ok(())
    }

    pub fn focus_order(&mut self, order: &OrderRecord) -> Result<(), SessionError> {
        let center = order.source.validate("source")?;
        self.store
            .set_focus(Focus::on(order.id.clone(), center).with_zoom(self.config.focus_zoom));
        Ok(())
    }

    pub fn unfocus(&mut self) {
        self.store.set_focus(Focus::none());
    }

    /// Replaces the drawn route with one vehicle's and appends its step markers.
    ///
    /// Markers are appended, so showing routes repeatedly without [`clear`](Self::clear)
    /// stacks markers on top of each other.
    pub fn show_vehicle_route(
        &mut self,
        index: usize,
        route: &RouteStepsResponse,
    ) -> Result<(), SessionError> {
        let (map_route, points) = build_vehicle(index, route, self.precision)?;
        self.store.set_routes(vec![map_route]);
        for point in points {
            self.store.add_point(point);
        }
        Ok(())
    }

    /// Shows every vehicle of an optimization plan; vehicle `i` gets palette entry `i`.
    pub fn show_plan(&mut self, routes: &[RouteStepsResponse]) -> Result<(), SessionError> {
        let precision = self.precision;
        let built = routes
            .par_iter()
            .enumerate()
            .map(|(index, route)| build_vehicle(index, route, precision))
            .collect::<Result<Vec<_>, SessionError>>()?;

        let (map_routes, points): (Vec<MapRoute>, Vec<Vec<MapPoint>>) = built.into_iter().unzip();
        info!(vehicles = map_routes.len(), "showing optimization plan");
        self.store.set_routes(map_routes);
        self.store.set_points(points.into_iter().flatten().collect());
        Ok(())
    }

    /// Asks a routing engine for the road path through `waypoints` and draws it.
    pub fn show_directions<P>(
        &mut self,
        provider: &P,
        index: usize,
        id: &str,
        waypoints: &[Coordinate],
    ) -> Result<(), SessionError>
    where
        P: RouteGeometryProvider,
    {
        let geometry = provider
            .route_geometry(waypoints)
            .map_err(|err| SessionError::Provider(Box::new(err)))?;
        let polyline = decode(&geometry.encoded, geometry.precision).map_err(|source| {
            SessionError::Decode {
                route_id: id.to_string(),
                source,
            }
        })?;

        self.store.set_routes(vec![MapRoute {
            id: id.to_string(),
            coordinates: polyline.into_points(),
            color: vehicle_colors(index).primary.to_string(),
        }]);
        Ok(())
    }

    pub fn clear(&mut self) {
        self.store.clear_map();
    }
}

fn build_vehicle(
    index: usize,
    route: &RouteStepsResponse,
    precision: PrecisionMode,
) -> Result<(MapRoute, Vec<MapPoint>), SessionError> {
    route.validate()?;
    let colors = vehicle_colors(index);

    let coordinates = route_coordinates(route, precision).map_err(|source| SessionError::Decode {
        route_id: route.vehicle_id.clone(),
        source,
    })?;
    debug!(vehicle = %route.vehicle_id, points = coordinates.len(), "decoded vehicle route");

    let mut stop = 0;
    let points = route
        .steps
        .iter()
        .enumerate()
        .map(|(position, step)| {
            if step.kind == StepKind::Job {
                stop += 1;
            }
            step_point(step, position, stop, colors.secondary)
        })
        .collect();

    let map_route = MapRoute {
        id: route.vehicle_id.clone(),
        coordinates,
        color: colors.primary.to_string(),
    };
    Ok((map_route, points))
}

/// Route-level geometry, else joined leg geometries, else straight lines between steps.
fn route_coordinates(
    route: &RouteStepsResponse,
    precision: PrecisionMode,
) -> Result<Vec<Coordinate>, DecodeError> {
    if let Some(encoded) = &route.geometry {
        return Ok(decode_with(encoded, precision)?.into_points());
    }

    let mut coordinates: Vec<Coordinate> = Vec::new();
    let mut any_leg = false;
    for encoded in route.steps.iter().filter_map(|step| step.geometry.as_deref()) {
        any_leg = true;
        let leg = decode_with(encoded, precision)?.into_points();
        let skip = match (coordinates.last(), leg.first()) {
            (Some(last), Some(first)) if last == first => 1,
            _ => 0,
        };
        coordinates.extend(leg.into_iter().skip(skip));
    }

    if any_leg {
        Ok(coordinates)
    } else {
        Ok(route.steps.iter().map(RouteStep::coordinate).collect())
    }
}

fn step_point(step: &RouteStep, position: usize, stop: usize, color: &str) -> MapPoint {
    let name = match step.kind {
        StepKind::Start => "Start".to_string(),
        StepKind::End => "End".to_string(),
        StepKind::Job => format!("Stop {}", stop),
        StepKind::Other => "Step".to_string(),
    };
    match &step.job {
        Some(job) => {
            MapPoint::new(name, job.as_str(), color, step.coordinate()).with_id(job.clone())
        }
        None => MapPoint::new(name, position, color, step.coordinate()),
    }
}
