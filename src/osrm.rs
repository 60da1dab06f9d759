//! OSRM HTTP adapter for route geometries.

use std::env;
use std::fmt;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::geo::Coordinate;
use crate::polyline::{EncodedGeometry, Precision};
use crate::traits::RouteGeometryProvider;

#[derive(Debug, Clone)]
pub struct OsrmConfig {
    pub base_url: String,
    pub profile: String,
    pub timeout_secs: u64,
    /// Requested as `geometries=polyline` (Five) or `polyline6` (Six).
    pub geometry_precision: Precision,
}

impl Default for OsrmConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            profile: "car".to_string(),
            timeout_secs: 10,
            geometry_precision: Precision::Five,
        }
    }
}

impl OsrmConfig {
    /// Defaults overridden by `OSRM_BASE_URL` and `OSRM_PROFILE`.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(base_url) = env::var("OSRM_BASE_URL") {
            config.base_url = base_url.trim_end_matches('/').to_string();
        }
        if let Ok(profile) = env::var("OSRM_PROFILE") {
            config.profile = profile;
        }
        config
    }
}

#[derive(Debug)]
pub enum OsrmError {
    Http(reqwest::Error),
    /// OSRM answered without a usable route; carries its `code` and `message`.
    NoRoute(String),
    TooFewWaypoints(usize),
}

impl From<reqwest::Error> for OsrmError {
    fn from(err: reqwest::Error) -> Self {
        OsrmError::Http(err)
    }
}

impl fmt::Display for OsrmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OsrmError::Http(err) => write!(f, "OSRM request failed: {}", err),
            OsrmError::NoRoute(reason) => write!(f, "OSRM returned no route: {}", reason),
            OsrmError::TooFewWaypoints(count) => {
                write!(f, "a route needs at least 2 waypoints, got {}", count)
            }
        }
    }
}

impl std::error::Error for OsrmError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            OsrmError::Http(err) => Some(err),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OsrmClient {
    config: OsrmConfig,
    client: reqwest::blocking::Client,
}

impl OsrmClient {
    pub fn new(config: OsrmConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    fn route_url(&self, waypoints: &[Coordinate]) -> String {
        let coords = waypoints
            .iter()
            .map(|point| format!("{:.6},{:.6}", point.longitude, point.latitude))
            .collect::<Vec<_>>()
            .join(";");
        let geometries = match self.config.geometry_precision {
            Precision::Five => "polyline",
            Precision::Six => "polyline6",
        };

        format!(
            "{}/route/v1/{}/{}?overview=full&geometries={}",
            self.config.base_url, self.config.profile, coords, geometries
        )
    }
}

impl RouteGeometryProvider for OsrmClient {
    type Error = OsrmError;

    fn route_geometry(&self, waypoints: &[Coordinate]) -> Result<EncodedGeometry, OsrmError> {
        if waypoints.len() < 2 {
            return Err(OsrmError::TooFewWaypoints(waypoints.len()));
        }

        let url = self.route_url(waypoints);
        debug!(%url, waypoints = waypoints.len(), "requesting OSRM route");

        let response = self.client.get(url).send()?;
        // OSRM reports routing failures as 4xx with a JSON body; keep its code.
        let status_error = response.error_for_status_ref().err();
        let body = match response.json::<OsrmRouteResponse>() {
            Ok(body) => body,
            Err(err) => return Err(OsrmError::Http(status_error.unwrap_or(err))),
        };

        if body.code != "Ok" {
            let reason = format!("{}: {}", body.code, body.message.unwrap_or_default());
            warn!(%reason, "OSRM route request rejected");
            return Err(OsrmError::NoRoute(reason));
        }
        if let Some(err) = status_error {
            return Err(OsrmError::Http(err));
        }

        body.routes
            .into_iter()
            .next()
            .map(|route| EncodedGeometry {
                encoded: route.geometry,
                precision: self.config.geometry_precision,
            })
            .ok_or_else(|| OsrmError::NoRoute("empty routes".to_string()))
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
    geometry: String,
}
