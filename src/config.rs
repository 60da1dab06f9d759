//! Map configuration.

use std::env;
use std::fmt;

use crate::geo::Coordinate;

/// Las Vegas city center, the deployment's default camera target.
const DEFAULT_CENTER: Coordinate = Coordinate::from_lat_lng(36.1699, -115.1398);

/// Pixel size of the area the camera fits bounds into.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    /// Padding kept free on every side when fitting bounds.
    pub padding: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 720.0,
            padding: 40.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapConfig {
    pub default_center: Coordinate,
    pub default_zoom: f64,
    /// Zoom used when a focus request omits one.
    pub focus_zoom: f64,
    /// Upper zoom limit when fitting bounds, so a single point is not fitted at street level.
    pub max_fit_zoom: f64,
    pub viewport: Viewport,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            default_center: DEFAULT_CENTER,
            default_zoom: 11.0,
            focus_zoom: 15.0,
            max_fit_zoom: 16.0,
            viewport: Viewport::default(),
        }
    }
}

impl MapConfig {
    /// Defaults overridden by `FLEET_MAP_CENTER` ("lat,lng"), `FLEET_MAP_ZOOM`
    /// and `FLEET_MAP_FOCUS_ZOOM`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(raw) = env::var("FLEET_MAP_CENTER") {
            config.default_center = parse_lat_lng("FLEET_MAP_CENTER", &raw)?;
        }
        if let Ok(raw) = env::var("FLEET_MAP_ZOOM") {
            config.default_zoom = parse_number("FLEET_MAP_ZOOM", &raw)?;
        }
        if let Ok(raw) = env::var("FLEET_MAP_FOCUS_ZOOM") {
            config.focus_zoom = parse_number("FLEET_MAP_FOCUS_ZOOM", &raw)?;
        }

        Ok(config)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    pub key: &'static str,
    pub value: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid value {:?} for {}", self.value, self.key)
    }
}

impl std::error::Error for ConfigError {}

pub(crate) fn parse_number(key: &'static str, raw: &str) -> Result<f64, ConfigError> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| ConfigError {
            key,
            value: raw.to_string(),
        })
}

pub(crate) fn parse_lat_lng(key: &'static str, raw: &str) -> Result<Coordinate, ConfigError> {
    let whole = || ConfigError {
        key,
        value: raw.to_string(),
    };
    let (lat, lng) = raw.split_once(',').ok_or_else(whole)?;
    let coordinate = Coordinate::from_lat_lng(
        parse_number(key, lat).map_err(|_| whole())?,
        parse_number(key, lng).map_err(|_| whole())?,
    );
    if coordinate.in_range() {
        Ok(coordinate)
    } else {
        Err(whole())
    }
}
