//! Authoritative snapshot of what the map should display.
//!
//! [`MapStore`] is owned by the session and handed by reference to the
//! renderer. Every write bumps a per-field revision, which is how renderers
//! find out what changed since their last sync.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::config::MapConfig;
use crate::geo::Coordinate;

/// Free-form marker subtitle: an address line or a number such as a stop index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Description {
    Text(String),
    Number(f64),
}

impl From<&str> for Description {
    fn from(value: &str) -> Self {
        Description::Text(value.to_string())
    }
}

impl From<String> for Description {
    fn from(value: String) -> Self {
        Description::Text(value)
    }
}

impl From<f64> for Description {
    fn from(value: f64) -> Self {
        Description::Number(value)
    }
}

impl From<usize> for Description {
    fn from(value: usize) -> Self {
        Description::Number(value as f64)
    }
}

/// A single marker: order pickup/drop-off, route step or depot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapPoint {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub description: Description,
    pub color: String,
    pub coords: Coordinate,
}

impl MapPoint {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<Description>,
        color: impl Into<String>,
        coords: Coordinate,
    ) -> Self {
        Self {
            id: None,
            name: name.into(),
            description: description.into(),
            color: color.into(),
            coords,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

/// One polyline to draw. `id` is a replace key for the renderer, not a unique key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapRoute {
    pub id: String,
    pub coordinates: Vec<Coordinate>,
    pub color: String,
}

/// Camera target. A focus without `id` means "return to the previous view".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Focus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub center: Option<Coordinate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zoom: Option<f64>,
}

impl Focus {
    pub fn on(id: impl Into<String>, center: Coordinate) -> Self {
        Self {
            id: Some(id.into()),
            center: Some(center),
            zoom: None,
        }
    }

    pub fn with_zoom(mut self, zoom: f64) -> Self {
        self.zoom = Some(zoom);
        self
    }

    /// The empty focus.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.id.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapDisplayState {
    pub points: Vec<MapPoint>,
    pub routes: Vec<MapRoute>,
    pub focus: Focus,
}

impl MapDisplayState {
    /// Empty lists, camera resting on the configured city center.
    pub fn new(config: &MapConfig) -> Self {
        Self {
            points: Vec::new(),
            routes: Vec::new(),
            focus: Focus {
                id: None,
                center: Some(config.default_center),
                zoom: Some(config.default_zoom),
            },
        }
    }
}

/// Write counters per field of [`MapDisplayState`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Revisions {
    pub points: u64,
    pub routes: u64,
    pub focus: u64,
}

#[derive(Debug, Clone)]
pub struct MapStore {
    state: MapDisplayState,
    revisions: Revisions,
}

impl MapStore {
    pub fn new(config: &MapConfig) -> Self {
        Self {
            state: MapDisplayState::new(config),
            revisions: Revisions::default(),
        }
    }

    pub fn state(&self) -> &MapDisplayState {
        &self.state
    }

    pub fn snapshot(&self) -> MapDisplayState {
        self.state.clone()
    }

    pub fn points(&self) -> &[MapPoint] {
        &self.state.points
    }

    pub fn routes(&self) -> &[MapRoute] {
        &self.state.routes
    }

    pub fn focus(&self) -> &Focus {
        &self.state.focus
    }

    pub fn revisions(&self) -> Revisions {
        self.revisions
    }

    pub fn set_points(&mut self, points: Vec<MapPoint>) {
        debug!(count = points.len(), "replacing map points");
        self.state.points = points;
        self.revisions.points += 1;
    }

    /// Appends without deduplicating by id or position.
    pub fn add_point(&mut self, point: MapPoint) {
        trace!(name = %point.name, total = self.state.points.len() + 1, "adding map point");
        self.state.points.push(point);
        self.revisions.points += 1;
    }

    pub fn set_routes(&mut self, routes: Vec<MapRoute>) {
        debug!(count = routes.len(), "replacing map routes");
        self.state.routes = routes;
        self.revisions.routes += 1;
    }

    /// Empties points and routes. Focus is left alone.
    pub fn clear_map(&mut self) {
        debug!(
            points = self.state.points.len(),
            routes = self.state.routes.len(),
            "clearing map"
        );
        self.state.points.clear();
        self.state.routes.clear();
        self.revisions.points += 1;
        self.revisions.routes += 1;
    }

    pub fn set_focus(&mut self, focus: Focus) {
        debug!(id = ?focus.id, "setting map focus");
        self.state.focus = focus;
        self.revisions.focus += 1;
    }
}
