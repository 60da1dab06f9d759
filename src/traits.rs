//! Seams between the map core and its collaborators.
//!
//! Routing engines produce geometries; renderers consume the store.

use crate::geo::Coordinate;
use crate::map_state::MapStore;
use crate::polyline::EncodedGeometry;
use crate::render::RenderCommand;

/// A routing engine that can draw a road path through waypoints.
pub trait RouteGeometryProvider {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Encoded geometry through `waypoints`, in order.
    fn route_geometry(&self, waypoints: &[Coordinate]) -> Result<EncodedGeometry, Self::Error>;
}

/// Something that draws the map from a [`MapStore`].
pub trait MapRenderer {
    /// Reconciles with whatever changed in `store` since the previous call.
    fn sync(&mut self, store: &MapStore) -> Vec<RenderCommand>;
}
