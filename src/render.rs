//! Headless rendering collaborator.
//!
//! [`MapView`] keeps the renderer-side bookkeeping (which route layers exist,
//! where the camera is) and turns store changes into [`RenderCommand`]s that
//! a concrete map widget can replay.

use std::collections::BTreeSet;

use tracing::{debug, trace};

use crate::camera::{fit_bounds, Camera, CameraMove, CameraView};
use crate::config::MapConfig;
use crate::geo::Bounds;
use crate::map_state::{MapPoint, MapRoute, MapStore, Revisions};
use crate::traits::MapRenderer;

#[derive(Debug, Clone, PartialEq)]
pub enum RenderCommand {
    RemoveRoute { id: String },
    /// Add the layer, or replace the source of an existing one with the same id.
    UpsertRoute(MapRoute),
    SetMarkers(Vec<MapPoint>),
    FitBounds { bounds: Bounds, view: CameraView },
    FlyTo(CameraView),
    RestoreView(CameraView),
}

#[derive(Debug, Clone)]
pub struct MapView {
    config: MapConfig,
    camera: Camera,
    layers: BTreeSet<String>,
    seen: Revisions,
}

impl MapView {
    pub fn new(config: &MapConfig) -> Self {
        let view = CameraView {
            center: config.default_center,
            zoom: config.default_zoom,
        };
        Self {
            config: config.clone(),
            camera: Camera::new(view),
            layers: BTreeSet::new(),
            seen: Revisions::default(),
        }
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Ids of the route layers currently drawn.
    pub fn route_layers(&self) -> impl Iterator<Item = &str> {
        self.layers.iter().map(String::as_str)
    }

    pub fn animation_finished(&mut self) {
        self.camera.finish_animation();
    }

    fn reconcile_routes(&mut self, routes: &[MapRoute], out: &mut Vec<RenderCommand>) {
        let wanted: BTreeSet<&str> = routes.iter().map(|route| route.id.as_str()).collect();

        let stale: Vec<String> = self
            .layers
            .iter()
            .filter(|id| !wanted.contains(id.as_str()))
            .cloned()
            .collect();
        for id in stale {
            trace!(%id, "removing route layer");
            self.layers.remove(&id);
            out.push(RenderCommand::RemoveRoute { id });
        }

        for route in routes {
            self.layers.insert(route.id.clone());
            out.push(RenderCommand::UpsertRoute(route.clone()));
        }

        if let Some(bounds) = Bounds::covering(routes.iter().flat_map(|route| &route.coordinates)) {
            self.fit(bounds, out);
        }
    }

    fn fit(&mut self, bounds: Bounds, out: &mut Vec<RenderCommand>) {
        let view = fit_bounds(&bounds, &self.config.viewport, self.config.max_fit_zoom);
        debug!(zoom = view.zoom, "fitting camera to bounds");
        self.camera.fit(view);
        out.push(RenderCommand::FitBounds { bounds, view });
    }
}

impl MapRenderer for MapView {
    fn sync(&mut self, store: &MapStore) -> Vec<RenderCommand> {
        let revisions = store.revisions();
        let mut out = Vec::new();

        if revisions.routes != self.seen.routes {
            self.reconcile_routes(store.routes(), &mut out);
        }

        if revisions.points != self.seen.points {
            out.push(RenderCommand::SetMarkers(store.points().to_vec()));
            if store.routes().is_empty() {
                let coords = store.points().iter().map(|point| &point.coords);
                if let Some(bounds) = Bounds::covering(coords) {
                    self.fit(bounds, &mut out);
                }
            }
        }

        if revisions.focus != self.seen.focus {
            match self.camera.apply_focus(store.focus(), self.config.focus_zoom) {
                Some(CameraMove::FlyTo(view)) => out.push(RenderCommand::FlyTo(view)),
                Some(CameraMove::Restore(view)) => out.push(RenderCommand::RestoreView(view)),
                None => {}
            }
        }

        self.seen = revisions;
        out
    }
}
