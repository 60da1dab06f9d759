//! Camera focus state machine.
//!
//! Focusing saves the view the user was looking at once; unfocusing animates
//! back to it and forgets it, so the next focus saves afresh.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::config::Viewport;
use crate::geo::{Bounds, Coordinate};
use crate::map_state::Focus;

/// Web-Mercator tile edge in pixels.
const TILE_SIZE: f64 = 512.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraView {
    pub center: Coordinate,
    pub zoom: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CameraPhase {
    Idle,
    Focused { target: String, saved: CameraView },
    Returning { saved: CameraView },
}

/// Animation the renderer should play after a focus change.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CameraMove {
    FlyTo(CameraView),
    Restore(CameraView),
}

#[derive(Debug, Clone)]
pub struct Camera {
    view: CameraView,
    phase: CameraPhase,
}

impl Camera {
    pub fn new(view: CameraView) -> Self {
        Self {
            view,
            phase: CameraPhase::Idle,
        }
    }

    pub fn view(&self) -> CameraView {
        self.view
    }

    pub fn phase(&self) -> &CameraPhase {
        &self.phase
    }

    /// Drives the state machine with a new focus target.
    ///
    /// `focus_zoom` applies when an active focus carries no zoom.
    pub fn apply_focus(&mut self, focus: &Focus, focus_zoom: f64) -> Option<CameraMove> {
        match &focus.id {
            Some(target) => {
                let saved = match &self.phase {
                    CameraPhase::Focused { saved, .. } => *saved,
                    CameraPhase::Idle | CameraPhase::Returning { .. } => self.view,
                };
                let view = CameraView {
                    center: focus.center.unwrap_or(self.view.center),
                    zoom: focus.zoom.unwrap_or(focus_zoom),
                };
                self.view = view;
                self.phase = CameraPhase::Focused {
                    target: target.clone(),
                    saved,
                };
                Some(CameraMove::FlyTo(view))
            }
            None => match self.phase {
                CameraPhase::Focused { saved, .. } => {
                    self.view = saved;
                    self.phase = CameraPhase::Returning { saved };
                    Some(CameraMove::Restore(saved))
                }
                CameraPhase::Idle | CameraPhase::Returning { .. } => None,
            },
        }
    }

    /// Called by the renderer once the return animation has played.
    pub fn finish_animation(&mut self) {
        if let CameraPhase::Returning { .. } = self.phase {
            self.phase = CameraPhase::Idle;
        }
    }

    /// Moves the camera without touching the focus phase.
    pub fn fit(&mut self, view: CameraView) {
        self.view = view;
    }
}

/// View that shows `bounds` inside `viewport`, zoom capped at `max_zoom`.
pub fn fit_bounds(bounds: &Bounds, viewport: &Viewport, max_zoom: f64) -> CameraView {
    let width = (viewport.width - 2.0 * viewport.padding).max(1.0);
    let height = (viewport.height - 2.0 * viewport.padding).max(1.0);

    let lng_span = bounds.longitude_span().abs();
    let lat_span =
        (mercator_y(bounds.north_east.latitude) - mercator_y(bounds.south_west.latitude)).abs();

    let zoom_x = if lng_span > 0.0 {
        (width * 360.0 / (lng_span * TILE_SIZE)).log2()
    } else {
        f64::INFINITY
    };
    let zoom_y = if lat_span > 0.0 {
        (height * 2.0 * PI / (lat_span * TILE_SIZE)).log2()
    } else {
        f64::INFINITY
    };

    CameraView {
        center: bounds.center(),
        zoom: zoom_x.min(zoom_y).min(max_zoom).max(0.0),
    }
}

fn mercator_y(latitude: f64) -> f64 {
    let clamped = latitude.clamp(-85.051_128, 85.051_128);
    (PI / 4.0 + clamped.to_radians() / 2.0).tan().ln()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn city() -> CameraView {
        CameraView {
            center: Coordinate::from_lat_lng(36.1699, -115.1398),
            zoom: 11.0,
        }
    }

    #[test]
    fn test_focus_then_unfocus_restores() {
        let mut camera = Camera::new(city());
        let order = Coordinate::from_lat_lng(36.12, -115.17);

        let fly = camera.apply_focus(&Focus::on("order-a", order).with_zoom(15.0), 15.0);
        assert_eq!(fly, Some(CameraMove::FlyTo(CameraView { center: order, zoom: 15.0 })));

        let back = camera.apply_focus(&Focus::none(), 15.0);
        assert_eq!(back, Some(CameraMove::Restore(city())));
        assert_eq!(camera.view(), city());
        assert_eq!(camera.phase(), &CameraPhase::Returning { saved: city() });

        camera.finish_animation();
        assert_eq!(camera.phase(), &CameraPhase::Idle);
    }

    #[test]
    fn test_repeated_focus_keeps_first_saved_view() {
        let mut camera = Camera::new(city());
        camera.apply_focus(&Focus::on("a", Coordinate::from_lat_lng(36.0, -115.0)), 15.0);
        camera.apply_focus(&Focus::on("b", Coordinate::from_lat_lng(36.5, -115.5)), 15.0);
        assert_eq!(camera.apply_focus(&Focus::none(), 15.0), Some(CameraMove::Restore(city())));
    }

    #[test]
    fn test_unfocus_when_idle_is_noop() {
        let mut camera = Camera::new(city());
        assert_eq!(camera.apply_focus(&Focus::none(), 15.0), None);
        assert_eq!(camera.view(), city());
    }

    #[test]
    fn test_focus_while_returning_saves_fresh_view() {
        let mut camera = Camera::new(city());
        camera.apply_focus(&Focus::on("a", Coordinate::from_lat_lng(36.0, -115.0)), 15.0);
        camera.apply_focus(&Focus::none(), 15.0);
        let fitted = CameraView {
            center: Coordinate::from_lat_lng(36.3, -115.3),
            zoom: 12.0,
        };
        camera.fit(fitted);
        camera.apply_focus(&Focus::on("b", Coordinate::from_lat_lng(36.0, -115.0)), 15.0);
        assert_eq!(camera.apply_focus(&Focus::none(), 15.0), Some(CameraMove::Restore(fitted)));
    }

    #[test]
    fn test_focus_defaults() {
        let mut camera = Camera::new(city());
        let focus = Focus {
            id: Some("no-center".to_string()),
            center: None,
            zoom: None,
        };
        camera.apply_focus(&focus, 14.0);
        assert_eq!(camera.view().center, city().center);
        assert_eq!(camera.view().zoom, 14.0);
    }

    #[test]
    fn test_fit_single_point_uses_max_zoom() {
        let bounds = Bounds::from_point(Coordinate::from_lat_lng(36.1, -115.1));
        let view = fit_bounds(&bounds, &Viewport::default(), 16.0);
        assert_eq!(view.zoom, 16.0);
        assert_eq!(view.center, Coordinate::from_lat_lng(36.1, -115.1));
    }

    #[test]
    fn test_fit_wider_bounds_zooms_out() {
        let mut small = Bounds::from_point(Coordinate::from_lat_lng(36.1, -115.2));
        small.extend(Coordinate::from_lat_lng(36.2, -115.1));
        let mut large = small;
        large.extend(Coordinate::from_lat_lng(37.0, -114.0));

        let viewport = Viewport::default();
        let small_view = fit_bounds(&small, &viewport, 20.0);
        let large_view = fit_bounds(&large, &viewport, 20.0);
        assert!(large_view.zoom < small_view.zoom);
        assert!(small_view.zoom > 8.0 && small_view.zoom < 14.0, "got {}", small_view.zoom);
    }
}
