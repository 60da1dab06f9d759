//! Geographic primitives shared by the decoder, the map state and the renderer.

use serde::{Deserialize, Serialize};

/// A WGS-84 position in degrees. No altitude.
///
/// Ranges are not enforced here; invalid values travel through to the
/// renderer, which skips them when fitting the camera.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    #[serde(alias = "lng")]
    pub longitude: f64,
    #[serde(alias = "lat")]
    pub latitude: f64,
}

impl Coordinate {
    /// Creates a coordinate in GeoJSON order (longitude first).
    pub const fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            longitude,
            latitude,
        }
    }

    pub const fn from_lat_lng(latitude: f64, longitude: f64) -> Self {
        Self::new(longitude, latitude)
    }

    /// Returns the position as a (latitude, longitude) tuple.
    pub fn lat_lng(&self) -> (f64, f64) {
        (self.latitude, self.longitude)
    }

    pub fn is_finite(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
    }

    pub fn in_range(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// Axis-aligned bounding region in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub south_west: Coordinate,
    pub north_east: Coordinate,
}

impl Bounds {
    pub fn from_point(point: Coordinate) -> Self {
        Self {
            south_west: point,
            north_east: point,
        }
    }

    /// Smallest region covering every finite coordinate, or `None` if there is none.
    pub fn covering<'a, I>(coords: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Coordinate>,
    {
        let mut finite = coords.into_iter().filter(|c| c.is_finite());
        let mut bounds = Self::from_point(*finite.next()?);
        for coord in finite {
            bounds.extend(*coord);
        }
        Some(bounds)
    }

    pub fn extend(&mut self, point: Coordinate) {
        self.south_west.latitude = self.south_west.latitude.min(point.latitude);
        self.south_west.longitude = self.south_west.longitude.min(point.longitude);
        self.north_east.latitude = self.north_east.latitude.max(point.latitude);
        self.north_east.longitude = self.north_east.longitude.max(point.longitude);
    }

    pub fn center(&self) -> Coordinate {
        Coordinate::new(
            (self.south_west.longitude + self.north_east.longitude) / 2.0,
            (self.south_west.latitude + self.north_east.latitude) / 2.0,
        )
    }

    pub fn longitude_span(&self) -> f64 {
        self.north_east.longitude - self.south_west.longitude
    }
}
