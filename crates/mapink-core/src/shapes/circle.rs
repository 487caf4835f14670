//! Circle shape: a single logical center with a scalar radius.

use crate::map::MapView;
use crate::projection::{self, LatLng, LatLngBounds};
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// A circle centered on a logical coordinate.
///
/// The radius is a scalar in meters and is not rewritten by transform
/// commits; only the center reprojects. Scaling a circle therefore moves
/// its center with the gesture but keeps its ground radius.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub center: LatLng,
    pub radius: f64,
}

impl Circle {
    pub fn new(center: LatLng, radius: f64) -> Self {
        Self { center, radius }
    }

    /// Approximate logical bounds from the ground radius.
    pub fn bounds(&self) -> LatLngBounds {
        let d = std::f64::consts::PI / 180.0;
        let lat_delta = self.radius / (projection::EARTH_RADIUS * d);
        let lng_delta = lat_delta / (self.center.lat * d).cos().max(f64::EPSILON);
        let mut bounds = LatLngBounds::of(LatLng::new(
            self.center.lat - lat_delta,
            self.center.lng - lng_delta,
        ));
        bounds.extend(LatLng::new(
            self.center.lat + lat_delta,
            self.center.lng + lng_delta,
        ));
        bounds
    }

    /// Whether a layer point falls inside the circle (plus tolerance) at
    /// the map's current zoom.
    pub fn hit_test(&self, point: Point, map: &MapView, tolerance: f64) -> bool {
        let center = map.latlng_to_layer_point(self.center);
        let radius_px = self.radius / projection::meters_per_pixel(self.center.lat, map.zoom());
        center.distance(point) <= radius_px + tolerance
    }
}
