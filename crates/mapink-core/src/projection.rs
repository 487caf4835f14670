//! Coordinate bridge between logical (lat/lng) and projected (pixel) space.
//!
//! The projection is the standard spherical-mercator web map projection
//! (EPSG:3857 with 256px tiles): `project` and `unproject` at the same zoom
//! are exact inverses within floating-point tolerance, which is what lets a
//! gesture commit fold a projected-space matrix back into logical
//! coordinates without drift.

use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Mean earth radius used by the projection, in meters.
pub const EARTH_RADIUS: f64 = 6_378_137.0;

/// Latitude beyond which the mercator projection is clamped.
pub const MAX_LATITUDE: f64 = 85.051_128_779_8;

/// Pixel size of the projected world at zoom 0.
const TILE_SIZE: f64 = 256.0;

/// A zoom-independent logical coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Component-wise midpoint with another coordinate.
    pub fn midpoint(&self, other: &LatLng) -> LatLng {
        LatLng::new((self.lat + other.lat) / 2.0, (self.lng + other.lng) / 2.0)
    }
}

/// Axis-aligned logical bounding box (south-west / north-east corners).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLngBounds {
    pub south_west: LatLng,
    pub north_east: LatLng,
}

impl LatLngBounds {
    /// Bounds containing a single coordinate.
    pub fn of(coord: LatLng) -> Self {
        Self {
            south_west: coord,
            north_east: coord,
        }
    }

    /// Grow the bounds to contain `coord`.
    pub fn extend(&mut self, coord: LatLng) {
        self.south_west.lat = self.south_west.lat.min(coord.lat);
        self.south_west.lng = self.south_west.lng.min(coord.lng);
        self.north_east.lat = self.north_east.lat.max(coord.lat);
        self.north_east.lng = self.north_east.lng.max(coord.lng);
    }

    pub fn center(&self) -> LatLng {
        self.south_west.midpoint(&self.north_east)
    }

    /// Whether the bounds cover no area (a single point or a line).
    pub fn is_degenerate(&self) -> bool {
        self.south_west.lat == self.north_east.lat || self.south_west.lng == self.north_east.lng
    }
}

/// Pixel extent of the projected world at the given zoom.
fn zoom_scale(zoom: f64) -> f64 {
    TILE_SIZE * 2f64.powf(zoom)
}

/// Project a logical coordinate to pixel space at the given zoom.
pub fn project(coord: LatLng, zoom: f64) -> Point {
    let d = PI / 180.0;
    let lat = coord.lat.clamp(-MAX_LATITUDE, MAX_LATITUDE);
    let sin = (lat * d).sin();

    // Raw mercator meters.
    let x = EARTH_RADIUS * coord.lng * d;
    let y = EARTH_RADIUS / 2.0 * ((1.0 + sin) / (1.0 - sin)).ln();

    // Affine transformation into the zoom's pixel extent.
    let s = 0.5 / (PI * EARTH_RADIUS);
    let scale = zoom_scale(zoom);
    Point::new(scale * (s * x + 0.5), scale * (-s * y + 0.5))
}

/// Unproject a pixel-space point back to a logical coordinate.
///
/// Exact inverse of [`project`] at the same zoom (within float tolerance)
/// for latitudes inside the clamp range.
pub fn unproject(point: Point, zoom: f64) -> LatLng {
    let d = PI / 180.0;
    let s = 0.5 / (PI * EARTH_RADIUS);
    let scale = zoom_scale(zoom);

    let x = (point.x / scale - 0.5) / s;
    let y = -(point.y / scale - 0.5) / s;

    let lat = (2.0 * (y / EARTH_RADIUS).exp().atan() - PI / 2.0) / d;
    let lng = x / (EARTH_RADIUS * d);
    LatLng::new(lat, lng)
}

/// Ground resolution at a latitude and zoom, in meters per pixel.
pub fn meters_per_pixel(lat: f64, zoom: f64) -> f64 {
    let d = PI / 180.0;
    (lat * d).cos() * 2.0 * PI * EARTH_RADIUS / zoom_scale(zoom)
}

/// The point past `b` on the ray from `a` through `b`, at signed pixel
/// distance `dist` beyond `b`.
///
/// Used to place the rotation handle a fixed visual distance outside the
/// bounding rectangle's top edge, independent of rectangle size. Returns `b`
/// when the segment is degenerate (zero length).
pub fn point_on_line(a: Point, b: Point, dist: f64) -> Point {
    let len = a.distance(b);
    if len < f64::EPSILON {
        return b;
    }
    let ratio = 1.0 + dist / len;
    Point::new(a.x + (b.x - a.x) * ratio, a.y + (b.y - a.y) * ratio)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip() {
        let coords = [
            LatLng::new(0.0, 0.0),
            LatLng::new(45.5, -122.6),
            LatLng::new(-33.86, 151.2),
            LatLng::new(80.0, 179.9),
        ];
        for zoom in [0.0, 3.0, 10.5, 18.0, 22.0] {
            for &c in &coords {
                let back = unproject(project(c, zoom), zoom);
                assert!(
                    (back.lat - c.lat).abs() < 1e-9 && (back.lng - c.lng).abs() < 1e-9,
                    "roundtrip failed at zoom {zoom}: {c:?} -> {back:?}"
                );
            }
        }
    }

    #[test]
    fn test_zoom_doubles_coordinates() {
        let c = LatLng::new(12.0, 34.0);
        let p1 = project(c, 5.0);
        let p2 = project(c, 6.0);
        assert!((p2.x - 2.0 * p1.x).abs() < 1e-6);
        assert!((p2.y - 2.0 * p1.y).abs() < 1e-6);
    }

    #[test]
    fn test_origin_is_world_center() {
        let p = project(LatLng::new(0.0, 0.0), 0.0);
        assert!((p.x - 128.0).abs() < 1e-9);
        assert!((p.y - 128.0).abs() < 1e-9);
    }

    #[test]
    fn test_north_is_up() {
        // Projected y grows downward: a more northern latitude has smaller y.
        let north = project(LatLng::new(10.0, 0.0), 4.0);
        let south = project(LatLng::new(-10.0, 0.0), 4.0);
        assert!(north.y < south.y);
    }

    #[test]
    fn test_point_on_line_extends_past_end() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(10.0, 0.0);
        let p = point_on_line(a, b, 5.0);
        assert!((p.x - 15.0).abs() < 1e-9);
        assert!(p.y.abs() < 1e-9);
    }

    #[test]
    fn test_point_on_line_negative_distance() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(0.0, 10.0);
        let p = point_on_line(a, b, -4.0);
        assert!((p.y - 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_point_on_line_degenerate() {
        let a = Point::new(3.0, 3.0);
        let p = point_on_line(a, a, 20.0);
        assert_eq!(p, a);
    }

    #[test]
    fn test_bounds_extend() {
        let mut bounds = LatLngBounds::of(LatLng::new(0.0, 0.0));
        bounds.extend(LatLng::new(10.0, -5.0));
        bounds.extend(LatLng::new(-2.0, 8.0));
        assert_eq!(bounds.south_west, LatLng::new(-2.0, -5.0));
        assert_eq!(bounds.north_east, LatLng::new(10.0, 8.0));
        assert!(!bounds.is_degenerate());
        assert!(LatLngBounds::of(LatLng::new(1.0, 1.0)).is_degenerate());
    }
}
