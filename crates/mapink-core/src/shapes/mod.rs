//! Vector shape variants and their transform capability.
//!
//! Shapes own nothing but logical coordinates. Gestures preview against a
//! transient matrix and, on commit, call [`Shape::transform_projected`] or
//! [`Shape::translate_projected`] exactly once to fold the matrix into the
//! coordinates; no shape ever stores a matrix.

mod circle;
mod path;

pub use circle::Circle;
pub use path::{Polygon, Polyline};

use crate::map::MapView;
use crate::matrix::Matrix;
use crate::projection::{LatLng, LatLngBounds};
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

/// A vector shape in logical coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    /// A single coordinate.
    Point(LatLng),
    /// One or more open line strings.
    Polyline(Polyline),
    /// A closed outline with optional holes.
    Polygon(Polygon),
    /// A circle with a scalar radius in meters.
    Circle(Circle),
}

impl Shape {
    /// Logical bounding box, or `None` for a shape without coordinates.
    pub fn bounds(&self) -> Option<LatLngBounds> {
        match self {
            Shape::Point(coord) => Some(LatLngBounds::of(*coord)),
            Shape::Polyline(line) => line.bounds(),
            Shape::Polygon(poly) => poly.bounds(),
            Shape::Circle(circle) => Some(circle.bounds()),
        }
    }

    /// Visit every logical coordinate, including nested parts and holes.
    pub fn for_each_coord_mut(&mut self, mut f: impl FnMut(&mut LatLng)) {
        match self {
            Shape::Point(coord) => f(coord),
            Shape::Polyline(line) => line.for_each_coord_mut(&mut f),
            Shape::Polygon(poly) => poly.for_each_coord_mut(&mut f),
            Shape::Circle(circle) => f(&mut circle.center),
        }
    }

    /// Total number of logical coordinates.
    pub fn coord_count(&self) -> usize {
        let mut count = 0;
        let mut clone = self.clone();
        clone.for_each_coord_mut(|_| count += 1);
        count
    }

    /// Fold a projected-space matrix into the logical coordinates, exactly
    /// once per vertex, through the commit reference zoom.
    ///
    /// A circle's scalar radius is left untouched; only its center moves.
    pub fn transform_projected(&mut self, matrix: &Matrix, map: &MapView) {
        self.for_each_coord_mut(|coord| *coord = transform_latlng(*coord, matrix, map));
    }

    /// Translate every logical coordinate by a projected-space delta at the
    /// map's current zoom (the drag-commit path).
    pub fn translate_projected(&mut self, delta: Vec2, map: &MapView) {
        self.for_each_coord_mut(|coord| {
            let p = map.latlng_to_layer_point(*coord);
            *coord = map.layer_point_to_latlng(p + delta);
        });
    }

    /// Hit test against a layer point at the map's current zoom.
    pub fn hit_test(&self, point: Point, map: &MapView, tolerance: f64) -> bool {
        match self {
            Shape::Point(coord) => map.latlng_to_layer_point(*coord).distance(point) <= tolerance,
            Shape::Polyline(line) => line.hit_test(point, map, tolerance),
            Shape::Polygon(poly) => poly.hit_test(point, map, tolerance),
            Shape::Circle(circle) => circle.hit_test(point, map, tolerance),
        }
    }
}

/// Reproject one coordinate through the matrix at the reference zoom.
pub(crate) fn transform_latlng(coord: LatLng, matrix: &Matrix, map: &MapView) -> LatLng {
    map.unproject_at_max_zoom(matrix.transform(map.project_at_max_zoom(coord)))
}

/// Distance from a point to a line segment (a→b) in projected space.
pub fn point_to_segment_dist(point: Point, a: Point, b: Point) -> f64 {
    let seg = Vec2::new(b.x - a.x, b.y - a.y);
    let pv = Vec2::new(point.x - a.x, point.y - a.y);
    let len_sq = seg.hypot2();
    if len_sq < f64::EPSILON {
        return pv.hypot();
    }
    let t = (pv.dot(seg) / len_sq).clamp(0.0, 1.0);
    let proj = Point::new(a.x + t * seg.x, a.y + t * seg.y);
    point.distance(proj)
}

/// Even-odd containment test of a point against a projected ring.
pub(crate) fn point_in_ring(point: Point, ring: &[Point]) -> bool {
    let mut inside = false;
    let n = ring.len();
    if n < 3 {
        return false;
    }
    let mut j = n - 1;
    for i in 0..n {
        let (pi, pj) = (ring[i], ring[j]);
        if (pi.y > point.y) != (pj.y > point.y)
            && point.x < (pj.x - pi.x) * (point.y - pi.y) / (pj.y - pi.y) + pi.x
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}
