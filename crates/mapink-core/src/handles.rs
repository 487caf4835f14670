//! Corner and rotation handles plus the bounding ring they hang off.

use crate::map::MapView;
use crate::matrix::Matrix;
use crate::projection::{LatLng, LatLngBounds};
use crate::shapes::transform_latlng;
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

/// Handle hit tolerance in layer pixels.
pub const HANDLE_HIT_TOLERANCE: f64 = 10.0;

/// What dragging a handle does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HandleRole {
    /// Scale handle on a bounding-ring corner (index into the ring).
    Corner(usize),
    /// Rotation handle above the ring's top edge.
    Rotation,
}

/// An interactive control point owned by the transform gesture.
#[derive(Debug, Clone, Copy)]
pub struct Handle {
    pub role: HandleRole,
    /// Authoritative logical position.
    pub latlng: LatLng,
    /// Projected position at the current zoom, updated every preview frame.
    pub point: Point,
    /// Projected position cached at gesture start; preview frames derive
    /// `point` from this so repeated moves never accumulate error.
    pub(crate) initial_point: Option<Point>,
}

impl Handle {
    pub fn new(role: HandleRole, latlng: LatLng, map: &MapView) -> Self {
        Self {
            role,
            latlng,
            point: map.latlng_to_layer_point(latlng),
            initial_point: None,
        }
    }

    /// Whether a layer point hits this handle.
    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        self.point.distance(point) <= tolerance
    }
}

/// The four logical corners of the shape's bounding rectangle, in ring
/// order `[SW, NW, NE, SE]`. Built from the shape's bounds on enable, then
/// committed alongside the shape so rotated rings stay tight.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingRing {
    corners: [LatLng; 4],
}

impl BoundingRing {
    pub fn from_bounds(bounds: &LatLngBounds) -> Self {
        let sw = bounds.south_west;
        let ne = bounds.north_east;
        Self {
            corners: [
                sw,
                LatLng::new(ne.lat, sw.lng),
                ne,
                LatLng::new(sw.lat, ne.lng),
            ],
        }
    }

    pub fn corners(&self) -> &[LatLng; 4] {
        &self.corners
    }

    pub fn corner(&self, index: usize) -> LatLng {
        self.corners[index % 4]
    }

    /// Ring centroid: midpoint of two opposite corners.
    pub fn center(&self) -> LatLng {
        self.corners[0].midpoint(&self.corners[2])
    }

    /// Midpoint of the bottom (south) edge.
    pub fn bottom_mid(&self) -> LatLng {
        self.corners[0].midpoint(&self.corners[3])
    }

    /// Midpoint of the top (north) edge.
    pub fn top_mid(&self) -> LatLng {
        self.corners[1].midpoint(&self.corners[2])
    }

    /// Fold a projected commit matrix into the ring, same as the shape.
    pub fn transform_projected(&mut self, matrix: &Matrix, map: &MapView) {
        for corner in &mut self.corners {
            *corner = transform_latlng(*corner, matrix, map);
        }
    }

    /// Translate the ring by a projected delta at the current zoom (follows
    /// a committed drag).
    pub fn translate_projected(&mut self, delta: Vec2, map: &MapView) {
        for corner in &mut self.corners {
            let p = map.latlng_to_layer_point(*corner);
            *corner = map.layer_point_to_latlng(p + delta);
        }
    }
}
