//! Polyline and polygon shapes: ordered coordinate rings with multi-part
//! and hole support.

use super::{point_in_ring, point_to_segment_dist};
use crate::map::MapView;
use crate::projection::{LatLng, LatLngBounds};
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// An open line string, possibly with multiple disjoint parts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polyline {
    /// One coordinate sequence per part.
    pub parts: Vec<Vec<LatLng>>,
}

impl Polyline {
    /// Create a single-part polyline.
    pub fn new(coords: Vec<LatLng>) -> Self {
        Self { parts: vec![coords] }
    }

    /// Create a multi-part polyline.
    pub fn with_parts(parts: Vec<Vec<LatLng>>) -> Self {
        Self { parts }
    }

    pub fn bounds(&self) -> Option<LatLngBounds> {
        bounds_of(self.parts.iter().flatten())
    }

    pub fn for_each_coord_mut(&mut self, f: &mut impl FnMut(&mut LatLng)) {
        for part in &mut self.parts {
            for coord in part {
                f(coord);
            }
        }
    }

    /// Whether a layer point lies within `tolerance` pixels of any segment.
    pub fn hit_test(&self, point: Point, map: &MapView, tolerance: f64) -> bool {
        for part in &self.parts {
            let projected: Vec<Point> =
                part.iter().map(|c| map.latlng_to_layer_point(*c)).collect();
            if projected
                .windows(2)
                .any(|w| point_to_segment_dist(point, w[0], w[1]) <= tolerance)
            {
                return true;
            }
        }
        false
    }
}

/// A closed outline with optional interior holes.
///
/// The first ring is the outline; subsequent rings are holes. Rings are
/// stored unclosed (the last vertex does not repeat the first).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    pub rings: Vec<Vec<LatLng>>,
}

impl Polygon {
    /// Create a polygon from its outline ring.
    pub fn new(outline: Vec<LatLng>) -> Self {
        Self {
            rings: vec![outline],
        }
    }

    /// Append an interior hole.
    pub fn add_hole(&mut self, hole: Vec<LatLng>) {
        self.rings.push(hole);
    }

    pub fn outline(&self) -> &[LatLng] {
        self.rings.first().map(Vec::as_slice).unwrap_or(&[])
    }

    /// Bounds of the outline ring only; holes cannot extend the outline.
    pub fn bounds(&self) -> Option<LatLngBounds> {
        bounds_of(self.outline().iter())
    }

    pub fn for_each_coord_mut(&mut self, f: &mut impl FnMut(&mut LatLng)) {
        for ring in &mut self.rings {
            for coord in ring {
                f(coord);
            }
        }
    }

    /// Whether a layer point is inside the outline but outside every hole,
    /// or within `tolerance` pixels of the outline itself.
    pub fn hit_test(&self, point: Point, map: &MapView, tolerance: f64) -> bool {
        let mut rings = self.rings.iter();
        let Some(outline) = rings.next() else {
            return false;
        };
        let projected: Vec<Point> = outline
            .iter()
            .map(|c| map.latlng_to_layer_point(*c))
            .collect();

        let on_edge = edge_within(&projected, point, tolerance);
        if !point_in_ring(point, &projected) {
            return on_edge;
        }
        for hole in rings {
            let hole_projected: Vec<Point> = hole
                .iter()
                .map(|c| map.latlng_to_layer_point(*c))
                .collect();
            if point_in_ring(point, &hole_projected) {
                return on_edge;
            }
        }
        true
    }
}

fn bounds_of<'a>(mut coords: impl Iterator<Item = &'a LatLng>) -> Option<LatLngBounds> {
    let first = coords.next()?;
    let mut bounds = LatLngBounds::of(*first);
    for coord in coords {
        bounds.extend(*coord);
    }
    Some(bounds)
}

/// Distance test against a closed ring's edges.
fn edge_within(ring: &[Point], point: Point, tolerance: f64) -> bool {
    if ring.len() < 2 {
        return false;
    }
    let closing = [ring[ring.len() - 1], ring[0]];
    ring.windows(2)
        .chain(std::iter::once(&closing[..]))
        .any(|w| point_to_segment_dist(point, w[0], w[1]) <= tolerance)
}
