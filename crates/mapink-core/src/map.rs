//! Host map view state and the rendering-surface contract.

use crate::matrix::Matrix;
use crate::projection::{self, LatLng};
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// View state of the host map: current zoom, the reference zoom used for
/// commit math, and the shared "map panning enabled" flag that shape
/// gestures toggle while they own the pointer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapView {
    zoom: f64,
    max_zoom: f64,
    dragging_enabled: bool,
}

impl MapView {
    /// Create a view at the given zoom. `max_zoom` is the fixed high zoom
    /// commits project through to avoid precision loss at low zooms.
    pub fn new(zoom: f64, max_zoom: f64) -> Self {
        Self {
            zoom: zoom.min(max_zoom),
            max_zoom,
            dragging_enabled: true,
        }
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn max_zoom(&self) -> f64 {
        self.max_zoom
    }

    pub fn set_zoom(&mut self, zoom: f64) {
        self.zoom = zoom.min(self.max_zoom);
    }

    /// Project a logical coordinate at the current zoom.
    pub fn latlng_to_layer_point(&self, coord: LatLng) -> Point {
        projection::project(coord, self.zoom)
    }

    /// Unproject a layer point at the current zoom.
    pub fn layer_point_to_latlng(&self, point: Point) -> LatLng {
        projection::unproject(point, self.zoom)
    }

    /// Project a logical coordinate at the commit reference zoom.
    pub fn project_at_max_zoom(&self, coord: LatLng) -> Point {
        projection::project(coord, self.max_zoom)
    }

    /// Unproject a point at the commit reference zoom.
    pub fn unproject_at_max_zoom(&self, point: Point) -> LatLng {
        projection::unproject(point, self.max_zoom)
    }

    /// Whether the host map itself may pan on pointer drags.
    pub fn dragging_enabled(&self) -> bool {
        self.dragging_enabled
    }

    pub fn enable_dragging(&mut self) {
        self.dragging_enabled = true;
    }

    pub fn disable_dragging(&mut self) {
        self.dragging_enabled = false;
    }
}

/// The rendering surface a shape (and its gesture chrome) is drawn on.
///
/// The engine never renders; during a gesture it hands the surface a cheap
/// preview matrix, and after a commit it asks the surface to re-render from
/// the updated logical geometry.
pub trait RenderSurface {
    /// Apply a non-destructive visual transform for live preview. Must not
    /// mutate stored geometry.
    fn apply_transform(&mut self, matrix: &Matrix);

    /// Remove the preview transform and fall back to logical geometry.
    fn clear_transform(&mut self);

    /// Re-render from current logical geometry after coordinates changed.
    fn redraw(&mut self);
}

/// A [`RenderSurface`] that records every call it receives.
///
/// Lets hosts and tests assert on the preview protocol without a renderer.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    /// Matrices received through `apply_transform`, in order.
    pub applied: Vec<Matrix>,
    /// Number of `clear_transform` calls.
    pub cleared: usize,
    /// Number of `redraw` calls.
    pub redraws: usize,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recent preview matrix, if any.
    pub fn last_applied(&self) -> Option<&Matrix> {
        self.applied.last()
    }
}

impl RenderSurface for RecordingSurface {
    fn apply_transform(&mut self, matrix: &Matrix) {
        self.applied.push(*matrix);
    }

    fn clear_transform(&mut self) {
        self.cleared += 1;
    }

    fn redraw(&mut self) {
        self.redraws += 1;
    }
}
