//! Rotate/scale gesture against a bounding ring and its handles.
//!
//! States: `Disabled -> Idle (handles visible) -> Rotating | Scaling ->
//! Idle`. Only one of rotate/scale can be active because each starts from
//! its own handle. Previews accumulate in a layer-space matrix derived from
//! cached gesture-start positions; the commit rebuilds the matrix once at
//! the reference zoom and folds it into every logical coordinate of the
//! shape and the bounding ring, then recreates the handle chrome from the
//! committed ring.

use crate::error::{TransformError, TransformResult};
use crate::events::GestureEvent;
use crate::handles::{BoundingRing, Handle, HandleRole, HANDLE_HIT_TOLERANCE};
use crate::map::{MapView, RenderSurface};
use crate::matrix::Matrix;
use crate::projection::{self, LatLng};
use crate::shapes::Shape;
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

/// Tunable behavior of the transform gesture.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransformOptions {
    /// Offer the rotation handle.
    pub rotation: bool,
    /// Offer the corner scale handles.
    pub scaling: bool,
    /// Scale both axes by the same ratio; when false, per-axis ratios come
    /// from the signed per-axis pointer offsets.
    pub uniform_scaling: bool,
    /// Pixel distance of the rotation handle past the ring's top edge.
    pub handle_length: f64,
    /// Number of corner handles (capped at the ring's four corners).
    pub edges_count: usize,
}

impl Default for TransformOptions {
    fn default() -> Self {
        Self {
            rotation: true,
            scaling: true,
            uniform_scaling: true,
            handle_length: 20.0,
            edges_count: 4,
        }
    }
}

/// Transform gesture phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformState {
    Disabled,
    Idle,
    Rotating,
    Scaling,
}

/// Rotate/scale gesture handler for a single shape.
#[derive(Debug)]
pub struct TransformHandler {
    options: TransformOptions,
    state: TransformState,

    matrix: Matrix,
    initial_matrix: Matrix,
    angle: f64,
    scale: Vec2,

    rotation_start: Point,
    rotation_origin_point: Point,
    rotation_origin: Option<LatLng>,
    scale_origin: Option<LatLng>,
    scale_origin_point: Point,
    initial_dist: f64,
    initial_dist_x: f64,
    initial_dist_y: f64,
    active_handle: Option<usize>,
    origin_handle: Option<usize>,

    handles: Vec<Handle>,
    ring: Option<BoundingRing>,
    handle_line: Option<[LatLng; 2]>,
    visible: bool,

    map_dragging_was_enabled: bool,
    events: Vec<GestureEvent>,
}

impl Default for TransformHandler {
    fn default() -> Self {
        Self::new(TransformOptions::default())
    }
}

impl TransformHandler {
    pub fn new(options: TransformOptions) -> Self {
        Self {
            options,
            state: TransformState::Disabled,
            matrix: Matrix::IDENTITY,
            initial_matrix: Matrix::IDENTITY,
            angle: 0.0,
            scale: Vec2::new(1.0, 1.0),
            rotation_start: Point::ZERO,
            rotation_origin_point: Point::ZERO,
            rotation_origin: None,
            scale_origin: None,
            scale_origin_point: Point::ZERO,
            initial_dist: 0.0,
            initial_dist_x: 0.0,
            initial_dist_y: 0.0,
            active_handle: None,
            origin_handle: None,
            handles: Vec::new(),
            ring: None,
            handle_line: None,
            visible: false,
            map_dragging_was_enabled: false,
            events: Vec::new(),
        }
    }

    pub fn state(&self) -> TransformState {
        self.state
    }

    pub fn options(&self) -> &TransformOptions {
        &self.options
    }

    /// The in-progress preview matrix (identity outside a gesture).
    pub fn matrix(&self) -> &Matrix {
        &self.matrix
    }

    pub fn handles(&self) -> &[Handle] {
        &self.handles
    }

    /// Index of the handle owning the active gesture, for host highlighting.
    pub fn active_handle(&self) -> Option<usize> {
        self.active_handle
    }

    pub fn bounding_ring(&self) -> Option<&BoundingRing> {
        self.ring.as_ref()
    }

    /// The two endpoints of the rotation handle line (top-edge midpoint and
    /// the handle itself), when rotation is enabled.
    pub fn handle_line(&self) -> Option<&[LatLng; 2]> {
        self.handle_line.as_ref()
    }

    /// False while a drag gesture has taken over the shape.
    pub fn handles_visible(&self) -> bool {
        self.visible && self.state != TransformState::Disabled
    }

    /// The rotation chrome is hidden while a scale is in progress.
    pub fn rotation_chrome_visible(&self) -> bool {
        self.handles_visible() && self.options.rotation && self.state != TransformState::Scaling
    }

    /// Drain queued notifications.
    pub fn take_events(&mut self) -> Vec<GestureEvent> {
        std::mem::take(&mut self.events)
    }

    /// Show handles and the bounding ring for the shape.
    ///
    /// Fails fast when the shape has no coordinates to derive bounds from;
    /// that is a programmer error, not a gesture condition.
    pub fn enable(&mut self, shape: &Shape, map: &MapView) -> TransformResult<()> {
        let bounds = shape.bounds().ok_or(TransformError::EmptyGeometry)?;
        self.ring = Some(BoundingRing::from_bounds(&bounds));
        self.state = TransformState::Idle;
        self.visible = true;
        self.rebuild_handles(map);
        log::debug!("transform enabled, {} handles", self.handles.len());
        Ok(())
    }

    /// Tear down all handle objects and the bounding ring.
    pub fn disable(&mut self, map: &mut MapView) {
        if matches!(self.state, TransformState::Rotating | TransformState::Scaling)
            && self.map_dragging_was_enabled
        {
            map.enable_dragging();
        }
        self.state = TransformState::Disabled;
        self.matrix = Matrix::IDENTITY;
        self.angle = 0.0;
        self.scale = Vec2::new(1.0, 1.0);
        self.handles.clear();
        self.ring = None;
        self.handle_line = None;
        self.rotation_origin = None;
        self.scale_origin = None;
        self.active_handle = None;
        self.origin_handle = None;
        self.visible = false;
    }

    /// Replace the options; recreates handles when currently enabled.
    pub fn set_options(
        &mut self,
        options: TransformOptions,
        shape: &Shape,
        map: &MapView,
    ) -> TransformResult<()> {
        self.options = options;
        if self.state != TransformState::Disabled {
            let bounds = shape.bounds().ok_or(TransformError::EmptyGeometry)?;
            self.ring = Some(BoundingRing::from_bounds(&bounds));
            self.rebuild_handles(map);
        }
        Ok(())
    }

    /// Find the handle under a layer point, if any are visible.
    pub fn hit_test_handles(&self, point: Point) -> Option<usize> {
        if !self.handles_visible() {
            return None;
        }
        self.handles.iter().position(|h| {
            if h.role == HandleRole::Rotation && !self.rotation_chrome_visible() {
                return false;
            }
            h.hit_test(point, HANDLE_HIT_TOLERANCE)
        })
    }

    /// Pointer down: start a rotate or scale if a handle was pressed.
    /// Returns whether the gesture consumed the event.
    pub fn on_pointer_down(&mut self, position: Point, map: &mut MapView) -> bool {
        if self.state != TransformState::Idle {
            return false;
        }
        let Some(index) = self.hit_test_handles(position) else {
            return false;
        };
        match self.handles[index].role {
            HandleRole::Rotation => self.start_rotate(position, map),
            HandleRole::Corner(corner) => self.start_scale(corner, map),
        }
        if self.state != TransformState::Idle {
            self.active_handle = Some(index);
        }
        true
    }

    fn start_rotate(&mut self, position: Point, map: &mut MapView) {
        let Some(ring) = self.ring else { return };
        self.take_map_dragging(map);
        self.rotation_origin = Some(ring.center());
        self.rotation_origin_point = map.latlng_to_layer_point(ring.center());
        self.rotation_start = position;
        self.initial_matrix = self.matrix;
        self.angle = 0.0;
        self.cache_points();
        self.state = TransformState::Rotating;
        self.events.push(GestureEvent::TransformStart);
        self.events.push(GestureEvent::Rotate { rotation: 0.0 });
        log::debug!("rotate started, pivot {:?}", self.rotation_origin_point);
    }

    fn start_scale(&mut self, corner: usize, map: &mut MapView) {
        if !self.options.scaling {
            return;
        }
        self.take_map_dragging(map);
        let corner_count = self.corner_count();
        // Corner handles are built first, so the ring index is the handle
        // index for them.
        let origin_index = (corner + 2) % corner_count;
        self.origin_handle = Some(origin_index);
        self.scale_origin = Some(self.handles[origin_index].latlng);
        self.scale_origin_point = self.handles[origin_index].point;
        self.initial_matrix = self.matrix;
        self.cache_points();

        let active = self.handles[corner].point;
        self.initial_dist = self.scale_origin_point.distance(active);
        self.initial_dist_x = self.scale_origin_point.x - active.x;
        self.initial_dist_y = self.scale_origin_point.y - active.y;
        self.state = TransformState::Scaling;
        self.events.push(GestureEvent::TransformStart);
        self.events.push(GestureEvent::Scale {
            scale: Vec2::new(1.0, 1.0),
        });
        log::debug!("scale started, pivot corner {origin_index}");
    }

    /// Pointer move: recompute the preview matrix for the active gesture.
    /// Moves outside an active gesture are stray events and ignored.
    pub fn on_pointer_move(&mut self, position: Point, surface: &mut dyn RenderSurface) {
        match self.state {
            TransformState::Rotating => self.on_rotate(position, surface),
            TransformState::Scaling => self.on_scale(position, surface),
            TransformState::Disabled | TransformState::Idle => {}
        }
    }

    fn on_rotate(&mut self, position: Point, surface: &mut dyn RenderSurface) {
        let origin = self.rotation_origin_point;
        let start = self.rotation_start;
        self.angle = (position.y - origin.y).atan2(position.x - origin.x)
            - (start.y - origin.y).atan2(start.x - origin.x);
        self.matrix = self.initial_matrix.rotated(self.angle, origin);
        self.update_preview(surface);
        self.events.push(GestureEvent::Rotate {
            rotation: self.angle,
        });
    }

    fn on_scale(&mut self, position: Point, surface: &mut dyn RenderSurface) {
        let origin = self.scale_origin_point;
        let (sx, sy) = if self.options.uniform_scaling {
            // A coincident pivot and start handle cannot produce a ratio;
            // the frame degrades to a no-op instead of NaN.
            let ratio = if self.initial_dist > f64::EPSILON {
                origin.distance(position) / self.initial_dist
            } else {
                1.0
            };
            (ratio, ratio)
        } else {
            let sx = if self.initial_dist_x.abs() > f64::EPSILON {
                (origin.x - position.x) / self.initial_dist_x
            } else {
                1.0
            };
            let sy = if self.initial_dist_y.abs() > f64::EPSILON {
                (origin.y - position.y) / self.initial_dist_y
            } else {
                1.0
            };
            (sx, sy)
        };
        self.scale = Vec2::new(sx, sy);
        self.matrix = self.initial_matrix.scaled(sx, sy, origin);
        self.update_preview(surface);
        self.events.push(GestureEvent::Scale { scale: self.scale });
    }

    fn update_preview(&mut self, surface: &mut dyn RenderSurface) {
        let skip = if self.state == TransformState::Scaling {
            self.origin_handle
        } else {
            None
        };
        for (i, handle) in self.handles.iter_mut().enumerate() {
            if Some(i) == skip {
                continue;
            }
            if let Some(initial) = handle.initial_point {
                handle.point = self.matrix.transform(initial);
            }
        }
        surface.apply_transform(&self.matrix);
    }

    /// Pointer up: commit the active gesture. Ups outside an active
    /// gesture are ignored.
    pub fn on_pointer_up(
        &mut self,
        shape: &mut Shape,
        map: &mut MapView,
        surface: &mut dyn RenderSurface,
    ) {
        match self.state {
            TransformState::Rotating => {
                self.events.push(GestureEvent::RotateEnd {
                    rotation: self.angle,
                });
                self.apply(shape, map, surface);
            }
            TransformState::Scaling => {
                self.events.push(GestureEvent::ScaleEnd { scale: self.scale });
                self.apply(shape, map, surface);
            }
            TransformState::Disabled | TransformState::Idle => {}
        }
    }

    /// Fold the accumulated gesture into logical coordinates, exactly once.
    fn apply(&mut self, shape: &mut Shape, map: &mut MapView, surface: &mut dyn RenderSurface) {
        let rotation = self.angle;
        let scale = self.scale;
        let projected = self.projected_matrix(map);

        shape.transform_projected(&projected, map);
        if let Some(ring) = &mut self.ring {
            ring.transform_projected(&projected, map);
        }

        surface.clear_transform();
        surface.redraw();

        self.matrix = Matrix::IDENTITY;
        self.initial_matrix = Matrix::IDENTITY;
        self.angle = 0.0;
        self.scale = Vec2::new(1.0, 1.0);
        self.active_handle = None;
        self.origin_handle = None;
        self.state = TransformState::Idle;

        // Handles are rebuilt from the committed ring, never from the
        // stale preview positions.
        self.rebuild_handles(map);

        if self.map_dragging_was_enabled {
            map.enable_dragging();
        }
        self.events.push(GestureEvent::Transformed {
            matrix: projected,
            rotation,
            scale,
        });
        log::debug!("transform committed: rotation {rotation}, scale {scale:?}");
    }

    /// Rotate the shape programmatically about the ring centroid.
    pub fn rotate_by(
        &mut self,
        angle: f64,
        shape: &mut Shape,
        map: &MapView,
    ) -> TransformResult<()> {
        let ring = self.ring.ok_or(TransformError::NotEnabled)?;
        let origin = map.project_at_max_zoom(ring.center());
        let projected = Matrix::IDENTITY.rotated(angle, origin);
        self.commit_programmatic(projected, angle, Vec2::new(1.0, 1.0), shape, map);
        Ok(())
    }

    /// Scale the shape programmatically about the ring centroid.
    pub fn scale_by(
        &mut self,
        scale: Vec2,
        shape: &mut Shape,
        map: &MapView,
    ) -> TransformResult<()> {
        let ring = self.ring.ok_or(TransformError::NotEnabled)?;
        if scale.x.abs() < f64::EPSILON || scale.y.abs() < f64::EPSILON {
            return Err(TransformError::DegenerateMatrix);
        }
        let origin = map.project_at_max_zoom(ring.center());
        let projected = Matrix::IDENTITY.scaled(scale.x, scale.y, origin);
        self.commit_programmatic(projected, 0.0, scale, shape, map);
        Ok(())
    }

    fn commit_programmatic(
        &mut self,
        projected: Matrix,
        rotation: f64,
        scale: Vec2,
        shape: &mut Shape,
        map: &MapView,
    ) {
        shape.transform_projected(&projected, map);
        if let Some(ring) = &mut self.ring {
            ring.transform_projected(&projected, map);
        }
        self.rebuild_handles(map);
        self.events.push(GestureEvent::Transformed {
            matrix: projected,
            rotation,
            scale,
        });
    }

    /// Hide handles while another gesture (drag) owns the shape.
    pub(crate) fn hide(&mut self) {
        self.visible = false;
    }

    /// A drag on the shape committed with this projected delta: move the
    /// ring with it, rebuild handles, and show them again.
    pub(crate) fn on_shape_dragged(&mut self, delta: Vec2, map: &MapView) {
        if self.state == TransformState::Disabled {
            return;
        }
        if let Some(ring) = &mut self.ring {
            ring.translate_projected(delta, map);
        }
        self.visible = true;
        self.rebuild_handles(map);
        self.events.push(GestureEvent::Transformed {
            matrix: Matrix::translation(delta.x, delta.y),
            rotation: 0.0,
            scale: Vec2::new(1.0, 1.0),
        });
    }

    pub(crate) fn show(&mut self) {
        if self.state != TransformState::Disabled {
            self.visible = true;
        }
    }

    fn corner_count(&self) -> usize {
        self.options.edges_count.clamp(1, 4)
    }

    fn take_map_dragging(&mut self, map: &mut MapView) {
        self.map_dragging_was_enabled = map.dragging_enabled();
        if self.map_dragging_was_enabled {
            map.disable_dragging();
        }
    }

    fn cache_points(&mut self) {
        for handle in &mut self.handles {
            handle.initial_point = Some(handle.point);
        }
    }

    /// The commit matrix, rebuilt once at the reference zoom from the
    /// accumulated angle and scale.
    fn projected_matrix(&self, map: &MapView) -> Matrix {
        let mut matrix = Matrix::IDENTITY;
        if self.scale.x != 1.0 || self.scale.y != 1.0 {
            if let Some(origin) = self.scale_origin {
                let o = map.project_at_max_zoom(origin);
                matrix = matrix.scaled(self.scale.x, self.scale.y, o);
            }
        }
        if self.angle != 0.0 {
            if let Some(origin) = self.rotation_origin {
                let o = map.project_at_max_zoom(origin);
                matrix = matrix.rotated(self.angle, o);
            }
        }
        matrix
    }

    fn rebuild_handles(&mut self, map: &MapView) {
        self.handles.clear();
        self.handle_line = None;
        let Some(ring) = self.ring else { return };

        if self.options.scaling {
            for i in 0..self.corner_count() {
                self.handles
                    .push(Handle::new(HandleRole::Corner(i), ring.corner(i), map));
            }
        }

        self.rotation_origin = Some(ring.center());
        if self.options.rotation {
            let bottom = map.latlng_to_layer_point(ring.bottom_mid());
            let top_latlng = ring.top_mid();
            let top = map.latlng_to_layer_point(top_latlng);
            let handle_point = projection::point_on_line(bottom, top, self.options.handle_length);
            let handle_latlng = map.layer_point_to_latlng(handle_point);
            self.handle_line = Some([top_latlng, handle_latlng]);
            self.handles
                .push(Handle::new(HandleRole::Rotation, handle_latlng, map));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::RecordingSurface;
    use crate::shapes::{transform_latlng, Polygon};
    use std::f64::consts::FRAC_PI_2;

    fn square(side: f64) -> Shape {
        Shape::Polygon(Polygon::new(vec![
            LatLng::new(0.0, 0.0),
            LatLng::new(0.0, side),
            LatLng::new(side, side),
            LatLng::new(side, 0.0),
        ]))
    }

    fn coords(shape: &Shape) -> Vec<LatLng> {
        let mut out = Vec::new();
        shape.clone().for_each_coord_mut(|c| out.push(*c));
        out
    }

    fn rotate_point(p: Point, pivot: Point, angle: f64) -> Point {
        Matrix::IDENTITY.rotated(angle, pivot).transform(p)
    }

    #[test]
    fn test_enable_builds_corner_and_rotation_handles() {
        let map = MapView::new(10.0, 18.0);
        let shape = square(10.0);
        let mut transform = TransformHandler::default();
        transform.enable(&shape, &map).unwrap();

        assert_eq!(transform.state(), TransformState::Idle);
        assert_eq!(transform.handles().len(), 5);
        assert!(matches!(
            transform.handles().last().unwrap().role,
            HandleRole::Rotation
        ));
        assert!(transform.bounding_ring().is_some());
        assert!(transform.handle_line().is_some());
    }

    #[test]
    fn test_enable_empty_shape_fails_fast() {
        let map = MapView::new(10.0, 18.0);
        let shape = Shape::Polyline(crate::shapes::Polyline::with_parts(vec![]));
        let mut transform = TransformHandler::default();
        assert!(matches!(
            transform.enable(&shape, &map),
            Err(TransformError::EmptyGeometry)
        ));
    }

    #[test]
    fn test_disable_tears_down_handles() {
        let mut map = MapView::new(10.0, 18.0);
        let shape = square(10.0);
        let mut transform = TransformHandler::default();
        transform.enable(&shape, &map).unwrap();
        transform.disable(&mut map);

        assert_eq!(transform.state(), TransformState::Disabled);
        assert!(transform.handles().is_empty());
        assert!(transform.bounding_ring().is_none());
        assert!(transform.handle_line().is_none());
    }

    #[test]
    fn test_options_without_rotation() {
        let map = MapView::new(10.0, 18.0);
        let shape = square(10.0);
        let mut transform = TransformHandler::new(TransformOptions {
            rotation: false,
            ..TransformOptions::default()
        });
        transform.enable(&shape, &map).unwrap();
        assert_eq!(transform.handles().len(), 4);
        assert!(transform.handle_line().is_none());
    }

    #[test]
    fn test_rotation_handle_sits_handle_length_past_top_edge() {
        let map = MapView::new(10.0, 18.0);
        let shape = square(1.0);
        let mut transform = TransformHandler::default();
        transform.enable(&shape, &map).unwrap();

        let ring = transform.bounding_ring().unwrap();
        let top = map.latlng_to_layer_point(ring.top_mid());
        let handle = transform.handles().last().unwrap().point;
        assert!((top.distance(handle) - 20.0).abs() < 1e-6);
    }

    #[test]
    fn test_rotate_quarter_turn_swaps_ring_sides_and_keeps_centroid() {
        let mut map = MapView::new(10.0, 18.0);
        let mut shape = square(1.0);
        let mut surface = RecordingSurface::new();
        let mut transform = TransformHandler::default();
        transform.enable(&shape, &map).unwrap();

        // Axis-aligned projected spans of the shape bounds; a quarter turn
        // must swap them.
        let spans = |shape: &Shape, map: &MapView| {
            let b = shape.bounds().unwrap();
            let sw = map.latlng_to_layer_point(b.south_west);
            let ne = map.latlng_to_layer_point(b.north_east);
            (ne.x - sw.x, sw.y - ne.y)
        };
        let (width, height) = spans(&shape, &map);
        let ring = *transform.bounding_ring().unwrap();
        let pivot = map.latlng_to_layer_point(ring.center());

        let start = transform.handles().last().unwrap().point;
        assert!(transform.on_pointer_down(start, &mut map));
        transform.on_pointer_move(rotate_point(start, pivot, FRAC_PI_2), &mut surface);
        assert!((transform.angle - FRAC_PI_2).abs() < 1e-9);
        transform.on_pointer_up(&mut shape, &mut map, &mut surface);

        assert!(transform.matrix().is_identity());
        let (new_width, new_height) = spans(&shape, &map);
        assert!((new_width - height).abs() < 1e-3);
        assert!((new_height - width).abs() < 1e-3);

        let after = *transform.bounding_ring().unwrap();
        let new_pivot = map.latlng_to_layer_point(after.center());
        assert!(pivot.distance(new_pivot) < 0.5);
    }

    #[test]
    fn test_rotate_by_zero_is_noop() {
        let mut map = MapView::new(10.0, 18.0);
        let mut shape = square(1.0);
        let mut surface = RecordingSurface::new();
        let mut transform = TransformHandler::default();
        transform.enable(&shape, &map).unwrap();

        let before = coords(&shape);
        let start = transform.handles().last().unwrap().point;
        transform.on_pointer_down(start, &mut map);
        transform.on_pointer_move(start, &mut surface);
        transform.on_pointer_up(&mut shape, &mut map, &mut surface);

        for (b, a) in before.iter().zip(coords(&shape).iter()) {
            assert!((b.lat - a.lat).abs() < 1e-9);
            assert!((b.lng - a.lng).abs() < 1e-9);
        }
    }

    #[test]
    fn test_scale_keeps_opposite_corner_fixed() {
        let mut map = MapView::new(10.0, 18.0);
        let mut shape = square(1.0);
        let mut surface = RecordingSurface::new();
        let mut transform = TransformHandler::default();
        transform.enable(&shape, &map).unwrap();

        let active = transform.handles()[0].point;
        let pivot_before = transform.handles()[2].point;
        let pivot_latlng = transform.handles()[2].latlng;
        assert!(transform.on_pointer_down(active, &mut map));
        assert_eq!(transform.state(), TransformState::Scaling);

        // Pull the corner outward along the diagonal: double the distance.
        let further = Point::new(
            pivot_before.x + (active.x - pivot_before.x) * 2.0,
            pivot_before.y + (active.y - pivot_before.y) * 2.0,
        );
        transform.on_pointer_move(further, &mut surface);

        // The pivot handle must not move during the gesture.
        assert!(transform.handles()[2].point.distance(pivot_before) < 1e-9);
        // And the matrix itself must fix the pivot.
        assert!(
            transform
                .matrix()
                .transform(pivot_before)
                .distance(pivot_before)
                < 1e-9
        );

        transform.on_pointer_up(&mut shape, &mut map, &mut surface);
        let pivot_after = transform.bounding_ring().unwrap().corner(2);
        assert!((pivot_after.lat - pivot_latlng.lat).abs() < 1e-6);
        assert!((pivot_after.lng - pivot_latlng.lng).abs() < 1e-6);
    }

    #[test]
    fn test_uniform_scale_ratio() {
        let mut map = MapView::new(10.0, 18.0);
        let shape = square(1.0);
        let mut surface = RecordingSurface::new();
        let mut transform = TransformHandler::default();
        transform.enable(&shape, &map).unwrap();

        let active = transform.handles()[0].point;
        let pivot = transform.handles()[2].point;
        transform.on_pointer_down(active, &mut map);
        let further = Point::new(
            pivot.x + (active.x - pivot.x) * 1.5,
            pivot.y + (active.y - pivot.y) * 1.5,
        );
        transform.on_pointer_move(further, &mut surface);
        assert!((transform.scale.x - 1.5).abs() < 1e-9);
        assert!((transform.scale.y - 1.5).abs() < 1e-9);
        assert_eq!(surface.last_applied(), Some(transform.matrix()));
    }

    #[test]
    fn test_non_uniform_scale_per_axis_ratios() {
        let mut map = MapView::new(10.0, 18.0);
        let mut shape = square(1.0);
        let mut surface = RecordingSurface::new();
        let mut transform = TransformHandler::new(TransformOptions {
            uniform_scaling: false,
            ..TransformOptions::default()
        });
        transform.enable(&shape, &map).unwrap();

        let active = transform.handles()[0].point;
        let pivot = transform.handles()[2].point;
        transform.on_pointer_down(active, &mut map);

        // Triple the horizontal offset from the pivot, 1.5x the vertical.
        let pos = Point::new(
            pivot.x + (active.x - pivot.x) * 3.0,
            pivot.y + (active.y - pivot.y) * 1.5,
        );
        transform.on_pointer_move(pos, &mut surface);
        assert!((transform.scale.x - 3.0).abs() < 1e-9);
        assert!((transform.scale.y - 1.5).abs() < 1e-9);
        assert!(transform.matrix().transform(pivot).distance(pivot) < 1e-9);

        transform.on_pointer_up(&mut shape, &mut map, &mut surface);
        let bounds = shape.bounds().unwrap();
        assert!((bounds.north_east.lng - bounds.south_west.lng - 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_non_uniform_scale_mirrors_through_pivot() {
        let mut map = MapView::new(10.0, 18.0);
        let mut shape = square(1.0);
        let mut surface = RecordingSurface::new();
        let mut transform = TransformHandler::new(TransformOptions {
            uniform_scaling: false,
            ..TransformOptions::default()
        });
        transform.enable(&shape, &map).unwrap();

        let active = transform.handles()[0].point;
        let pivot = transform.handles()[2].point;
        transform.on_pointer_down(active, &mut map);

        // Drag the corner to the far side of the pivot: both ratios flip
        // sign and stay finite.
        let mirrored = Point::new(
            pivot.x - (active.x - pivot.x),
            pivot.y - (active.y - pivot.y),
        );
        transform.on_pointer_move(mirrored, &mut surface);
        assert!((transform.scale.x + 1.0).abs() < 1e-9);
        assert!((transform.scale.y + 1.0).abs() < 1e-9);
        for c in transform.matrix().coeffs() {
            assert!(c.is_finite());
        }

        // Committed: the square now sits on the far side of the NE pivot.
        transform.on_pointer_up(&mut shape, &mut map, &mut surface);
        let bounds = shape.bounds().unwrap();
        assert!((bounds.south_west.lng - 1.0).abs() < 1e-6);
        assert!((bounds.north_east.lng - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_non_uniform_scale_zero_offset_guards() {
        let mut map = MapView::new(10.0, 18.0);
        let mut shape = Shape::Point(LatLng::new(5.0, 5.0));
        let mut surface = RecordingSurface::new();
        let mut transform = TransformHandler::new(TransformOptions {
            uniform_scaling: false,
            ..TransformOptions::default()
        });
        // Collapsed ring: both per-axis start offsets are zero, so both
        // ratios default to 1 instead of dividing by zero.
        transform.enable(&shape, &map).unwrap();

        let active = transform.handles()[0].point;
        transform.on_pointer_down(active, &mut map);
        transform.on_pointer_move(Point::new(active.x + 25.0, active.y - 40.0), &mut surface);

        assert!((transform.scale.x - 1.0).abs() < 1e-9);
        assert!((transform.scale.y - 1.0).abs() < 1e-9);
        for c in transform.matrix().coeffs() {
            assert!(c.is_finite());
        }
        transform.on_pointer_up(&mut shape, &mut map, &mut surface);
        assert!(transform.matrix().is_identity());
    }

    #[test]
    fn test_degenerate_scale_pivot_defaults_to_unit_ratio() {
        let mut map = MapView::new(10.0, 18.0);
        let mut shape = Shape::Point(LatLng::new(5.0, 5.0));
        let mut surface = RecordingSurface::new();
        let mut transform = TransformHandler::default();
        // A point shape collapses the ring: every handle coincides.
        assert!(shape.bounds().unwrap().is_degenerate());
        transform.enable(&shape, &map).unwrap();

        let active = transform.handles()[0].point;
        transform.on_pointer_down(active, &mut map);
        transform.on_pointer_move(Point::new(active.x + 40.0, active.y), &mut surface);

        assert!((transform.scale.x - 1.0).abs() < 1e-9);
        assert!((transform.scale.y - 1.0).abs() < 1e-9);
        for c in transform.matrix().coeffs() {
            assert!(c.is_finite());
        }

        transform.on_pointer_up(&mut shape, &mut map, &mut surface);
        assert!(transform.matrix().is_identity());
    }

    #[test]
    fn test_commit_equals_single_matrix_application() {
        let mut map = MapView::new(10.0, 18.0);
        let mut shape = square(1.0);
        let mut surface = RecordingSurface::new();
        let mut transform = TransformHandler::default();
        transform.enable(&shape, &map).unwrap();

        let before = coords(&shape);
        let pivot_latlng = transform.bounding_ring().unwrap().center();
        let pivot = map.latlng_to_layer_point(pivot_latlng);
        let start = transform.handles().last().unwrap().point;

        transform.on_pointer_down(start, &mut map);
        // Several incremental previews; logical coordinates must not move.
        for step in [0.2, 0.5, 0.9] {
            transform.on_pointer_move(rotate_point(start, pivot, step), &mut surface);
            assert_eq!(coords(&shape), before);
        }
        let final_angle = transform.angle;
        transform.on_pointer_up(&mut shape, &mut map, &mut surface);

        // Equivalent single application of the composed matrix.
        let origin = map.project_at_max_zoom(pivot_latlng);
        let expected_matrix = Matrix::IDENTITY.rotated(final_angle, origin);
        for (b, a) in before.iter().zip(coords(&shape).iter()) {
            let expected = transform_latlng(*b, &expected_matrix, &map);
            assert!((a.lat - expected.lat).abs() < 1e-9);
            assert!((a.lng - expected.lng).abs() < 1e-9);
        }
    }

    #[test]
    fn test_event_sequence_for_scale() {
        let mut map = MapView::new(10.0, 18.0);
        let mut shape = square(1.0);
        let mut surface = RecordingSurface::new();
        let mut transform = TransformHandler::default();
        transform.enable(&shape, &map).unwrap();

        let active = transform.handles()[0].point;
        transform.on_pointer_down(active, &mut map);
        transform.on_pointer_move(Point::new(active.x + 10.0, active.y + 10.0), &mut surface);
        transform.on_pointer_up(&mut shape, &mut map, &mut surface);

        let events = transform.take_events();
        assert!(matches!(events[0], GestureEvent::TransformStart));
        assert!(matches!(events[1], GestureEvent::Scale { .. }));
        assert!(events
            .iter()
            .any(|e| matches!(e, GestureEvent::ScaleEnd { .. })));
        assert!(matches!(
            events.last(),
            Some(GestureEvent::Transformed { .. })
        ));
    }

    #[test]
    fn test_map_panning_restored_after_commit() {
        let mut map = MapView::new(10.0, 18.0);
        let mut shape = square(1.0);
        let mut surface = RecordingSurface::new();
        let mut transform = TransformHandler::default();
        transform.enable(&shape, &map).unwrap();

        let start = transform.handles().last().unwrap().point;
        transform.on_pointer_down(start, &mut map);
        assert!(!map.dragging_enabled());
        transform.on_pointer_move(Point::new(start.x + 5.0, start.y), &mut surface);
        transform.on_pointer_up(&mut shape, &mut map, &mut surface);
        assert!(map.dragging_enabled());
    }

    #[test]
    fn test_stray_events_outside_gesture_are_ignored() {
        let mut map = MapView::new(10.0, 18.0);
        let mut shape = square(1.0);
        let mut surface = RecordingSurface::new();
        let mut transform = TransformHandler::default();

        // Disabled: nothing happens.
        transform.on_pointer_move(Point::new(1.0, 1.0), &mut surface);
        transform.on_pointer_up(&mut shape, &mut map, &mut surface);
        assert!(transform.take_events().is_empty());

        transform.enable(&shape, &map).unwrap();
        // Idle (no pointer down): a move after the up must be discarded.
        transform.on_pointer_move(Point::new(1.0, 1.0), &mut surface);
        assert!(transform.take_events().is_empty());
        assert!(surface.applied.is_empty());
    }

    #[test]
    fn test_rotation_chrome_hidden_during_scale() {
        let mut map = MapView::new(10.0, 18.0);
        let shape = square(1.0);
        let mut transform = TransformHandler::default();
        transform.enable(&shape, &map).unwrap();
        assert!(transform.rotation_chrome_visible());

        let active = transform.handles()[0].point;
        transform.on_pointer_down(active, &mut map);
        assert!(!transform.rotation_chrome_visible());
    }

    #[test]
    fn test_programmatic_rotate_requires_enable() {
        let map = MapView::new(10.0, 18.0);
        let mut shape = square(1.0);
        let mut transform = TransformHandler::default();
        assert!(matches!(
            transform.rotate_by(FRAC_PI_2, &mut shape, &map),
            Err(TransformError::NotEnabled)
        ));

        transform.enable(&shape, &map).unwrap();
        transform.rotate_by(FRAC_PI_2, &mut shape, &map).unwrap();
        let events = transform.take_events();
        assert!(matches!(
            events.last(),
            Some(GestureEvent::Transformed { .. })
        ));
    }

    #[test]
    fn test_programmatic_zero_scale_is_rejected() {
        let map = MapView::new(10.0, 18.0);
        let mut shape = square(1.0);
        let mut transform = TransformHandler::default();
        transform.enable(&shape, &map).unwrap();

        let before = coords(&shape);
        assert!(matches!(
            transform.scale_by(Vec2::new(0.0, 1.0), &mut shape, &map),
            Err(TransformError::DegenerateMatrix)
        ));
        assert_eq!(coords(&shape), before);

        transform
            .scale_by(Vec2::new(2.0, 2.0), &mut shape, &map)
            .unwrap();
        let bounds = shape.bounds().unwrap();
        assert!((bounds.north_east.lng - bounds.south_west.lng - 2.0).abs() < 1e-6);
    }
}
