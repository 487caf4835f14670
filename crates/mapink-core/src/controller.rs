//! Routes pointer input between the drag and transform gestures of one
//! shape.
//!
//! Exactly one gesture owns the pointer at a time. Handles win over the
//! shape body on pointer down, so a corner grab always scales even when the
//! handle overlaps the shape. Handle chrome hides while a drag is moving
//! and comes back, repositioned, when it commits.

use crate::drag::{DragHandler, DragState};
use crate::error::TransformResult;
use crate::events::GestureEvent;
use crate::handles::{BoundingRing, Handle};
use crate::input::PointerEvent;
use crate::map::{MapView, RenderSurface};
use crate::projection::LatLng;
use crate::shapes::Shape;
use crate::transform::{TransformHandler, TransformOptions, TransformState};
use kurbo::Point;

/// Hit tolerance in layer pixels for pointer-down on the shape body.
pub const SHAPE_HIT_TOLERANCE: f64 = 5.0;

/// Which gesture currently owns the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActiveGesture {
    #[default]
    None,
    Drag,
    Transform,
}

/// Interaction controller for one shape on one map.
#[derive(Debug)]
pub struct PathController {
    shape: Shape,
    drag: DragHandler,
    transform: TransformHandler,
    active: ActiveGesture,
    draggable: bool,
}

impl PathController {
    pub fn new(shape: Shape) -> Self {
        Self::with_options(shape, TransformOptions::default())
    }

    pub fn with_options(shape: Shape, options: TransformOptions) -> Self {
        Self {
            shape,
            drag: DragHandler::new(),
            transform: TransformHandler::new(options),
            active: ActiveGesture::None,
            draggable: true,
        }
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn into_shape(self) -> Shape {
        self.shape
    }

    pub fn active(&self) -> ActiveGesture {
        self.active
    }

    pub fn drag_state(&self) -> DragState {
        self.drag.state()
    }

    pub fn transform_state(&self) -> TransformState {
        self.transform.state()
    }

    pub fn handles(&self) -> &[Handle] {
        self.transform.handles()
    }

    pub fn handles_visible(&self) -> bool {
        self.transform.handles_visible()
    }

    pub fn bounding_ring(&self) -> Option<&BoundingRing> {
        self.transform.bounding_ring()
    }

    pub fn handle_line(&self) -> Option<&[LatLng; 2]> {
        self.transform.handle_line()
    }

    /// Whether pointer-down on the shape body starts a drag.
    pub fn set_draggable(&mut self, draggable: bool) {
        self.draggable = draggable;
    }

    /// Show the transform handles and bounding ring.
    pub fn enable_transform(&mut self, map: &MapView) -> TransformResult<()> {
        self.transform.enable(&self.shape, map)
    }

    /// Remove the transform handles and bounding ring.
    pub fn disable_transform(&mut self, map: &mut MapView) {
        self.transform.disable(map);
        if self.active == ActiveGesture::Transform {
            self.active = ActiveGesture::None;
        }
    }

    /// Replace the transform options, rebuilding handles when enabled.
    pub fn set_transform_options(
        &mut self,
        options: TransformOptions,
        map: &MapView,
    ) -> TransformResult<()> {
        self.transform.set_options(options, &self.shape, map)
    }

    /// Consume the suppress-next-click flag after a committed drag.
    pub fn take_click_suppressed(&mut self) -> bool {
        self.drag.take_click_suppressed()
    }

    /// Drain notifications queued by both gestures.
    pub fn take_events(&mut self) -> Vec<GestureEvent> {
        let mut events = self.drag.take_events();
        events.extend(self.transform.take_events());
        events
    }

    /// Feed one normalized pointer event through the gesture router.
    /// Returns whether a gesture consumed the event.
    pub fn handle_pointer(
        &mut self,
        event: PointerEvent,
        map: &mut MapView,
        surface: &mut dyn RenderSurface,
    ) -> bool {
        let position = event.position();
        match event {
            PointerEvent::Down { .. } => self.on_down(position, map),
            PointerEvent::Move { is_touch, .. } => self.on_move(position, is_touch, surface),
            PointerEvent::Up { .. } => self.on_up(position, map, surface),
        }
    }

    fn on_down(&mut self, position: Point, map: &mut MapView) -> bool {
        if self.active != ActiveGesture::None {
            return false;
        }
        // Handles take priority over the shape body.
        if self.transform.on_pointer_down(position, map) {
            self.active = ActiveGesture::Transform;
            return true;
        }
        if self.draggable && self.shape.hit_test(position, map, SHAPE_HIT_TOLERANCE) {
            self.drag.on_pointer_down(position, map);
            self.active = ActiveGesture::Drag;
            return true;
        }
        false
    }

    fn on_move(&mut self, position: Point, is_touch: bool, surface: &mut dyn RenderSurface) -> bool {
        match self.active {
            ActiveGesture::Drag => {
                self.drag.on_pointer_move(position, is_touch, surface);
                if self.drag.moved() {
                    self.transform.hide();
                }
                true
            }
            ActiveGesture::Transform => {
                self.transform.on_pointer_move(position, surface);
                true
            }
            ActiveGesture::None => false,
        }
    }

    fn on_up(
        &mut self,
        position: Point,
        map: &mut MapView,
        surface: &mut dyn RenderSurface,
    ) -> bool {
        let consumed = match self.active {
            ActiveGesture::Drag => {
                match self.drag.on_pointer_up(position, &mut self.shape, map, surface) {
                    Some(delta) => self.transform.on_shape_dragged(delta, map),
                    // A click: nothing moved, just unhide.
                    None => self.transform.show(),
                }
                true
            }
            ActiveGesture::Transform => {
                self.transform.on_pointer_up(&mut self.shape, map, surface);
                true
            }
            ActiveGesture::None => false,
        };
        self.active = ActiveGesture::None;
        consumed
    }
}
