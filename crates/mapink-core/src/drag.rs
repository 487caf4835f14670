//! Drag gesture: translate a whole shape by accumulating pointer deltas.
//!
//! The state machine is `Idle -> Armed (pointer down) -> Dragging (moved
//! past tolerance) -> Idle (pointer up)`. While active the gesture owns a
//! translation-only matrix that previews on the render surface; the commit
//! translates every logical coordinate once, at the zoom sampled at commit
//! time, and resets the matrix to identity.

use crate::events::GestureEvent;
use crate::map::{MapView, RenderSurface};
use crate::matrix::Matrix;
use crate::shapes::Shape;
use kurbo::{Point, Vec2};

/// Movement below this many pixels on touch input is a tap, not a drag.
pub const TAP_TOLERANCE: f64 = 15.0;

/// Drag gesture phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragState {
    Idle,
    /// Pointer is down but has not moved past the tolerance.
    Armed,
    Dragging,
}

/// Single-shape drag gesture handler.
#[derive(Debug)]
pub struct DragHandler {
    state: DragState,
    matrix: Matrix,
    /// Last processed pointer position; deltas accumulate against this,
    /// not against the gesture start.
    last_point: Point,
    drag_start_point: Point,
    map_dragging_was_enabled: bool,
    click_suppressed: bool,
    events: Vec<GestureEvent>,
}

impl Default for DragHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl DragHandler {
    pub fn new() -> Self {
        Self {
            state: DragState::Idle,
            matrix: Matrix::IDENTITY,
            last_point: Point::ZERO,
            drag_start_point: Point::ZERO,
            map_dragging_was_enabled: false,
            click_suppressed: false,
            events: Vec::new(),
        }
    }

    pub fn state(&self) -> DragState {
        self.state
    }

    /// The accumulated preview matrix (identity outside a gesture).
    pub fn matrix(&self) -> &Matrix {
        &self.matrix
    }

    /// Whether the current or just-finished gesture moved the shape.
    pub fn moved(&self) -> bool {
        self.state == DragState::Dragging
    }

    /// Consume the suppress-next-click flag. Hosts call this when a
    /// synthetic click arrives right after pointer-up; a true result means
    /// the click belongs to a finished drag and must be swallowed.
    pub fn take_click_suppressed(&mut self) -> bool {
        std::mem::take(&mut self.click_suppressed)
    }

    /// Drain queued notifications.
    pub fn take_events(&mut self) -> Vec<GestureEvent> {
        std::mem::take(&mut self.events)
    }

    /// Pointer down on the shape: arm the gesture and take the map's pan
    /// capability for its duration.
    pub fn on_pointer_down(&mut self, position: Point, map: &mut MapView) {
        self.state = DragState::Armed;
        self.matrix = Matrix::IDENTITY;
        self.last_point = position;
        self.drag_start_point = position;
        self.map_dragging_was_enabled = map.dragging_enabled();
        if self.map_dragging_was_enabled {
            map.disable_dragging();
        }
        log::trace!("drag armed at {position:?}");
    }

    /// Pointer move: accumulate the delta against the last position and
    /// hand the matrix to the surface for preview.
    pub fn on_pointer_move(
        &mut self,
        position: Point,
        is_touch: bool,
        surface: &mut dyn RenderSurface,
    ) {
        match self.state {
            // Stray move after the gesture closed: ignore.
            DragState::Idle => return,
            DragState::Armed => {
                if is_touch && self.drag_start_point.distance(position) <= TAP_TOLERANCE {
                    return;
                }
            }
            DragState::Dragging => {}
        }

        let dx = position.x - self.last_point.x;
        let dy = position.y - self.last_point.y;
        if dx == 0.0 && dy == 0.0 {
            return;
        }

        if self.state == DragState::Armed {
            self.state = DragState::Dragging;
            self.events.push(GestureEvent::DragStart);
            log::debug!("drag started");
        }

        self.matrix.translate_in_place(dx, dy);
        self.last_point = position;
        surface.apply_transform(&self.matrix);
        self.events.push(GestureEvent::Drag {
            matrix: self.matrix,
        });
    }

    /// Pointer up: commit if the tolerance was exceeded, otherwise treat
    /// the gesture as a pure click and leave the geometry untouched.
    ///
    /// Returns the committed projected-space delta, or `None` for a click.
    pub fn on_pointer_up(
        &mut self,
        position: Point,
        shape: &mut Shape,
        map: &mut MapView,
        surface: &mut dyn RenderSurface,
    ) -> Option<Vec2> {
        let committed = match self.state {
            DragState::Idle => None,
            DragState::Armed => {
                // No movement: a click. Do not suppress the synthetic click
                // that follows, do not touch geometry.
                None
            }
            DragState::Dragging => {
                let delta = self.matrix.translate_offset();
                // Zoom is sampled once, here: dragging across a mid-gesture
                // zoom change is out of contract.
                shape.translate_projected(delta, map);
                surface.clear_transform();
                surface.redraw();

                let distance = self.drag_start_point.distance(position);
                self.events.push(GestureEvent::DragEnd { distance });
                self.click_suppressed = true;
                log::debug!("drag committed, delta {delta:?}");
                Some(delta)
            }
        };

        if self.state != DragState::Idle {
            if self.map_dragging_was_enabled {
                map.enable_dragging();
            }
            self.state = DragState::Idle;
            self.matrix = Matrix::IDENTITY;
        }
        committed
    }
}
