//! Normalized pointer events supplied by the host event source.
//!
//! Mouse, touch and pointer variants are expected to be normalized by the
//! host into a single down/move/up stream carrying projected-space
//! positions; `is_touch` keeps the tap-versus-drag tolerance available to
//! the drag gesture.

use kurbo::Point;
use serde::{Deserialize, Serialize};

/// A normalized pointer event in projected (layer) coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PointerEvent {
    Down { position: Point, is_touch: bool },
    Move { position: Point, is_touch: bool },
    Up { position: Point },
}

impl PointerEvent {
    /// The event's projected-space position.
    pub fn position(&self) -> Point {
        match *self {
            PointerEvent::Down { position, .. }
            | PointerEvent::Move { position, .. }
            | PointerEvent::Up { position } => position,
        }
    }
}
