//! Gesture notifications observable by the host.
//!
//! Gestures queue events as they process pointer input; the host drains
//! them with `take_events()` after each event. Every phase carries the
//! matrix/angle/scale for the frame it was emitted in.

use crate::matrix::Matrix;
use kurbo::Vec2;

/// A notification emitted by a drag or transform gesture.
#[derive(Debug, Clone, PartialEq)]
pub enum GestureEvent {
    /// A drag passed the movement tolerance and became a real drag.
    DragStart,
    /// Per-frame drag preview update with the accumulated matrix.
    Drag { matrix: Matrix },
    /// The drag committed; `distance` is the projected-space length of the
    /// whole gesture.
    DragEnd { distance: f64 },
    /// A rotate or scale gesture started on a handle.
    TransformStart,
    /// Per-frame rotation update (radians, relative to gesture start).
    Rotate { rotation: f64 },
    /// The rotate gesture released with this final angle.
    RotateEnd { rotation: f64 },
    /// Per-frame scale update (per-axis ratios relative to gesture start).
    Scale { scale: Vec2 },
    /// The scale gesture released with this final ratio.
    ScaleEnd { scale: Vec2 },
    /// A gesture committed into logical coordinates. Carries the projected
    /// matrix that was folded in, exactly once, at the reference zoom.
    Transformed {
        matrix: Matrix,
        rotation: f64,
        scale: Vec2,
    },
}
