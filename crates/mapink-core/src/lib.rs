//! MapInk Core Library
//!
//! Renderer-agnostic drag/rotate/scale engine for vector shapes on a tiled
//! web-mercator map. Shapes live in logical coordinates; gestures preview
//! through an affine matrix in projected space and fold it into the
//! coordinates exactly once on commit.

pub mod controller;
pub mod drag;
pub mod error;
pub mod events;
pub mod handles;
pub mod input;
pub mod map;
pub mod matrix;
pub mod projection;
pub mod shapes;
pub mod transform;

pub use controller::{ActiveGesture, PathController, SHAPE_HIT_TOLERANCE};
pub use drag::{DragHandler, DragState, TAP_TOLERANCE};
pub use error::{TransformError, TransformResult};
pub use events::GestureEvent;
pub use handles::{BoundingRing, Handle, HandleRole, HANDLE_HIT_TOLERANCE};
pub use input::PointerEvent;
pub use map::{MapView, RecordingSurface, RenderSurface};
pub use matrix::Matrix;
pub use projection::{point_on_line, LatLng, LatLngBounds};
pub use shapes::{Circle, Polygon, Polyline, Shape};
pub use transform::{TransformHandler, TransformOptions, TransformState};
