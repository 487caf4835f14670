//! Error taxonomy for the transform engine.
//!
//! Only programmer errors surface as `Err`: stray pointer events for an
//! inactive gesture are silently ignored, and degenerate geometry during a
//! gesture short-circuits to a no-op frame instead of failing.

use thiserror::Error;

/// Errors from gesture setup and programmatic transforms.
#[derive(Debug, Error)]
pub enum TransformError {
    /// The shape has no coordinates, so no bounding geometry or handles can
    /// be derived from it.
    #[error("shape has no coordinates to transform")]
    EmptyGeometry,

    /// A transform operation was invoked while the gesture is disabled.
    #[error("transform gesture is not enabled")]
    NotEnabled,

    /// The requested matrix is not invertible.
    #[error("matrix is degenerate (zero scale factor)")]
    DegenerateMatrix,
}

/// Result alias for transform operations.
pub type TransformResult<T> = Result<T, TransformError>;
