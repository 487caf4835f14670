//! 2D affine transform matrix for live gesture previews.
//!
//! Stored as six scalars `[a, b, c, d, tx, ty]` in SVG order:
//!
//! ```text
//! x' = a*x + c*y + tx
//! y' = b*x + d*y + ty
//! ```
//!
//! Matrices are value types. Builders return fresh matrices; the only
//! in-place operation is the crate-private translation accumulator used by
//! the drag gesture, which is never observable mid-update from outside.

use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

/// A 2D affine transform.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Matrix([f64; 6]);

impl Default for Matrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Matrix {
    /// The identity transform, the required idle/reset state of every gesture.
    pub const IDENTITY: Matrix = Matrix([1.0, 0.0, 0.0, 1.0, 0.0, 0.0]);

    /// Create a matrix from its six coefficients.
    pub fn new(a: f64, b: f64, c: f64, d: f64, tx: f64, ty: f64) -> Self {
        Self([a, b, c, d, tx, ty])
    }

    /// A pure translation.
    pub fn translation(dx: f64, dy: f64) -> Self {
        Self([1.0, 0.0, 0.0, 1.0, dx, dy])
    }

    /// A scale about the coordinate origin.
    pub fn scaling(sx: f64, sy: f64) -> Self {
        Self([sx, 0.0, 0.0, sy, 0.0, 0.0])
    }

    /// A rotation about the coordinate origin by `angle` radians.
    ///
    /// The angle follows `atan2` in the same frame as the points it is
    /// applied to: in the y-down projected space a positive angle turns
    /// clockwise on screen, which is exactly the sense a pointer-derived
    /// `atan2` angle has there. See [`Matrix::flipped`] for converting to
    /// the y-up mathematical convention.
    pub fn rotation(angle: f64) -> Self {
        let (sin, cos) = angle.sin_cos();
        Self([cos, sin, -sin, cos, 0.0, 0.0])
    }

    /// The six coefficients `[a, b, c, d, tx, ty]`.
    pub fn coeffs(&self) -> [f64; 6] {
        self.0
    }

    /// Whether this is exactly the identity matrix.
    pub fn is_identity(&self) -> bool {
        self.0 == Self::IDENTITY.0
    }

    /// The translation terms `(tx, ty)`.
    pub fn translate_offset(&self) -> Vec2 {
        Vec2::new(self.0[4], self.0[5])
    }

    /// Apply the transform to a point.
    pub fn transform(&self, p: Point) -> Point {
        let [a, b, c, d, tx, ty] = self.0;
        Point::new(a * p.x + c * p.y + tx, b * p.x + d * p.y + ty)
    }

    /// Apply the exact inverse transform to a point.
    ///
    /// Returns `None` for degenerate matrices (zero determinant, e.g. a
    /// zero scale factor), for which no inverse exists.
    pub fn untransform(&self, p: Point) -> Option<Point> {
        let [a, b, c, d, tx, ty] = self.0;
        let det = a * d - b * c;
        if det.abs() < f64::EPSILON {
            return None;
        }
        let x = p.x - tx;
        let y = p.y - ty;
        Some(Point::new((d * x - c * y) / det, (a * y - b * x) / det))
    }

    /// Compose with another matrix: `self ∘ other`.
    ///
    /// The returned transform applies `other` first, then `self`.
    /// Composition is associative but not commutative.
    pub fn compose(&self, other: &Matrix) -> Matrix {
        let [a1, b1, c1, d1, tx1, ty1] = self.0;
        let [a2, b2, c2, d2, tx2, ty2] = other.0;
        Matrix([
            a1 * a2 + c1 * b2,
            b1 * a2 + d1 * b2,
            a1 * c2 + c1 * d2,
            b1 * c2 + d1 * d2,
            a1 * tx2 + c1 * ty2 + tx1,
            b1 * tx2 + d1 * ty2 + ty1,
        ])
    }

    /// Compose a translation onto this matrix (applied before `self`).
    pub fn translated(&self, dx: f64, dy: f64) -> Matrix {
        self.compose(&Matrix::translation(dx, dy))
    }

    /// Compose a scale about `origin` onto this matrix.
    ///
    /// Built as translate-to-origin, scale, translate-back: three composed
    /// matrices, so the algebra stays uniform with [`Matrix::rotated`].
    pub fn scaled(&self, sx: f64, sy: f64, origin: Point) -> Matrix {
        self.compose(&Matrix::translation(origin.x, origin.y))
            .compose(&Matrix::scaling(sx, sy))
            .compose(&Matrix::translation(-origin.x, -origin.y))
    }

    /// Compose a rotation by `angle` radians about `origin` onto this matrix.
    pub fn rotated(&self, angle: f64, origin: Point) -> Matrix {
        self.compose(&Matrix::translation(origin.x, origin.y))
            .compose(&Matrix::rotation(angle))
            .compose(&Matrix::translation(-origin.x, -origin.y))
    }

    /// Negate the two off-diagonal terms.
    ///
    /// This converts the rotational part between the y-up mathematical
    /// convention and the y-down projected space: for a pure rotation,
    /// `Matrix::rotation(angle).flipped() == Matrix::rotation(-angle)`.
    /// Kept as an explicit operation so the sign convention is visible and
    /// testable in isolation instead of being baked into the rotation math.
    pub fn flipped(&self) -> Matrix {
        let [a, b, c, d, tx, ty] = self.0;
        Matrix([a, -b, -c, d, tx, ty])
    }

    /// Accumulate a translation in place. Drag-gesture fast path; callers
    /// outside the crate only ever observe the finished matrix.
    pub(crate) fn translate_in_place(&mut self, dx: f64, dy: f64) {
        self.0[4] += dx;
        self.0[5] += dy;
    }
}
