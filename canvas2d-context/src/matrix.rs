//! 2D affine matrix exchanged through the transform API.

/// A 2D affine transformation.
///
/// Points map as:
/// ```text
/// x' = m11 * x + m21 * y + dx
/// y' = m12 * x + m22 * y + dy
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix2D {
    pub m11: f32,
    pub m12: f32,
    pub m21: f32,
    pub m22: f32,
    pub dx: f32,
    pub dy: f32,
}

impl Matrix2D {
    /// Create a matrix from its six coefficients.
    pub fn new(m11: f32, m12: f32, m21: f32, m22: f32, dx: f32, dy: f32) -> Self {
        Self {
            m11,
            m12,
            m21,
            m22,
            dx,
            dy,
        }
    }

    /// Create an identity matrix.
    pub fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, 0.0, 0.0)
    }

    pub fn is_finite(&self) -> bool {
        [self.m11, self.m12, self.m21, self.m22, self.dx, self.dy]
            .iter()
            .all(|v| v.is_finite())
    }

    /// Map a point through the matrix.
    pub fn map(&self, x: f32, y: f32) -> (f32, f32) {
        (
            self.m11 * x + self.m21 * y + self.dx,
            self.m12 * x + self.m22 * y + self.dy,
        )
    }
}

impl Default for Matrix2D {
    fn default() -> Self {
        Self::identity()
    }
}

impl From<tiny_skia::Transform> for Matrix2D {
    fn from(t: tiny_skia::Transform) -> Self {
        Matrix2D::new(t.sx, t.ky, t.kx, t.sy, t.tx, t.ty)
    }
}

impl From<Matrix2D> for tiny_skia::Transform {
    fn from(m: Matrix2D) -> Self {
        tiny_skia::Transform::from_row(m.m11, m.m12, m.m21, m.m22, m.dx, m.dy)
    }
}
