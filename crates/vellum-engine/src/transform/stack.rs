use crate::coords::Vec2;

use super::AffineMatrix;

/// Current transform plus a save/restore stack.
///
/// Every modifier composes on the local side of the running matrix, so the
/// most recently issued operation is the first one applied to drawn geometry
/// (`translate` then `rotate` rotates the shape about the translated origin).
#[derive(Debug, Clone, Default)]
pub struct TransformStack {
    current: AffineMatrix,
    saved: Vec<AffineMatrix>,
}

impl TransformStack {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the active matrix.
    #[inline]
    pub fn current(&self) -> AffineMatrix {
        self.current
    }

    /// Saves a copy of the current matrix.
    #[inline]
    pub fn push(&mut self) {
        self.saved.push(self.current);
    }

    /// Restores the most recently pushed matrix.
    ///
    /// Returns `false` on underflow, in which case the current matrix is left unchanged.
    #[inline]
    pub fn pop(&mut self) -> bool {
        match self.saved.pop() {
            Some(m) => {
                self.current = m;
                true
            }
            None => false,
        }
    }

    /// Number of unmatched `push()` calls.
    #[inline]
    pub fn stack_depth(&self) -> usize {
        self.saved.len()
    }

    #[inline]
    pub fn translate(&mut self, x: f32, y: f32) {
        self.current *= AffineMatrix::translation(x, y);
    }

    #[inline]
    pub fn rotate(&mut self, radians: f32) {
        self.current *= AffineMatrix::rotation(radians);
    }

    #[inline]
    pub fn scale(&mut self, sx: f32, sy: f32) {
        self.current *= AffineMatrix::scaling(sx, sy);
    }

    /// Uniform scale (`sy = sx`).
    #[inline]
    pub fn scale_uniform(&mut self, s: f32) {
        self.scale(s, s);
    }

    #[inline]
    pub fn shear(&mut self, kx: f32, ky: f32) {
        self.current *= AffineMatrix::shearing(kx, ky);
    }

    /// Resets the current matrix to identity. The saved stack is untouched.
    #[inline]
    pub fn reset(&mut self) {
        self.current = AffineMatrix::IDENTITY;
    }

    /// Composes `m` into the current matrix.
    #[inline]
    pub fn apply(&mut self, m: AffineMatrix) {
        self.current *= m;
    }

    /// Overwrites the current matrix.
    #[inline]
    pub fn replace(&mut self, m: AffineMatrix) {
        self.current = m;
    }

    #[inline]
    pub fn transform_point(&self, x: f32, y: f32) -> Vec2 {
        self.current.transform_point(Vec2::new(x, y))
    }

    /// Maps a device-space point back to local space.
    ///
    /// A singular current matrix maps through identity.
    #[inline]
    pub fn inverse_transform_point(&self, x: f32, y: f32) -> Vec2 {
        self.current.inverse().transform_point(Vec2::new(x, y))
    }
}
