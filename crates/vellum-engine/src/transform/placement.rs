use super::AffineMatrix;

/// Per-draw placement of a drawable: position, rotation, scale, origin, shear.
///
/// Defaults to the identity placement (unit scale, everything else zero).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Placement {
    pub x: f32,
    pub y: f32,
    /// Radians.
    pub angle: f32,
    pub sx: f32,
    pub sy: f32,
    pub ox: f32,
    pub oy: f32,
    pub kx: f32,
    pub ky: f32,
}

impl Default for Placement {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            angle: 0.0,
            sx: 1.0,
            sy: 1.0,
            ox: 0.0,
            oy: 0.0,
            kx: 0.0,
            ky: 0.0,
        }
    }
}

impl Placement {
    #[inline]
    pub fn at(x: f32, y: f32) -> Self {
        Self { x, y, ..Self::default() }
    }

    #[inline]
    pub fn rotated(self, angle: f32) -> Self {
        Self { angle, ..self }
    }

    #[inline]
    pub fn scaled(self, sx: f32, sy: f32) -> Self {
        Self { sx, sy, ..self }
    }

    #[inline]
    pub fn with_origin(self, ox: f32, oy: f32) -> Self {
        Self { ox, oy, ..self }
    }

    #[inline]
    pub fn sheared(self, kx: f32, ky: f32) -> Self {
        Self { kx, ky, ..self }
    }

    #[inline]
    pub fn matrix(&self) -> AffineMatrix {
        AffineMatrix::from_transform(
            self.x, self.y, self.angle, self.sx, self.sy, self.ox, self.oy, self.kx, self.ky,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::Vec2;

    #[test]
    fn default_is_identity() {
        assert!(Placement::default().matrix().is_identity());
    }

    #[test]
    fn builder_composes() {
        let m = Placement::at(10.0, 5.0).scaled(2.0, 2.0).with_origin(1.0, 1.0).matrix();
        assert_eq!(m.transform_point(Vec2::new(1.0, 1.0)), Vec2::new(10.0, 5.0));
        assert_eq!(m.transform_point(Vec2::new(2.0, 1.0)), Vec2::new(12.0, 5.0));
    }
}
