use core::ops::{Mul, MulAssign};

use crate::coords::Vec2;

/// Determinant magnitude below which a matrix is treated as singular.
const SINGULAR_EPSILON: f64 = 1e-12;

/// 2×3 affine matrix.
///
/// Maps `x' = a·x + c·y + tx`, `y' = b·x + d·y + ty`.
///
/// `lhs * rhs` composes so that `rhs` is applied first: transforming a point by
/// the product equals transforming it by `rhs`, then by `lhs`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct AffineMatrix {
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
    pub tx: f32,
    pub ty: f32,
}

impl Default for AffineMatrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl AffineMatrix {
    pub const IDENTITY: AffineMatrix = AffineMatrix {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        tx: 0.0,
        ty: 0.0,
    };

    #[inline]
    pub const fn new(a: f32, b: f32, c: f32, d: f32, tx: f32, ty: f32) -> Self {
        Self { a, b, c, d, tx, ty }
    }

    #[inline]
    pub const fn translation(x: f32, y: f32) -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, x, y)
    }

    #[inline]
    pub fn rotation(radians: f32) -> Self {
        let (s, c) = radians.sin_cos();
        Self::new(c, s, -s, c, 0.0, 0.0)
    }

    #[inline]
    pub const fn scaling(sx: f32, sy: f32) -> Self {
        Self::new(sx, 0.0, 0.0, sy, 0.0, 0.0)
    }

    #[inline]
    pub const fn shearing(kx: f32, ky: f32) -> Self {
        Self::new(1.0, ky, kx, 1.0, 0.0, 0.0)
    }

    /// Placement matrix for a drawable: move by `-origin`, shear, scale, rotate,
    /// then translate to `(x, y)`.
    #[allow(clippy::too_many_arguments)]
    pub fn from_transform(
        x: f32,
        y: f32,
        angle: f32,
        sx: f32,
        sy: f32,
        ox: f32,
        oy: f32,
        kx: f32,
        ky: f32,
    ) -> Self {
        let (s, c) = angle.sin_cos();

        let a = c * sx - ky * s * sy;
        let b = s * sx + ky * c * sy;
        let cc = kx * c * sx - s * sy;
        let d = kx * s * sx + c * sy;

        Self {
            a,
            b,
            c: cc,
            d,
            tx: x - ox * a - oy * cc,
            ty: y - ox * b - oy * d,
        }
    }

    #[inline]
    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    #[inline]
    pub fn determinant(&self) -> f64 {
        self.a as f64 * self.d as f64 - self.b as f64 * self.c as f64
    }

    #[inline]
    pub fn is_singular(&self) -> bool {
        self.determinant().abs() < SINGULAR_EPSILON
    }

    /// Analytic inverse.
    ///
    /// A singular matrix (`|det| < 1e-12`) has no inverse; identity is returned
    /// instead so callers keep producing finite coordinates.
    pub fn inverse(&self) -> AffineMatrix {
        let det = self.determinant();
        if det.abs() < SINGULAR_EPSILON {
            return AffineMatrix::IDENTITY;
        }

        let inv = 1.0 / det;
        let (a, b, c, d) = (self.a as f64, self.b as f64, self.c as f64, self.d as f64);
        let (tx, ty) = (self.tx as f64, self.ty as f64);

        AffineMatrix {
            a: (d * inv) as f32,
            b: (-b * inv) as f32,
            c: (-c * inv) as f32,
            d: (a * inv) as f32,
            tx: ((c * ty - d * tx) * inv) as f32,
            ty: ((b * tx - a * ty) * inv) as f32,
        }
    }

    #[inline]
    pub fn transform_point(&self, p: Vec2) -> Vec2 {
        Vec2::new(
            self.a * p.x + self.c * p.y + self.tx,
            self.b * p.x + self.d * p.y + self.ty,
        )
    }

    /// Applies only the linear part (no translation).
    #[inline]
    pub fn transform_vector(&self, v: Vec2) -> Vec2 {
        Vec2::new(self.a * v.x + self.c * v.y, self.b * v.x + self.d * v.y)
    }

    #[inline]
    pub fn to_array(&self) -> [f32; 6] {
        [self.a, self.b, self.c, self.d, self.tx, self.ty]
    }
}

impl Mul for AffineMatrix {
    type Output = AffineMatrix;

    #[inline]
    fn mul(self, r: AffineMatrix) -> AffineMatrix {
        AffineMatrix {
            a: self.a * r.a + self.c * r.b,
            b: self.b * r.a + self.d * r.b,
            c: self.a * r.c + self.c * r.d,
            d: self.b * r.c + self.d * r.d,
            tx: self.a * r.tx + self.c * r.ty + self.tx,
            ty: self.b * r.tx + self.d * r.ty + self.ty,
        }
    }
}

impl MulAssign for AffineMatrix {
    #[inline]
    fn mul_assign(&mut self, rhs: AffineMatrix) {
        *self = *self * rhs;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::f32::consts::FRAC_PI_2;

    fn approx(a: Vec2, b: Vec2) -> bool {
        (a.x - b.x).abs() < 1e-4 && (a.y - b.y).abs() < 1e-4
    }

    // ── composition ───────────────────────────────────────────────────────

    #[test]
    fn identity_is_neutral() {
        let m = AffineMatrix::new(2.0, 0.5, -1.0, 3.0, 4.0, 5.0);
        assert_eq!(m * AffineMatrix::IDENTITY, m);
        assert_eq!(AffineMatrix::IDENTITY * m, m);
    }

    #[test]
    fn product_applies_right_operand_first() {
        let m = AffineMatrix::translation(10.0, 0.0) * AffineMatrix::rotation(FRAC_PI_2);
        let p = m.transform_point(Vec2::new(1.0, 0.0));
        assert!(approx(p, Vec2::new(10.0, 1.0)));
    }

    #[test]
    fn shear_moves_x_by_y() {
        let p = AffineMatrix::shearing(2.0, 0.0).transform_point(Vec2::new(1.0, 3.0));
        assert!(approx(p, Vec2::new(7.0, 3.0)));
    }

    // ── placement ─────────────────────────────────────────────────────────

    #[test]
    fn from_transform_matches_explicit_composition() {
        let placed = AffineMatrix::from_transform(5.0, 6.0, 0.3, 2.0, 3.0, 1.0, 2.0, 0.0, 0.0);
        let explicit = AffineMatrix::translation(5.0, 6.0)
            * AffineMatrix::rotation(0.3)
            * AffineMatrix::scaling(2.0, 3.0)
            * AffineMatrix::translation(-1.0, -2.0);
        let p = Vec2::new(7.0, -4.0);
        assert!(approx(placed.transform_point(p), explicit.transform_point(p)));
    }

    #[test]
    fn from_transform_origin_lands_on_position() {
        let m = AffineMatrix::from_transform(10.0, 20.0, 1.2, 2.0, 2.0, 8.0, 8.0, 0.0, 0.0);
        assert!(approx(m.transform_point(Vec2::new(8.0, 8.0)), Vec2::new(10.0, 20.0)));
    }

    // ── inverse ───────────────────────────────────────────────────────────

    #[test]
    fn inverse_round_trips_points() {
        let m = AffineMatrix::translation(3.0, -2.0)
            * AffineMatrix::rotation(0.7)
            * AffineMatrix::scaling(2.0, 0.5)
            * AffineMatrix::shearing(0.2, 0.1);
        let p = Vec2::new(12.5, -7.25);
        assert!(approx(m.inverse().transform_point(m.transform_point(p)), p));
    }

    #[test]
    fn singular_inverse_falls_back_to_identity() {
        let m = AffineMatrix::scaling(0.0, 2.0);
        assert!(m.is_singular());
        assert_eq!(m.inverse(), AffineMatrix::IDENTITY);
    }
}
