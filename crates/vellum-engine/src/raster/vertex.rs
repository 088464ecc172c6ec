use bytemuck::{Pod, Zeroable};

use crate::coords::Vec2;
use crate::paint::Color;
use crate::transform::AffineMatrix;

/// Index stamp for one quad whose corners are stored in order
/// top-left, top-right, bottom-right, bottom-left.
pub const QUAD_INDICES: [u32; 6] = [0, 1, 2, 0, 2, 3];

/// Interchange vertex between every geometry producer and the rasterizer.
///
/// Layout (32 bytes):
///
///  offset  0  x, y        position in target pixels (or local space before transform)
///  offset  8  r, g, b, a  straight-alpha color in [0, 1]
///  offset 24  u, v        normalized texture coordinates
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub x: f32,
    pub y: f32,
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
    pub u: f32,
    pub v: f32,
}

impl Default for Vertex {
    /// White vertex at the origin with zero texture coordinates.
    fn default() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0, Color::white())
    }
}

impl Vertex {
    #[inline]
    pub const fn new(x: f32, y: f32, u: f32, v: f32, color: Color) -> Self {
        Self {
            x,
            y,
            r: color.r,
            g: color.g,
            b: color.b,
            a: color.a,
            u,
            v,
        }
    }

    /// Untextured vertex.
    #[inline]
    pub const fn colored(p: Vec2, color: Color) -> Self {
        Self::new(p.x, p.y, 0.0, 0.0, color)
    }

    #[inline]
    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    #[inline]
    pub fn set_position(&mut self, p: Vec2) {
        self.x = p.x;
        self.y = p.y;
    }

    #[inline]
    pub fn color(&self) -> Color {
        Color::new(self.r, self.g, self.b, self.a)
    }

    #[inline]
    pub fn set_color(&mut self, c: Color) {
        self.r = c.r;
        self.g = c.g;
        self.b = c.b;
        self.a = c.a;
    }

    /// Returns a copy with the position mapped through `m`.
    #[inline]
    pub fn transformed(self, m: &AffineMatrix) -> Self {
        let p = m.transform_point(self.position());
        Self { x: p.x, y: p.y, ..self }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_is_tightly_packed() {
        assert_eq!(std::mem::size_of::<Vertex>(), 32);
        let v = Vertex::new(1.0, 2.0, 0.25, 0.75, Color::new(0.1, 0.2, 0.3, 0.4));
        let floats: &[f32] = bytemuck::cast_slice(std::slice::from_ref(&v));
        assert_eq!(floats, &[1.0, 2.0, 0.1, 0.2, 0.3, 0.4, 0.25, 0.75]);
    }

    #[test]
    fn transformed_keeps_color_and_uv() {
        let v = Vertex::new(1.0, 1.0, 0.5, 0.5, Color::black());
        let t = v.transformed(&AffineMatrix::translation(2.0, 3.0));
        assert_eq!((t.x, t.y), (3.0, 4.0));
        assert_eq!((t.u, t.v), (0.5, 0.5));
        assert_eq!(t.color(), Color::black());
    }
}
