use crate::coords::{Rect, Vec2};
use crate::raster::Texture;

/// A rectangular region of a texture, in source pixels.
///
/// Carries the pixel size of the texture it refers to so normalized UVs can be
/// derived without the texture at hand.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Quad {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    pub texture_width: f32,
    pub texture_height: f32,
}

impl Quad {
    #[inline]
    pub const fn new(
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        texture_width: f32,
        texture_height: f32,
    ) -> Self {
        Self { x, y, w, h, texture_width, texture_height }
    }

    /// The whole of `texture`.
    #[inline]
    pub fn full(texture: &Texture) -> Self {
        let (w, h) = (texture.width as f32, texture.height as f32);
        Self::new(0.0, 0.0, w, h, w, h)
    }

    /// Region `(x, y, w, h)` of `texture`.
    #[inline]
    pub fn of(texture: &Texture, x: f32, y: f32, w: f32, h: f32) -> Self {
        Self::new(x, y, w, h, texture.width as f32, texture.height as f32)
    }

    #[inline]
    pub fn viewport(&self) -> Rect {
        Rect::new(self.x, self.y, self.w, self.h)
    }

    #[inline]
    pub fn set_viewport(&mut self, x: f32, y: f32, w: f32, h: f32) {
        self.x = x;
        self.y = y;
        self.w = w;
        self.h = h;
    }

    #[inline]
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.w, self.h)
    }

    /// Local corners `(0,0) (w,0) (w,h) (0,h)`.
    #[inline]
    pub fn corners(&self) -> [Vec2; 4] {
        [
            Vec2::new(0.0, 0.0),
            Vec2::new(self.w, 0.0),
            Vec2::new(self.w, self.h),
            Vec2::new(0.0, self.h),
        ]
    }

    /// Normalized texture coordinates in corner order. A zero-sized texture maps to 0.
    pub fn uvs(&self) -> [[f32; 2]; 4] {
        let inv_w = if self.texture_width > 0.0 { 1.0 / self.texture_width } else { 0.0 };
        let inv_h = if self.texture_height > 0.0 { 1.0 / self.texture_height } else { 0.0 };
        let (u0, v0) = (self.x * inv_w, self.y * inv_h);
        let (u1, v1) = ((self.x + self.w) * inv_w, (self.y + self.h) * inv_h);
        [[u0, v0], [u1, v0], [u1, v1], [u0, v1]]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::TextureHandle;

    #[test]
    fn uvs_are_normalized() {
        let q = Quad::new(16.0, 0.0, 16.0, 32.0, 64.0, 32.0);
        assert_eq!(q.uvs(), [[0.25, 0.0], [0.5, 0.0], [0.5, 1.0], [0.25, 1.0]]);
    }

    #[test]
    fn full_covers_texture() {
        let t = Texture::new(TextureHandle(1), 8, 4);
        let q = Quad::full(&t);
        assert_eq!(q.uvs()[2], [1.0, 1.0]);
        assert_eq!(q.corners()[2], Vec2::new(8.0, 4.0));
    }

    #[test]
    fn zero_texture_size_does_not_divide_by_zero() {
        let q = Quad::new(1.0, 1.0, 2.0, 2.0, 0.0, 0.0);
        assert!(q.uvs().iter().flatten().all(|c| *c == 0.0));
    }
}
