use crate::paint::Color;
use crate::raster::{
    FilterMode, QUAD_INDICES, RasterError, Rasterizer, RenderTarget, Texture, TextureDesc, Vertex,
};

/// Render-target texture.
///
/// A copyable handle: the texture belongs to the rasterizer and lives until
/// [`release`](Self::release). Using a released canvas draws nothing.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Canvas {
    texture: Texture,
    min_filter: FilterMode,
    mag_filter: FilterMode,
}

impl Canvas {
    /// Creates a `width × height` render-target texture.
    pub fn create<R: Rasterizer + ?Sized>(
        r: &mut R,
        width: u32,
        height: u32,
    ) -> Result<Self, RasterError> {
        let handle = r.create_texture(TextureDesc::render_target(width, height))?;
        Ok(Self {
            texture: Texture::new(handle, width, height),
            min_filter: FilterMode::Linear,
            mag_filter: FilterMode::Linear,
        })
    }

    #[inline]
    pub fn texture(&self) -> Texture {
        self.texture
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.texture.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.texture.height
    }

    #[inline]
    pub fn target(&self) -> RenderTarget {
        RenderTarget::Texture(self.texture.handle)
    }

    #[inline]
    pub fn filter(&self) -> (FilterMode, FilterMode) {
        (self.min_filter, self.mag_filter)
    }

    pub fn set_filter<R: Rasterizer + ?Sized>(
        &mut self,
        r: &mut R,
        min: FilterMode,
        mag: FilterMode,
    ) {
        self.min_filter = min;
        self.mag_filter = mag;
        r.set_texture_filter(self.texture.handle, min, mag);
    }

    /// Releases the texture. Releasing twice is harmless.
    #[inline]
    pub fn release<R: Rasterizer + ?Sized>(&self, r: &mut R) {
        r.release_texture(self.texture.handle);
    }

    /// Draws the whole canvas 1:1 onto the currently bound target at the origin.
    pub(crate) fn blit<R: Rasterizer + ?Sized>(&self, r: &mut R, color: Color) {
        let (w, h) = (self.width() as f32, self.height() as f32);
        let quad = [
            Vertex::new(0.0, 0.0, 0.0, 0.0, color),
            Vertex::new(w, 0.0, 1.0, 0.0, color),
            Vertex::new(w, h, 1.0, 1.0, color),
            Vertex::new(0.0, h, 0.0, 1.0, color),
        ];
        r.draw_triangles(Some(self.texture.handle), &quad, &QUAD_INDICES);
    }
}
