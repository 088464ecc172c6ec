use crate::paint::Color;
use crate::raster::{FilterMode, RasterError, Rasterizer, Texture, TextureDesc};

/// Tightly packed RGBA8 pixels, rows top to bottom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl ImageData {
    /// Transparent black pixels.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize * 4],
        }
    }

    /// Wraps decoded pixels. The length must be `width × height × 4`.
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, RasterError> {
        let expected = width as usize * height as usize * 4;
        if pixels.len() != expected {
            return Err(RasterError::PixelDataMismatch { expected, actual: pixels.len() });
        }
        Ok(Self { width, height, pixels })
    }

    pub fn filled(width: u32, height: u32, color: Color) -> Self {
        let px = to_rgba8(color);
        let mut data = Self::new(width, height);
        for chunk in data.pixels.chunks_exact_mut(4) {
            chunk.copy_from_slice(&px);
        }
        data
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    #[inline]
    fn offset(&self, x: u32, y: u32) -> Option<usize> {
        (x < self.width && y < self.height)
            .then(|| (y as usize * self.width as usize + x as usize) * 4)
    }

    pub fn get_pixel(&self, x: u32, y: u32) -> Option<Color> {
        let o = self.offset(x, y)?;
        let p = &self.pixels[o..o + 4];
        Some(Color::from_u8(p[0], p[1], p[2], p[3]))
    }

    /// Out-of-bounds writes are ignored and return `false`.
    pub fn set_pixel(&mut self, x: u32, y: u32, color: Color) -> bool {
        let Some(o) = self.offset(x, y) else {
            return false;
        };
        self.pixels[o..o + 4].copy_from_slice(&to_rgba8(color));
        true
    }
}

fn to_rgba8(c: Color) -> [u8; 4] {
    let c = c.clamped();
    [c.r, c.g, c.b, c.a].map(|v| (v * 255.0).round() as u8)
}

/// Sampled texture created from [`ImageData`].
///
/// Copyable handle; the texture lives until [`release`](Self::release).
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Image {
    texture: Texture,
    min_filter: FilterMode,
    mag_filter: FilterMode,
}

impl Image {
    pub fn create<R: Rasterizer + ?Sized>(
        r: &mut R,
        data: &ImageData,
    ) -> Result<Self, RasterError> {
        let handle = r.create_texture(TextureDesc::sampled(data.width, data.height))?;
        if let Err(e) = r.write_texture(handle, &data.pixels) {
            r.release_texture(handle);
            return Err(e);
        }
        Ok(Self {
            texture: Texture::new(handle, data.width, data.height),
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

    /// Re-uploads the whole image. Sizes must match.
    pub fn replace_pixels<R: Rasterizer + ?Sized>(
        &self,
        r: &mut R,
        data: &ImageData,
    ) -> Result<(), RasterError> {
        if (data.width, data.height) != (self.width(), self.height()) {
            return Err(RasterError::InvalidSize { width: data.width, height: data.height });
        }
        r.write_texture(self.texture.handle, &data.pixels)
    }

    #[inline]
    pub fn release<R: Rasterizer + ?Sized>(&self, r: &mut R) {
        r.release_texture(self.texture.handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::{RasterCmd, RecordingRasterizer};

    // ── pixels ────────────────────────────────────────────────────────────

    #[test]
    fn from_pixels_checks_length() {
        assert!(ImageData::from_pixels(2, 2, vec![0; 16]).is_ok());
        assert_eq!(
            ImageData::from_pixels(2, 2, vec![0; 15]),
            Err(RasterError::PixelDataMismatch { expected: 16, actual: 15 })
        );
    }

    #[test]
    fn pixel_access() {
        let mut d = ImageData::new(3, 2);
        assert!(d.set_pixel(2, 1, Color::white()));
        assert!(!d.set_pixel(3, 0, Color::white()));
        assert_eq!(d.get_pixel(2, 1), Some(Color::white()));
        assert_eq!(d.get_pixel(0, 0), Some(Color::transparent()));
        assert_eq!(d.get_pixel(0, 2), None);
        assert_eq!(&d.pixels()[20..24], &[255, 255, 255, 255]);
    }

    #[test]
    fn filled_writes_every_pixel() {
        let d = ImageData::filled(4, 4, Color::rgb(1.0, 0.0, 0.0));
        assert!(d.pixels().chunks_exact(4).all(|p| p == [255, 0, 0, 255]));
    }

    // ── textures ──────────────────────────────────────────────────────────

    #[test]
    fn create_uploads_pixels() {
        let mut r = RecordingRasterizer::new(64, 64);
        let img = Image::create(&mut r, &ImageData::new(8, 4)).unwrap();
        assert_eq!((img.width(), img.height()), (8, 4));
        assert!(r.is_live(img.texture().handle));
        assert!(matches!(r.commands()[1], RasterCmd::WriteTexture { bytes: 128, .. }));
    }

    #[test]
    fn failed_create_leaks_nothing() {
        let mut r = RecordingRasterizer::new(64, 64).with_max_texture_size(4);
        assert!(Image::create(&mut r, &ImageData::new(8, 8)).is_err());
        assert_eq!(r.live_texture_count(), 0);
    }

    #[test]
    fn replace_requires_same_size() {
        let mut r = RecordingRasterizer::new(64, 64);
        let img = Image::create(&mut r, &ImageData::new(2, 2)).unwrap();
        assert!(img.replace_pixels(&mut r, &ImageData::new(2, 2)).is_ok());
        assert!(img.replace_pixels(&mut r, &ImageData::new(3, 2)).is_err());
        img.release(&mut r);
        assert_eq!(r.live_texture_count(), 0);
    }
}
