use crate::coords::ScissorRect;
use crate::paint::{BlendMode, Color};

use super::{RasterError, Vertex};

/// Opaque handle to a texture owned by a [`Rasterizer`].
///
/// Handles are never reused by a rasterizer, so a stale handle refers to
/// nothing rather than to an unrelated texture.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct TextureHandle(pub u64);

/// A texture handle paired with its pixel size.
///
/// UV computations need the size, so drawables carry this instead of the bare handle.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Texture {
    pub handle: TextureHandle,
    pub width: u32,
    pub height: u32,
}

impl Texture {
    #[inline]
    pub const fn new(handle: TextureHandle, width: u32, height: u32) -> Self {
        Self { handle, width, height }
    }
}

/// Pixel storage of a texture.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum PixelFormat {
    /// 8 bits per channel RGBA.
    #[default]
    Rgba8,
    /// 16-bit float per channel RGBA.
    Rgba16Float,
}

impl PixelFormat {
    #[inline]
    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            PixelFormat::Rgba8 => 4,
            PixelFormat::Rgba16Float => 8,
        }
    }
}

/// Texture sampling filter.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum FilterMode {
    #[default]
    Linear,
    Nearest,
}

/// Parameters for [`Rasterizer::create_texture`].
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct TextureDesc {
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
    /// Whether the texture may be bound with [`Rasterizer::bind_render_target`].
    pub render_target: bool,
}

impl TextureDesc {
    #[inline]
    pub const fn sampled(width: u32, height: u32) -> Self {
        Self { width, height, format: PixelFormat::Rgba8, render_target: false }
    }

    #[inline]
    pub const fn render_target(width: u32, height: u32) -> Self {
        Self { width, height, format: PixelFormat::Rgba8, render_target: true }
    }
}

/// Where draws land.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum RenderTarget {
    #[default]
    Screen,
    Texture(TextureHandle),
}

/// Native triangle rasterizer driven by the core.
///
/// Calls take effect in the order issued. State set through this trait
/// (target, blend mode, scissor) persists until changed.
pub trait Rasterizer {
    /// Allocates a texture. Contents are undefined until written or cleared.
    fn create_texture(&mut self, desc: TextureDesc) -> Result<TextureHandle, RasterError>;

    /// Uploads tightly packed pixels covering the whole texture.
    fn write_texture(&mut self, texture: TextureHandle, pixels: &[u8]) -> Result<(), RasterError>;

    /// Frees a texture. Unknown or already released handles are ignored.
    fn release_texture(&mut self, texture: TextureHandle);

    fn bind_render_target(&mut self, target: RenderTarget);

    fn set_blend_mode(&mut self, mode: BlendMode);

    /// `None` disables clipping.
    fn set_scissor(&mut self, scissor: Option<ScissorRect>);

    fn set_texture_filter(&mut self, texture: TextureHandle, min: FilterMode, mag: FilterMode);

    /// Color multiplied into every sample of `texture`.
    fn set_texture_tint(&mut self, texture: TextureHandle, tint: Color);

    /// Fills the bound target with `color`, ignoring blend mode and scissor.
    fn clear(&mut self, color: Color);

    /// Rasterizes an indexed triangle list into the bound target.
    ///
    /// `texture = None` samples opaque white.
    fn draw_triangles(
        &mut self,
        texture: Option<TextureHandle>,
        vertices: &[Vertex],
        indices: &[u32],
    );

    /// Pixel size of `target`, if known.
    fn target_size(&self, target: RenderTarget) -> Option<(u32, u32)>;
}
