use std::collections::HashMap;

use crate::coords::ScissorRect;
use crate::paint::{BlendMode, Color};

use super::{FilterMode, RasterError, Rasterizer, RenderTarget, TextureDesc, TextureHandle, Vertex};

/// One recorded [`Rasterizer`] call.
#[derive(Debug, Clone, PartialEq)]
pub enum RasterCmd {
    CreateTexture { handle: TextureHandle, desc: TextureDesc },
    WriteTexture { handle: TextureHandle, bytes: usize },
    ReleaseTexture(TextureHandle),
    BindTarget(RenderTarget),
    SetBlendMode(BlendMode),
    SetScissor(Option<ScissorRect>),
    SetFilter { handle: TextureHandle, min: FilterMode, mag: FilterMode },
    SetTint { handle: TextureHandle, tint: Color },
    Clear { target: RenderTarget, color: Color },
    Draw(RecordedDraw),
}

/// A recorded draw call together with the state it was issued under.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedDraw {
    pub target: RenderTarget,
    pub blend: BlendMode,
    pub scissor: Option<ScissorRect>,
    pub texture: Option<TextureHandle>,
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl RecordedDraw {
    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Rasterizer that records calls instead of drawing.
///
/// Keeps the same bookkeeping a real backend would (live textures, bound
/// target, blend mode, scissor) so call sequences can be asserted on exactly.
#[derive(Debug)]
pub struct RecordingRasterizer {
    cmds: Vec<RasterCmd>,
    textures: HashMap<TextureHandle, TextureDesc>,
    next_handle: u64,
    screen: (u32, u32),
    max_texture_size: u32,

    target: RenderTarget,
    blend: BlendMode,
    scissor: Option<ScissorRect>,
}

impl RecordingRasterizer {
    pub fn new(screen_width: u32, screen_height: u32) -> Self {
        Self {
            cmds: Vec::new(),
            textures: HashMap::new(),
            next_handle: 1,
            screen: (screen_width, screen_height),
            max_texture_size: 8192,
            target: RenderTarget::Screen,
            blend: BlendMode::Alpha,
            scissor: None,
        }
    }

    /// Limits the largest texture dimension accepted by `create_texture`.
    pub fn with_max_texture_size(mut self, max: u32) -> Self {
        self.max_texture_size = max;
        self
    }

    #[inline]
    pub fn commands(&self) -> &[RasterCmd] {
        &self.cmds
    }

    /// Returns and clears the recorded commands. Texture bookkeeping is kept.
    pub fn take_commands(&mut self) -> Vec<RasterCmd> {
        std::mem::take(&mut self.cmds)
    }

    /// Iterates recorded draw calls in issue order.
    pub fn draws(&self) -> impl Iterator<Item = &RecordedDraw> {
        self.cmds.iter().filter_map(|c| match c {
            RasterCmd::Draw(d) => Some(d),
            _ => None,
        })
    }

    #[inline]
    pub fn draw_count(&self) -> usize {
        self.draws().count()
    }

    #[inline]
    pub fn is_live(&self, handle: TextureHandle) -> bool {
        self.textures.contains_key(&handle)
    }

    #[inline]
    pub fn live_texture_count(&self) -> usize {
        self.textures.len()
    }

    #[inline]
    pub fn bound_target(&self) -> RenderTarget {
        self.target
    }

    #[inline]
    pub fn blend_mode(&self) -> BlendMode {
        self.blend
    }

    #[inline]
    pub fn scissor(&self) -> Option<ScissorRect> {
        self.scissor
    }
}

impl Rasterizer for RecordingRasterizer {
    fn create_texture(&mut self, desc: TextureDesc) -> Result<TextureHandle, RasterError> {
        if desc.width == 0
            || desc.height == 0
            || desc.width > self.max_texture_size
            || desc.height > self.max_texture_size
        {
            return Err(RasterError::InvalidSize { width: desc.width, height: desc.height });
        }

        let handle = TextureHandle(self.next_handle);
        self.next_handle += 1;
        self.textures.insert(handle, desc);
        self.cmds.push(RasterCmd::CreateTexture { handle, desc });
        Ok(handle)
    }

    fn write_texture(&mut self, texture: TextureHandle, pixels: &[u8]) -> Result<(), RasterError> {
        let desc = self
            .textures
            .get(&texture)
            .ok_or(RasterError::UnknownTexture(texture))?;

        let expected = desc.width as usize * desc.height as usize * desc.format.bytes_per_pixel();
        if pixels.len() != expected {
            return Err(RasterError::PixelDataMismatch { expected, actual: pixels.len() });
        }

        self.cmds.push(RasterCmd::WriteTexture { handle: texture, bytes: pixels.len() });
        Ok(())
    }

    fn release_texture(&mut self, texture: TextureHandle) {
        if self.textures.remove(&texture).is_some() {
            if self.target == RenderTarget::Texture(texture) {
                self.target = RenderTarget::Screen;
            }
            self.cmds.push(RasterCmd::ReleaseTexture(texture));
        }
    }

    fn bind_render_target(&mut self, target: RenderTarget) {
        self.target = target;
        self.cmds.push(RasterCmd::BindTarget(target));
    }

    fn set_blend_mode(&mut self, mode: BlendMode) {
        self.blend = mode;
        self.cmds.push(RasterCmd::SetBlendMode(mode));
    }

    fn set_scissor(&mut self, scissor: Option<ScissorRect>) {
        self.scissor = scissor;
        self.cmds.push(RasterCmd::SetScissor(scissor));
    }

    fn set_texture_filter(&mut self, texture: TextureHandle, min: FilterMode, mag: FilterMode) {
        if self.is_live(texture) {
            self.cmds.push(RasterCmd::SetFilter { handle: texture, min, mag });
        }
    }

    fn set_texture_tint(&mut self, texture: TextureHandle, tint: Color) {
        if self.is_live(texture) {
            self.cmds.push(RasterCmd::SetTint { handle: texture, tint });
        }
    }

    fn clear(&mut self, color: Color) {
        self.cmds.push(RasterCmd::Clear { target: self.target, color });
    }

    fn draw_triangles(
        &mut self,
        texture: Option<TextureHandle>,
        vertices: &[Vertex],
        indices: &[u32],
    ) {
        self.cmds.push(RasterCmd::Draw(RecordedDraw {
            target: self.target,
            blend: self.blend,
            scissor: self.scissor,
            texture,
            vertices: vertices.to_vec(),
            indices: indices.to_vec(),
        }));
    }

    fn target_size(&self, target: RenderTarget) -> Option<(u32, u32)> {
        match target {
            RenderTarget::Screen => Some(self.screen),
            RenderTarget::Texture(h) => self.textures.get(&h).map(|d| (d.width, d.height)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_rejects_zero_size() {
        let mut r = RecordingRasterizer::new(100, 100);
        let err = r.create_texture(TextureDesc::sampled(0, 4)).unwrap_err();
        assert_eq!(err, RasterError::InvalidSize { width: 0, height: 4 });
        assert!(r.commands().is_empty());
    }

    #[test]
    fn write_checks_length() {
        let mut r = RecordingRasterizer::new(100, 100);
        let h = r.create_texture(TextureDesc::sampled(2, 2)).unwrap();
        assert!(r.write_texture(h, &[0u8; 16]).is_ok());
        assert_eq!(
            r.write_texture(h, &[0u8; 3]),
            Err(RasterError::PixelDataMismatch { expected: 16, actual: 3 })
        );
    }

    #[test]
    fn double_release_is_harmless() {
        let mut r = RecordingRasterizer::new(100, 100);
        let h = r.create_texture(TextureDesc::render_target(8, 8)).unwrap();
        r.bind_render_target(RenderTarget::Texture(h));
        r.release_texture(h);
        r.release_texture(h);

        assert!(!r.is_live(h));
        assert_eq!(r.bound_target(), RenderTarget::Screen);
        let releases = r
            .commands()
            .iter()
            .filter(|c| matches!(c, RasterCmd::ReleaseTexture(_)))
            .count();
        assert_eq!(releases, 1);
    }

    #[test]
    fn draw_captures_current_state() {
        let mut r = RecordingRasterizer::new(100, 100);
        r.set_blend_mode(BlendMode::Multiply);
        r.draw_triangles(None, &[Vertex::default(); 3], &[0, 1, 2]);

        let d = r.draws().next().unwrap();
        assert_eq!(d.blend, BlendMode::Multiply);
        assert_eq!(d.target, RenderTarget::Screen);
        assert_eq!(d.triangle_count(), 1);
    }
}
