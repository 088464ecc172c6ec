use std::borrow::Cow;

use crate::paint::Color;
use crate::raster::{QUAD_INDICES, Texture, Vertex};
use crate::transform::{AffineMatrix, Placement};

use super::Quad;

/// Growable buffer of textured quads drawn in one call.
///
/// Invariants:
/// - `vertices.len() == capacity * 4`
/// - `indices.len() == capacity * 6`, sprite `i` stamped at `4 * i`
/// - `count <= capacity`
///
/// Sprites are addressed by 1-based handles returned from [`add`](Self::add).
#[derive(Debug, Clone)]
pub struct SpriteBatch {
    texture: Texture,
    vertices: Vec<Vertex>,
    indices: Vec<u32>,
    count: usize,
    capacity: usize,
    color: Option<Color>,
}

impl SpriteBatch {
    pub fn new(texture: Texture, capacity: usize) -> Self {
        let mut batch = Self {
            texture,
            vertices: Vec::new(),
            indices: Vec::new(),
            count: 0,
            capacity: 0,
            color: None,
        };
        batch.set_buffer_size(capacity);
        batch
    }

    /// Appends a sprite and returns its 1-based handle.
    ///
    /// `quad = None` samples the whole texture. The buffer doubles when full.
    pub fn add(&mut self, quad: Option<&Quad>, placement: Placement) -> usize {
        self.add_transformed(quad, &placement.matrix())
    }

    /// Like [`add`](Self::add) with an already composed local matrix.
    pub fn add_transformed(&mut self, quad: Option<&Quad>, m: &AffineMatrix) -> usize {
        if self.count == self.capacity {
            let grown = (self.capacity * 2).max(1);
            log::debug!("SpriteBatch: growing {} -> {grown}", self.capacity);
            self.set_buffer_size(grown);
        }

        let slot = self.count;
        self.write(slot, quad, m);
        self.count += 1;
        self.count
    }

    /// Rewrites the sprite at `handle`. Handles outside `1..=count` are ignored.
    pub fn set(&mut self, handle: usize, quad: Option<&Quad>, placement: Placement) {
        let Some(slot) = self.slot(handle) else {
            log::debug!("SpriteBatch::set: handle {handle} out of range (count {})", self.count);
            return;
        };
        self.write(slot, quad, &placement.matrix());
    }

    /// The four stored vertices of `handle`, in corner order.
    pub fn get(&self, handle: usize) -> Option<[Vertex; 4]> {
        let slot = self.slot(handle)?;
        let v = &self.vertices[slot * 4..slot * 4 + 4];
        Some([v[0], v[1], v[2], v[3]])
    }

    #[inline]
    fn slot(&self, handle: usize) -> Option<usize> {
        (1..=self.count).contains(&handle).then(|| handle - 1)
    }

    fn write(&mut self, slot: usize, quad: Option<&Quad>, m: &AffineMatrix) {
        let quad = quad.copied().unwrap_or_else(|| Quad::full(&self.texture));
        let color = self.color.unwrap_or_default();

        let dst = &mut self.vertices[slot * 4..slot * 4 + 4];
        for ((v, p), uv) in dst.iter_mut().zip(quad.corners()).zip(quad.uvs()) {
            let p = m.transform_point(p);
            *v = Vertex::new(p.x, p.y, uv[0], uv[1], color);
        }
    }

    /// Removes every sprite. Buffers are kept.
    #[inline]
    pub fn clear(&mut self) {
        self.count = 0;
    }

    /// Resizes the buffer to `size` sprites.
    ///
    /// Existing vertex data is preserved up to the new size; `count` is
    /// truncated when shrinking. The index stamp is rebuilt either way.
    pub fn set_buffer_size(&mut self, size: usize) {
        self.vertices.resize(size * 4, Vertex::default());
        self.indices.clear();
        self.indices.reserve(size * 6);
        for i in 0..size as u32 {
            self.indices.extend(QUAD_INDICES.iter().map(|&k| 4 * i + k));
        }
        self.capacity = size;
        self.count = self.count.min(size);
    }

    #[inline]
    pub fn buffer_size(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn count(&self) -> usize {
        self.count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Tint written into sprites added or set from now on. `None` means white.
    #[inline]
    pub fn set_color(&mut self, color: Option<Color>) {
        self.color = color;
    }

    #[inline]
    pub fn color(&self) -> Option<Color> {
        self.color
    }

    #[inline]
    pub fn set_texture(&mut self, texture: Texture) {
        self.texture = texture;
    }

    #[inline]
    pub fn texture(&self) -> Texture {
        self.texture
    }

    /// Vertices of the live sprites.
    #[inline]
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices[..self.count * 4]
    }

    /// Indices of the live sprites.
    #[inline]
    pub fn indices(&self) -> &[u32] {
        &self.indices[..self.count * 6]
    }

    /// Live vertices mapped through `m`. Identity borrows the stored buffer.
    pub fn transformed_vertices(&self, m: &AffineMatrix) -> Cow<'_, [Vertex]> {
        if m.is_identity() {
            return Cow::Borrowed(self.vertices());
        }
        Cow::Owned(self.vertices().iter().map(|v| v.transformed(m)).collect())
    }
}
