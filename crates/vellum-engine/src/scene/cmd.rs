use crate::paint::Color;
use crate::raster::{Rasterizer, TextureHandle, Vertex};

/// One recorded triangle draw in device space.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCmd {
    pub texture: Option<TextureHandle>,
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl DrawCmd {
    pub fn new(texture: Option<TextureHandle>, vertices: &[Vertex], indices: &[u32]) -> Self {
        Self {
            texture,
            vertices: vertices.to_vec(),
            indices: indices.to_vec(),
        }
    }

    /// Issues the draw. `color` replaces every vertex color when given.
    pub fn issue<R: Rasterizer + ?Sized>(&self, r: &mut R, color: Option<Color>) {
        match color {
            None => r.draw_triangles(self.texture, &self.vertices, &self.indices),
            Some(c) => {
                let recolored: Vec<Vertex> = self
                    .vertices
                    .iter()
                    .map(|v| {
                        let mut v = *v;
                        v.set_color(c);
                        v
                    })
                    .collect();
                r.draw_triangles(self.texture, &recolored, &self.indices);
            }
        }
    }
}
