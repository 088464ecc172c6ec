use crate::coords::Vec2;
use crate::paint::Color;
use crate::raster::{QUAD_INDICES, Vertex};
use crate::transform::AffineMatrix;

/// Indexed triangle list ready for
/// [`Rasterizer::draw_triangles`](crate::raster::Rasterizer::draw_triangles).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Geometry {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl Geometry {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn with_capacity(vertices: usize, indices: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertices),
            indices: Vec::with_capacity(indices),
        }
    }

    /// True when nothing would be rasterized.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() || self.indices.len() < 3
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Clears contents, keeping allocations.
    #[inline]
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.indices.clear();
    }

    #[inline]
    fn base(&self) -> u32 {
        self.vertices.len() as u32
    }

    /// Appends a triangle fan anchored at `points[0]`. Fewer than three points add nothing.
    pub fn push_fan(&mut self, points: &[Vec2], color: Color) {
        if points.len() < 3 {
            return;
        }
        let base = self.base();
        self.vertices.extend(points.iter().map(|&p| Vertex::colored(p, color)));
        self.indices.extend(fan_indices(points.len()).map(|i| base + i));
    }

    /// Appends `points` as vertices and `indices` (relative to `points`) as triangles.
    ///
    /// A trailing partial triangle in `indices` is dropped.
    pub fn push_triangles(&mut self, points: &[Vec2], indices: &[u32], color: Color) {
        let whole = indices.len() - indices.len() % 3;
        if whole == 0 {
            return;
        }
        let base = self.base();
        self.vertices.extend(points.iter().map(|&p| Vertex::colored(p, color)));
        self.indices.extend(indices[..whole].iter().map(|&i| base + i));
    }

    /// Appends one quad. Corners are ordered top-left, top-right, bottom-right, bottom-left.
    pub fn push_quad(&mut self, corners: [Vec2; 4], uvs: [[f32; 2]; 4], color: Color) {
        let base = self.base();
        for (p, uv) in corners.iter().zip(uvs.iter()) {
            self.vertices.push(Vertex::new(p.x, p.y, uv[0], uv[1], color));
        }
        self.indices.extend(QUAD_INDICES.iter().map(|&i| base + i));
    }

    /// Appends pre-built vertices with indices relative to them.
    pub fn push_vertices(&mut self, vertices: &[Vertex], indices: &[u32]) {
        let base = self.base();
        self.vertices.extend_from_slice(vertices);
        self.indices.extend(indices.iter().map(|&i| base + i));
    }

    /// Maps every vertex position through `m`.
    pub fn transform(&mut self, m: &AffineMatrix) {
        if m.is_identity() {
            return;
        }
        for v in &mut self.vertices {
            *v = v.transformed(m);
        }
    }
}

/// Indices of a triangle fan over `n` points: `(0, i, i + 1)` for `i in 1..n-1`.
pub fn fan_indices(n: usize) -> impl Iterator<Item = u32> {
    (1..n.saturating_sub(1) as u32).flat_map(|i| [0, i, i + 1])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fan_of_four_is_two_triangles() {
        let idx: Vec<u32> = fan_indices(4).collect();
        assert_eq!(idx, vec![0, 1, 2, 0, 2, 3]);
    }

    #[test]
    fn fan_of_two_is_empty() {
        assert_eq!(fan_indices(2).count(), 0);
        let mut g = Geometry::new();
        g.push_fan(&[Vec2::zero(), Vec2::new(1.0, 0.0)], Color::white());
        assert!(g.is_empty());
    }

    #[test]
    fn quads_are_offset_by_existing_vertices() {
        let mut g = Geometry::new();
        let c = [Vec2::zero(); 4];
        let uv = [[0.0; 2]; 4];
        g.push_quad(c, uv, Color::white());
        g.push_quad(c, uv, Color::white());
        assert_eq!(&g.indices[6..], &[4, 5, 6, 4, 6, 7]);
    }

    #[test]
    fn partial_triangle_is_dropped() {
        let mut g = Geometry::new();
        let pts = [Vec2::zero(), Vec2::new(1.0, 0.0), Vec2::new(0.0, 1.0)];
        g.push_triangles(&pts, &[0, 1, 2, 0, 1], Color::white());
        assert_eq!(g.triangle_count(), 1);
    }
}
