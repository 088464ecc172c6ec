use std::borrow::Cow;

use crate::coords::Vec2;
use crate::paint::Color;
use crate::raster::{QUAD_INDICES, Texture, Vertex};

static DEFAULT_VERTEX: Vertex = Vertex::new(0.0, 0.0, 0.0, 0.0, Color::white());

/// How the (mapped, ranged) vertex sequence is turned into triangles.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum MeshMode {
    /// `n - 2` triangles anchored at the first vertex.
    #[default]
    Fan,
    /// `n - 2` triangles with alternating winding.
    Strip,
    /// Consecutive triples; a trailing partial triple is dropped.
    Triangles,
    /// Every vertex becomes a quad of the current point size.
    Points,
}

/// Addressable float groups of a [`Vertex`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum VertexAttribute {
    Position,
    Color,
    TexCoord,
}

impl VertexAttribute {
    /// Float range inside the vertex layout.
    #[inline]
    fn span(self) -> core::ops::Range<usize> {
        match self {
            VertexAttribute::Position => 0..2,
            VertexAttribute::Color => 2..6,
            VertexAttribute::TexCoord => 6..8,
        }
    }

    #[inline]
    pub fn components(self) -> usize {
        self.span().len()
    }
}

/// Draw-ready mesh data.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshDraw<'a> {
    pub vertices: Cow<'a, [Vertex]>,
    pub indices: Vec<u32>,
}

impl MeshDraw<'_> {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.indices.len() < 3
    }
}

#[derive(Debug, Clone)]
pub struct Mesh {
    vertices: Vec<Vertex>,
    /// 0-based.
    map: Option<Vec<u32>>,
    /// 0-based start, count.
    range: Option<(usize, usize)>,
    mode: MeshMode,
    texture: Option<Texture>,
}

impl Mesh {
    /// `count` white vertices at the origin.
    pub fn new(count: usize, mode: MeshMode) -> Self {
        Self::from_vertices(vec![Vertex::default(); count], mode)
    }

    pub fn from_vertices(vertices: Vec<Vertex>, mode: MeshMode) -> Self {
        Self { vertices, map: None, range: None, mode, texture: None }
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    fn slot(&self, index: usize) -> Option<usize> {
        (1..=self.vertices.len()).contains(&index).then(|| index - 1)
    }

    /// Overwrites vertex `index` (1-based). Out of range is ignored.
    pub fn set_vertex(&mut self, index: usize, vertex: Vertex) {
        match self.slot(index) {
            Some(i) => self.vertices[i] = vertex,
            None => log::debug!("Mesh::set_vertex: index {index} out of range"),
        }
    }

    /// Vertex `index` (1-based), or the default vertex when out of range.
    pub fn get_vertex(&self, index: usize) -> Vertex {
        self.slot(index).map_or(DEFAULT_VERTEX, |i| self.vertices[i])
    }

    /// Writes `vertices` starting at `start` (1-based). Values past the end are dropped.
    pub fn set_vertices(&mut self, start: usize, vertices: &[Vertex]) {
        let Some(first) = self.slot(start) else {
            log::debug!("Mesh::set_vertices: start {start} out of range");
            return;
        };
        let n = vertices.len().min(self.vertices.len() - first);
        self.vertices[first..first + n].copy_from_slice(&vertices[..n]);
    }

    /// Writes the leading floats of one attribute group of vertex `index` (1-based).
    pub fn set_vertex_attribute(
        &mut self,
        index: usize,
        attribute: VertexAttribute,
        values: &[f32],
    ) {
        let Some(i) = self.slot(index) else {
            log::debug!("Mesh::set_vertex_attribute: index {index} out of range");
            return;
        };
        let floats: &mut [f32] =
            bytemuck::cast_slice_mut(std::slice::from_mut(&mut self.vertices[i]));
        let span = attribute.span();
        let n = values.len().min(span.len());
        floats[span.start..span.start + n].copy_from_slice(&values[..n]);
    }

    /// One attribute group of vertex `index` (1-based); the default vertex's when out of range.
    pub fn get_vertex_attribute(&self, index: usize, attribute: VertexAttribute) -> &[f32] {
        let v = self.slot(index).map_or(&DEFAULT_VERTEX, |i| &self.vertices[i]);
        let floats: &[f32] = bytemuck::cast_slice(std::slice::from_ref(v));
        &floats[attribute.span()]
    }

    #[inline]
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// Sets the 1-based vertex map, or clears it with `None`.
    ///
    /// A map with any index outside `1..=vertex_count` is rejected as a whole
    /// and the previous map is kept. Returns whether the map was applied.
    pub fn set_vertex_map(&mut self, map: Option<&[u32]>) -> bool {
        let Some(map) = map else {
            self.map = None;
            return true;
        };
        let n = self.vertices.len() as u32;
        if let Some(bad) = map.iter().find(|&&i| i == 0 || i > n) {
            log::warn!("Mesh::set_vertex_map: index {bad} outside 1..={n}; map rejected");
            return false;
        }
        self.map = Some(map.iter().map(|&i| i - 1).collect());
        true
    }

    /// The vertex map in 1-based form.
    pub fn vertex_map(&self) -> Option<Vec<u32>> {
        self.map.as_ref().map(|m| m.iter().map(|&i| i + 1).collect())
    }

    /// Restricts drawing to `count` elements of the mapped sequence starting at `start` (1-based).
    ///
    /// Rejected as a whole when empty or past the end of the sequence. Returns
    /// whether the range was applied.
    pub fn set_draw_range(&mut self, range: Option<(usize, usize)>) -> bool {
        let Some((start, count)) = range else {
            self.range = None;
            return true;
        };
        let len = self.sequence_len();
        if start == 0 || count == 0 || count > len.saturating_sub(start - 1) {
            log::warn!(
                "Mesh::set_draw_range: ({start}, {count}) invalid for {len} elements, rejected"
            );
            return false;
        }
        self.range = Some((start - 1, count));
        true
    }

    /// The draw range as `(start, count)`, 1-based.
    pub fn draw_range(&self) -> Option<(usize, usize)> {
        self.range.map(|(s, c)| (s + 1, c))
    }

    #[inline]
    pub fn set_mode(&mut self, mode: MeshMode) {
        self.mode = mode;
    }

    #[inline]
    pub fn mode(&self) -> MeshMode {
        self.mode
    }

    #[inline]
    pub fn set_texture(&mut self, texture: Option<Texture>) {
        self.texture = texture;
    }

    #[inline]
    pub fn texture(&self) -> Option<Texture> {
        self.texture
    }

    #[inline]
    fn sequence_len(&self) -> usize {
        self.map.as_ref().map_or(self.vertices.len(), Vec::len)
    }

    /// Mapped sequence restricted to the draw range. The range is clamped in
    /// case the map shrank after it was set.
    fn sequence(&self) -> Vec<u32> {
        let full: Vec<u32> = match &self.map {
            Some(m) => m.clone(),
            None => (0..self.vertices.len() as u32).collect(),
        };
        match self.range {
            None => full,
            Some((start, count)) => {
                let s = start.min(full.len());
                let e = (start + count).min(full.len());
                full[s..e].to_vec()
            }
        }
    }

    /// Vertices and triangle indices for the current mode.
    ///
    /// `point_size` is only used by [`MeshMode::Points`].
    pub fn draw_data(&self, point_size: f32) -> MeshDraw<'_> {
        let seq = self.sequence();
        let indices = match self.mode {
            MeshMode::Triangles => {
                let whole = seq.len() - seq.len() % 3;
                seq[..whole].to_vec()
            }
            MeshMode::Fan => (1..seq.len().saturating_sub(1))
                .flat_map(|i| [seq[0], seq[i], seq[i + 1]])
                .collect(),
            MeshMode::Strip => (0..seq.len().saturating_sub(2))
                .flat_map(|i| {
                    if i % 2 == 0 {
                        [seq[i], seq[i + 1], seq[i + 2]]
                    } else {
                        [seq[i + 1], seq[i], seq[i + 2]]
                    }
                })
                .collect(),
            MeshMode::Points => return self.point_quads(&seq, point_size),
        };
        MeshDraw { vertices: Cow::Borrowed(&self.vertices), indices }
    }

    fn point_quads(&self, seq: &[u32], point_size: f32) -> MeshDraw<'_> {
        let half = point_size.max(0.0) * 0.5;
        let corners = [
            Vec2::new(-half, -half),
            Vec2::new(half, -half),
            Vec2::new(half, half),
            Vec2::new(-half, half),
        ];
        let uvs = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];

        let mut vertices = Vec::with_capacity(seq.len() * 4);
        let mut indices = Vec::with_capacity(seq.len() * 6);
        for (n, &i) in seq.iter().enumerate() {
            let src = self.vertices[i as usize];
            let center = src.position();
            let color = src.color();
            for (c, uv) in corners.iter().zip(uvs) {
                let p = center + *c;
                vertices.push(Vertex::new(p.x, p.y, uv[0], uv[1], color));
            }
            indices.extend(QUAD_INDICES.iter().map(|&k| 4 * n as u32 + k));
        }
        MeshDraw { vertices: Cow::Owned(vertices), indices }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Mesh {
        let c = Color::white();
        Mesh::from_vertices(
            vec![
                Vertex::new(0.0, 0.0, 0.0, 0.0, c),
                Vertex::new(1.0, 0.0, 1.0, 0.0, c),
                Vertex::new(1.0, 1.0, 1.0, 1.0, c),
                Vertex::new(0.0, 1.0, 0.0, 1.0, c),
            ],
            MeshMode::Fan,
        )
    }

    fn numbered(n: usize, mode: MeshMode) -> Mesh {
        let vs = (0..n).map(|i| Vertex::new(i as f32, 0.0, 0.0, 0.0, Color::white())).collect();
        Mesh::from_vertices(vs, mode)
    }

    // ── topology ──────────────────────────────────────────────────────────

    #[test]
    fn fan_unit_square() {
        let m = square();
        let d = m.draw_data(1.0);
        assert_eq!(d.vertices.len(), 4);
        assert_eq!(d.indices, vec![0, 1, 2, 0, 2, 3]);
    }

    #[test]
    fn strip_alternates_winding() {
        let d = numbered(5, MeshMode::Strip).draw_data(1.0).indices;
        assert_eq!(d, vec![0, 1, 2, 2, 1, 3, 2, 3, 4]);
    }

    #[test]
    fn triangles_truncate_partial_triple() {
        let m = numbered(5, MeshMode::Triangles);
        let d = m.draw_data(1.0);
        assert_eq!(d.indices, vec![0, 1, 2]);
    }

    #[test]
    fn points_expand_to_quads() {
        let mut m = numbered(2, MeshMode::Points);
        m.set_vertex(2, Vertex::new(10.0, 10.0, 0.0, 0.0, Color::black()));
        let d = m.draw_data(4.0);
        assert_eq!(d.vertices.len(), 8);
        assert_eq!(d.indices[6..], [4, 5, 6, 4, 6, 7]);
        assert_eq!(d.vertices[4].position(), Vec2::new(8.0, 8.0));
        assert_eq!(d.vertices[6].position(), Vec2::new(12.0, 12.0));
        assert_eq!(d.vertices[6].color(), Color::black());
        assert_eq!((d.vertices[6].u, d.vertices[6].v), (1.0, 1.0));
    }

    #[test]
    fn too_few_vertices_draw_nothing() {
        assert!(numbered(2, MeshMode::Fan).draw_data(1.0).is_empty());
        assert!(numbered(1, MeshMode::Strip).draw_data(1.0).is_empty());
    }

    // ── vertex access ─────────────────────────────────────────────────────

    #[test]
    fn out_of_range_read_returns_default() {
        let m = Mesh::new(2, MeshMode::Fan);
        assert_eq!(m.get_vertex(0), DEFAULT_VERTEX);
        assert_eq!(m.get_vertex(3), DEFAULT_VERTEX);
        assert_eq!(m.get_vertex_attribute(9, VertexAttribute::Color), &[1.0, 1.0, 1.0, 1.0]);
    }

    #[test]
    fn attributes_update_partially() {
        let mut m = Mesh::new(1, MeshMode::Points);
        m.set_vertex_attribute(1, VertexAttribute::Color, &[0.5, 0.25]);
        m.set_vertex_attribute(1, VertexAttribute::TexCoord, &[0.1, 0.2, 9.0]);
        let v = m.get_vertex(1);
        assert_eq!(v.color(), Color::new(0.5, 0.25, 1.0, 1.0));
        assert_eq!((v.u, v.v), (0.1, 0.2));
        assert_eq!(m.get_vertex_attribute(1, VertexAttribute::Position), &[0.0, 0.0]);
    }

    #[test]
    fn bulk_set_stops_at_end() {
        let mut m = Mesh::new(3, MeshMode::Fan);
        let v = Vertex::new(5.0, 5.0, 0.0, 0.0, Color::white());
        m.set_vertices(2, &[v, v, v]);
        assert_eq!(m.get_vertex(1), Vertex::default());
        assert_eq!(m.get_vertex(3), v);
        assert_eq!(m.vertex_count(), 3);
    }

    // ── map / range ───────────────────────────────────────────────────────

    #[test]
    fn vertex_map_is_one_based_and_validated() {
        let mut m = numbered(4, MeshMode::Triangles);
        assert!(m.set_vertex_map(Some(&[4, 3, 2])));
        assert_eq!(m.draw_data(1.0).indices, vec![3, 2, 1]);
        assert_eq!(m.vertex_map(), Some(vec![4, 3, 2]));

        assert!(!m.set_vertex_map(Some(&[1, 5, 2])));
        assert!(!m.set_vertex_map(Some(&[0, 1, 2])));
        assert_eq!(m.vertex_map(), Some(vec![4, 3, 2]));

        assert!(m.set_vertex_map(None));
        assert!(m.vertex_map().is_none());
    }

    #[test]
    fn draw_range_selects_subsequence() {
        let mut m = numbered(6, MeshMode::Fan);
        assert!(m.set_draw_range(Some((2, 4))));
        assert_eq!(m.draw_data(1.0).indices, vec![1, 2, 3, 1, 3, 4]);
        assert_eq!(m.draw_range(), Some((2, 4)));

        assert!(!m.set_draw_range(Some((4, 4))));
        assert!(!m.set_draw_range(Some((0, 2))));
        assert_eq!(m.draw_range(), Some((2, 4)));
    }

    #[test]
    fn oversized_range_is_rejected() {
        let mut m = Mesh::new(4, MeshMode::Fan);
        assert!(!m.set_draw_range(Some((2, usize::MAX))));
        assert!(!m.set_draw_range(Some((usize::MAX, 1))));
        assert!(m.draw_range().is_none());
        assert!(m.set_draw_range(Some((4, 1))));
    }

    #[test]
    fn range_is_clamped_when_map_shrinks() {
        let mut m = numbered(6, MeshMode::Triangles);
        m.set_draw_range(Some((1, 6)));
        m.set_vertex_map(Some(&[1, 2, 3]));
        assert_eq!(m.draw_data(1.0).indices, vec![0, 1, 2]);
    }
}
