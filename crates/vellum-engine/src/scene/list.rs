use crate::coords::ScissorRect;
use crate::paint::Color;
use crate::raster::Rasterizer;

use super::DrawCmd;

/// A recorded command plus the scissor it was issued under.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawItem {
    pub cmd: DrawCmd,
    /// `None` = no clipping.
    pub scissor: Option<ScissorRect>,
}

/// Recorded draw stream.
///
/// - `push()` is O(1) amortized
/// - `clear()` keeps allocated capacity for reuse
#[derive(Debug, Clone, Default)]
pub struct CommandList {
    items: Vec<DrawItem>,
}

impl CommandList {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn clear(&mut self) {
        self.items.clear();
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Items in issue order.
    #[inline]
    pub fn items(&self) -> &[DrawItem] {
        &self.items
    }

    #[inline]
    pub fn push(&mut self, cmd: DrawCmd, scissor: Option<ScissorRect>) {
        self.items.push(DrawItem { cmd, scissor });
    }

    /// Re-issues every item in order under its recorded scissor.
    ///
    /// Leaves the scissor disabled afterwards; callers restore their own.
    pub fn replay<R: Rasterizer + ?Sized>(&self, r: &mut R, color: Option<Color>) {
        let mut current: Option<Option<ScissorRect>> = None;
        for item in &self.items {
            if current != Some(item.scissor) {
                r.set_scissor(item.scissor);
                current = Some(item.scissor);
            }
            item.cmd.issue(r, color);
        }
        if !matches!(current, None | Some(None)) {
            r.set_scissor(None);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::{RasterCmd, RecordingRasterizer, Vertex};

    fn tri() -> DrawCmd {
        DrawCmd::new(None, &[Vertex::default(); 3], &[0, 1, 2])
    }

    #[test]
    fn replay_preserves_order_and_recolors() {
        let mut list = CommandList::new();
        list.push(tri(), None);
        list.push(DrawCmd::new(None, &[Vertex::default(); 4], &[0, 1, 2, 0, 2, 3]), None);

        let mut r = RecordingRasterizer::new(64, 64);
        list.replay(&mut r, Some(Color::transparent()));

        let draws: Vec<_> = r.draws().collect();
        assert_eq!(draws.len(), 2);
        assert_eq!(draws[0].triangle_count(), 1);
        assert_eq!(draws[1].triangle_count(), 2);
        assert!(draws.iter().all(|d| d.vertices.iter().all(|v| v.color() == Color::transparent())));
    }

    #[test]
    fn replay_applies_recorded_scissor_then_disables() {
        let clip = ScissorRect { x: 1, y: 2, width: 3, height: 4 };
        let mut list = CommandList::new();
        list.push(tri(), Some(clip));
        list.push(tri(), Some(clip));

        let mut r = RecordingRasterizer::new(64, 64);
        list.replay(&mut r, None);

        let draws: Vec<_> = r.draws().collect();
        assert!(draws.iter().all(|d| d.scissor == Some(clip)));
        assert_eq!(r.scissor(), None);
        let scissor_calls = r
            .commands()
            .iter()
            .filter(|c| matches!(c, RasterCmd::SetScissor(_)))
            .count();
        assert_eq!(scissor_calls, 2);
    }

    #[test]
    fn clear_keeps_nothing() {
        let mut list = CommandList::new();
        list.push(tri(), None);
        list.clear();
        assert!(list.is_empty());
        assert_eq!(list.len(), 0);
    }
}
