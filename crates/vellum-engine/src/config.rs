//! Tunables of the rendering core.

use crate::tessellate::{EarClipStart, FRINGE_WIDTH, LineStyle};

/// Defaults applied by a fresh [`RenderContext`](crate::graphics::RenderContext).
///
/// Every field is public; construct with struct update syntax over
/// `RenderConfig::default()`.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderConfig {
    /// Stroke width for lines and outlines, in target pixels.
    pub line_width: f32,
    pub line_style: LineStyle,
    /// Edge length of the quad drawn per point.
    pub point_size: f32,
    /// Zero-alpha band on each side of smooth lines.
    pub line_fringe: f32,
    /// First vertex examined by ear clipping.
    pub ear_clip_start: EarClipStart,
    /// Build the inverted stencil mask right after recording instead of on first use.
    pub eager_inverse_mask: bool,
    /// Pushes past this depth are ignored.
    pub max_stack_depth: usize,
    /// Screen size used when the backend does not report one.
    pub screen_width: u32,
    pub screen_height: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            line_width: 1.0,
            line_style: LineStyle::Smooth,
            point_size: 1.0,
            line_fringe: FRINGE_WIDTH,
            ear_clip_start: EarClipStart::First,
            eager_inverse_mask: false,
            max_stack_depth: 128,
            screen_width: 800,
            screen_height: 600,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = RenderConfig::default();
        assert_eq!(c.line_width, 1.0);
        assert_eq!(c.line_style, LineStyle::Smooth);
        assert_eq!(c.line_fringe, 0.75);
        assert_eq!(c.ear_clip_start, EarClipStart::First);
        assert!(!c.eager_inverse_mask);
        assert_eq!(c.max_stack_depth, 128);
        assert_eq!((c.screen_width, c.screen_height), (800, 600));
    }
}
