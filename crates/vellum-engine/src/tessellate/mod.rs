//! Shape-to-geometry conversion.
//!
//! Responsibilities:
//! - tessellate shape families into fan/outline point lists ([`shapes`])
//! - convexity testing and ear-clipping triangulation ([`polygon`])
//! - anti-aliased polyline strips with miter joins ([`line`])
//! - the [`Geometry`] container every producer fills
//!
//! Point lists are produced in local space; the caller maps them through the
//! active transform before emitting vertices. Line building happens after the
//! transform so stroke width stays in target pixels.

mod geometry;
pub mod line;
pub mod polygon;
pub mod shapes;

pub use geometry::{Geometry, fan_indices};
pub use line::{FRINGE_WIDTH, build_line};
pub use polygon::{EarClipStart, fill_indices, is_convex, signed_area, triangulate};
pub use shapes::{ArcType, Outline};

/// Fill or stroke.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum DrawMode {
    Fill,
    Line,
}

/// Stroke rendering style.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum LineStyle {
    /// Core quads flanked by zero-alpha fringe quads.
    #[default]
    Smooth,
    /// Core quads only.
    Rough,
}
