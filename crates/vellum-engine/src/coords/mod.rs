//! Coordinate and geometry types shared by the tessellators, buffers and context.
//!
//! Canonical space:
//! - Pixels of the active render target
//! - Origin top-left
//! - +X right, +Y down
//!
//! Local drawing coordinates are mapped into this space by the
//! [`TransformStack`](crate::transform::TransformStack).

mod rect;
mod vec2;

pub use rect::{Rect, ScissorRect};
pub use vec2::Vec2;
