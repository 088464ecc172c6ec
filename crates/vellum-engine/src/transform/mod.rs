//! 2D affine transforms and the save/restore stack.
//!
//! Every geometry producer maps its local coordinates through the current
//! matrix of a [`TransformStack`] before handing vertices to the rasterizer.

mod affine;
mod placement;
mod stack;

pub use affine::AffineMatrix;
pub use placement::Placement;
pub use stack::TransformStack;
