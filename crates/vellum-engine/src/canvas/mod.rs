//! Off-screen targets and stencil emulation.
//!
//! Responsibilities:
//! - [`Canvas`]: a render-target texture with its size and filter pair
//! - [`RenderTargetStack`]: which canvas (or the screen) drawing goes to
//! - [`StencilEmulator`]: masked drawing built from render-to-texture and
//!   multiply blending, for rasterizers without a stencil buffer
//!
//! Canvases are explicitly released; nothing here is reference counted.

mod offscreen;
mod stencil;
mod targets;

pub use offscreen::Canvas;
pub use stencil::{
    CompareMode, MaskPolarity, StencilAction, StencilEmulator, StencilTest, TestOutcome,
};
pub use targets::RenderTargetStack;
