//! wgpu implementation of [`Rasterizer`](crate::raster::Rasterizer).
//!
//! Convention:
//! - Vertices arrive in target pixels (top-left origin, +Y down).
//! - The vertex shader converts to NDC using a per-target viewport uniform.
//! - Colors are straight alpha; blending is fixed-function per
//!   [`BlendMode`](crate::paint::BlendMode).

mod pipeline;
mod rasterizer;

pub use rasterizer::WgpuRasterizer;
