//! Rasterizer contract.
//!
//! The core never touches pixels. Everything it produces is a list of
//! [`Vertex`] values plus `u32` triangle indices, handed to an implementation
//! of [`Rasterizer`] together with the texture to sample, the active render
//! target and the blend mode.
//!
//! Implementations:
//! - [`crate::render::WgpuRasterizer`] for real output
//! - [`RecordingRasterizer`] which records every call, used by tests and tooling

mod backend;
mod error;
mod recorder;
mod vertex;

pub use backend::{
    FilterMode, PixelFormat, Rasterizer, RenderTarget, Texture, TextureDesc, TextureHandle,
};
pub use error::RasterError;
pub use recorder::{RasterCmd, RecordedDraw, RecordingRasterizer};
pub use vertex::{QUAD_INDICES, Vertex};
