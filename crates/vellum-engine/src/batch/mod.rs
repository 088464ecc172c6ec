//! Batched sprite geometry.
//!
//! A [`SpriteBatch`] owns one vertex buffer (4 vertices per sprite) and one
//! index buffer stamped with [`QUAD_INDICES`](crate::raster::QUAD_INDICES)
//! per sprite, so the whole batch goes out as a single draw call.
//! [`Quad`] describes which part of the texture a sprite samples.

mod quad;
mod sprite_batch;

pub use quad::Quad;
pub use sprite_batch::SpriteBatch;
