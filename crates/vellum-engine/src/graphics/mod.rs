//! The drawing facade.
//!
//! [`RenderContext`] is the one value game code talks to: it owns the
//! transform stack, colors, line settings, blend mode, scissor, the active
//! canvas and the stencil emulator, and turns every call into tessellated
//! geometry for its [`Rasterizer`](crate::raster::Rasterizer).
//!
//! Drawable resources ([`Image`], [`Text`], canvases, sprite batches, meshes,
//! particle systems) are plain values passed to [`RenderContext::draw`]
//! through the [`Drawable`] sum type.

mod context;
mod drawable;
mod error;
mod image;
mod state;
mod text;

pub use context::RenderContext;
pub use drawable::Drawable;
pub use error::GraphicsError;
pub use image::{Image, ImageData};
pub use state::{GraphicsState, StackKind};
pub use text::{Align, Font, Glyph, ImageFont, Text, TextLine};
