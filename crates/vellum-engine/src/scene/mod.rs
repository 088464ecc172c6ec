//! Recorded draw streams.
//!
//! Responsibilities:
//! - capture draw calls as issued to the rasterizer (device-space vertices,
//!   texture, scissor)
//! - replay them later, optionally with a color override
//!
//! Used by the stencil emulator to rebuild a mask with the opposite polarity
//! without re-running caller code. Items keep issue order; nothing is sorted.

mod cmd;
mod list;

pub use cmd::DrawCmd;
pub use list::{CommandList, DrawItem};
