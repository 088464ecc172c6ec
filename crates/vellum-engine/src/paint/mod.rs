//! Paint model shared by every geometry producer.
//!
//! Scope:
//! - color representation (straight alpha, components in [0, 1])
//! - blend modes understood by the rasterizer

pub mod blend;
pub mod color;

pub use blend::BlendMode;
pub use color::Color;
