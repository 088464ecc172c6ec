use std::fmt;

use super::TextureHandle;

/// Failure reported by a [`Rasterizer`](super::Rasterizer) resource operation.
///
/// Draw calls never fail; only resource creation and upload do.
#[derive(Debug, Clone, PartialEq)]
pub enum RasterError {
    /// Width or height was zero or exceeded the backend limit.
    InvalidSize { width: u32, height: u32 },
    /// The handle does not name a live texture.
    UnknownTexture(TextureHandle),
    /// Pixel buffer length does not match `width × height × bytes_per_pixel`.
    PixelDataMismatch { expected: usize, actual: usize },
    /// Backend-specific failure.
    Backend(String),
}

impl fmt::Display for RasterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RasterError::InvalidSize { width, height } => {
                write!(f, "invalid texture size {width}×{height}")
            }
            RasterError::UnknownTexture(h) => write!(f, "unknown texture handle {}", h.0),
            RasterError::PixelDataMismatch { expected, actual } => {
                write!(f, "pixel data has {actual} bytes, expected {expected}")
            }
            RasterError::Backend(msg) => write!(f, "rasterizer backend error: {msg}"),
        }
    }
}

impl std::error::Error for RasterError {}
