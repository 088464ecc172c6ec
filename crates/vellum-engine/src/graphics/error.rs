use std::fmt;

use crate::raster::RasterError;

/// Failure of a resource-creating context call.
///
/// Drawing calls never fail; they become no-ops instead.
#[derive(Debug, Clone, PartialEq)]
pub enum GraphicsError {
    /// The context has no rasterizer attached.
    NoBackend,
    Raster(RasterError),
}

impl fmt::Display for GraphicsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphicsError::NoBackend => write!(f, "no rasterizer attached"),
            GraphicsError::Raster(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for GraphicsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GraphicsError::NoBackend => None,
            GraphicsError::Raster(e) => Some(e),
        }
    }
}

impl From<RasterError> for GraphicsError {
    fn from(e: RasterError) -> Self {
        GraphicsError::Raster(e)
    }
}
