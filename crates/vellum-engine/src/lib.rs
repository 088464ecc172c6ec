//! Vellum engine crate.
//!
//! A 2D immediate-mode drawing core. Game code talks to a
//! [`graphics::RenderContext`]; every call is tessellated on the CPU into
//! textured, colored triangles and handed to a [`raster::Rasterizer`].
//!
//! Layers, bottom up:
//! - `coords`, `paint`, `transform`: value types and the matrix stack
//! - `tessellate`: shapes, polygons and anti-aliased lines to triangles
//! - `batch`, `mesh`, `particles`: retained drawables that own vertex data
//! - `scene`, `canvas`: recorded draw streams, off-screen targets and stencil emulation
//! - `graphics`: the drawing facade
//! - `raster`, `device`, `render`: the rasterizer contract and its wgpu backend

pub mod config;
pub mod logging;

pub mod coords;
pub mod paint;
pub mod transform;

pub mod raster;
pub mod tessellate;

pub mod batch;
pub mod mesh;
pub mod particles;

pub mod canvas;
pub mod scene;

pub mod graphics;

pub mod device;
pub mod render;
