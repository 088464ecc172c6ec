//! Custom vertex meshes.
//!
//! A [`Mesh`] has a fixed vertex count chosen at creation. Content, the
//! optional vertex map, the draw range and the [`MeshMode`] topology stay
//! mutable. Public indices are 1-based; storage is 0-based.

mod buffer;

pub use buffer::{Mesh, MeshDraw, MeshMode, VertexAttribute};
