//! GPU device acquisition.
//!
//! Creates the wgpu instance, adapter, device and queue the production
//! rasterizer draws with. Setup failures are reported through `anyhow` with
//! context; nothing here runs per frame.

mod gpu;
mod init;

pub use gpu::Gpu;
pub use init::GpuInit;
