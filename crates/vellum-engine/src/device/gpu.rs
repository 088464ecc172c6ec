use anyhow::{Context, Result};

use super::GpuInit;

/// Owns the wgpu core objects used by the rasterizer.
///
/// No surface is involved: the screen is an offscreen texture owned by
/// [`WgpuRasterizer`](crate::render::WgpuRasterizer), so the core runs the same
/// with or without a window.
pub struct Gpu {
    /// Kept alive for the lifetime of the device.
    _instance: wgpu::Instance,

    adapter: wgpu::Adapter,
    device: wgpu::Device,
    queue: wgpu::Queue,

    screen_format: wgpu::TextureFormat,
    screen_size: (u32, u32),
}

impl Gpu {
    /// Acquires an adapter, device and queue without a surface.
    ///
    /// Adapter/device acquisition is asynchronous under wgpu.
    pub async fn new_headless(init: GpuInit) -> Result<Self> {
        anyhow::ensure!(
            init.screen_width > 0 && init.screen_height > 0,
            "screen has zero size ({}×{})",
            init.screen_width,
            init.screen_height
        );

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: init.power_preference,
                compatible_surface: None,
                force_fallback_adapter: init.force_fallback_adapter,
            })
            .await
            .context("failed to find a suitable GPU adapter")?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("vellum-engine device"),
                required_features: init.required_features,
                required_limits: init.required_limits,
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: wgpu::MemoryHints::Performance,
                trace: wgpu::Trace::Off,
            })
            .await
            .context("failed to create wgpu device/queue")?;

        let info = adapter.get_info();
        log::info!("GPU: {} ({:?})", info.name, info.backend);

        Ok(Self {
            _instance: instance,
            adapter,
            device,
            queue,
            screen_format: init.screen_format,
            screen_size: (init.screen_width, init.screen_height),
        })
    }

    /// Blocking form of [`new_headless`](Self::new_headless).
    pub fn headless(init: GpuInit) -> Result<Self> {
        pollster::block_on(Self::new_headless(init))
    }

    pub fn adapter_info(&self) -> wgpu::AdapterInfo {
        self.adapter.get_info()
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn screen_format(&self) -> wgpu::TextureFormat {
        self.screen_format
    }

    pub fn screen_size(&self) -> (u32, u32) {
        self.screen_size
    }

    /// Largest texture edge the device accepts.
    pub fn max_texture_dimension(&self) -> u32 {
        self.device.limits().max_texture_dimension_2d
    }
}
