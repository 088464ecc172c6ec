/// Parameters for headless GPU acquisition.
///
/// Keep this structure minimal. Add configuration flags only when a concrete
/// platform or backend requirement exists.
#[derive(Debug, Clone)]
pub struct GpuInit {
    pub power_preference: wgpu::PowerPreference,

    /// Use a software adapter even when a hardware one is available.
    pub force_fallback_adapter: bool,

    /// Required wgpu features.
    ///
    /// Favor an empty set for portability unless a feature is strictly necessary.
    pub required_features: wgpu::Features,

    /// Limits requested from the adapter/device.
    pub required_limits: wgpu::Limits,

    /// Format of the offscreen texture standing in for the screen.
    ///
    /// Non-sRGB so straight-alpha vertex colors blend as written.
    pub screen_format: wgpu::TextureFormat,

    /// Screen size in pixels.
    pub screen_width: u32,
    pub screen_height: u32,
}

impl Default for GpuInit {
    fn default() -> Self {
        Self {
            power_preference: wgpu::PowerPreference::HighPerformance,
            force_fallback_adapter: false,
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            screen_format: wgpu::TextureFormat::Rgba8Unorm,
            screen_width: 800,
            screen_height: 600,
        }
    }
}
