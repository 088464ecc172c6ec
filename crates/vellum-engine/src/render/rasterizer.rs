use std::borrow::Cow;
use std::collections::HashMap;

use anyhow::Result;
use wgpu::util::DeviceExt;

use crate::coords::ScissorRect;
use crate::device::Gpu;
use crate::paint::{BlendMode, Color};
use crate::raster::{
    FilterMode, RasterError, Rasterizer, RenderTarget, TextureDesc, TextureHandle, Vertex,
};

use super::pipeline::{ViewportUniform, clamp_scissor, create_pipeline, filter_mode, texture_format};

// ── texture slot ──────────────────────────────────────────────────────────

struct Slot {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    desc: TextureDesc,
    format: wgpu::TextureFormat,
    filter: (FilterMode, FilterMode),
    tint: Color,

    /// group(1) when sampled.
    bind_group: wgpu::BindGroup,

    /// group(0) when bound as a target. Render targets only.
    viewport: Option<wgpu::BindGroup>,
}

impl Slot {
    #[inline]
    fn size(&self) -> (u32, u32) {
        (self.desc.width, self.desc.height)
    }
}

// ── rasterizer ────────────────────────────────────────────────────────────

/// [`Rasterizer`] on top of wgpu.
///
/// The screen is an offscreen texture of the size and format configured in
/// [`GpuInit`](crate::device::GpuInit); copy out of [`screen_texture`] to
/// present or read it back.
///
/// Commands are encoded into one pending encoder and submitted on
/// [`flush`](Self::flush) or before any texture upload, so uploads and draws
/// keep their issue order.
///
/// [`screen_texture`]: Self::screen_texture
pub struct WgpuRasterizer {
    gpu: Gpu,

    shader: wgpu::ShaderModule,
    viewport_layout: wgpu::BindGroupLayout,
    texture_layout: wgpu::BindGroupLayout,
    pipeline_layout: wgpu::PipelineLayout,
    pipelines: HashMap<(wgpu::TextureFormat, BlendMode), wgpu::RenderPipeline>,
    samplers: HashMap<(FilterMode, FilterMode), wgpu::Sampler>,

    screen: Slot,
    /// 1×1 opaque white, sampled by untextured draws.
    white: Slot,
    textures: HashMap<TextureHandle, Slot>,
    next_handle: u64,

    target: RenderTarget,
    blend: BlendMode,
    scissor: Option<ScissorRect>,

    encoder: Option<wgpu::CommandEncoder>,
}

impl WgpuRasterizer {
    pub fn new(gpu: Gpu) -> Result<Self> {
        let (width, height) = gpu.screen_size();
        let max = gpu.max_texture_dimension();
        anyhow::ensure!(
            width > 0 && height > 0 && width <= max && height <= max,
            "screen size {width}×{height} outside device limit {max}"
        );

        let device = gpu.device();

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("vellum textured shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/textured.wgsl").into()),
        });

        let viewport_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("vellum viewport bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: wgpu::BufferSize::new(
                        std::mem::size_of::<ViewportUniform>() as u64,
                    ),
                },
                count: None,
            }],
        });

        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("vellum texture bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("vellum pipeline layout"),
            bind_group_layouts: &[&viewport_layout, &texture_layout],
            immediate_size: 0,
        });

        let mut samplers = HashMap::new();

        let screen = create_slot(
            device,
            &texture_layout,
            &viewport_layout,
            &mut samplers,
            TextureDesc::render_target(width, height),
            gpu.screen_format(),
            "vellum screen",
        );

        let white = create_slot(
            device,
            &texture_layout,
            &viewport_layout,
            &mut samplers,
            TextureDesc::sampled(1, 1),
            wgpu::TextureFormat::Rgba8Unorm,
            "vellum white",
        );
        upload(gpu.queue(), &white, &[255; 4]);

        log::info!("WgpuRasterizer: screen {width}×{height} {:?}", gpu.screen_format());

        Ok(Self {
            shader,
            viewport_layout,
            texture_layout,
            pipeline_layout,
            pipelines: HashMap::new(),
            samplers,
            screen,
            white,
            textures: HashMap::new(),
            next_handle: 1,
            target: RenderTarget::Screen,
            blend: BlendMode::Alpha,
            scissor: None,
            encoder: None,
            gpu,
        })
    }

    #[inline]
    pub fn gpu(&self) -> &Gpu {
        &self.gpu
    }

    /// The offscreen texture standing in for the screen.
    #[inline]
    pub fn screen_texture(&self) -> &wgpu::Texture {
        &self.screen.texture
    }

    /// Backing wgpu texture of a live handle.
    pub fn texture(&self, handle: TextureHandle) -> Option<&wgpu::Texture> {
        self.textures.get(&handle).map(|s| &s.texture)
    }

    /// Submits everything encoded so far.
    pub fn flush(&mut self) {
        if let Some(encoder) = self.encoder.take() {
            self.gpu.queue().submit(std::iter::once(encoder.finish()));
        }
    }

    fn take_encoder(&mut self) -> wgpu::CommandEncoder {
        match self.encoder.take() {
            Some(e) => e,
            None => self.gpu.device().create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("vellum encoder"),
            }),
        }
    }

    /// The bound target's slot. A released or non-target handle resolves to `None`.
    fn target_slot(&self, target: RenderTarget) -> Option<&Slot> {
        match target {
            RenderTarget::Screen => Some(&self.screen),
            RenderTarget::Texture(h) => self.textures.get(&h).filter(|s| s.desc.render_target),
        }
    }

    fn ensure_pipeline(&mut self, format: wgpu::TextureFormat, blend: BlendMode) {
        if !self.pipelines.contains_key(&(format, blend)) {
            let pipeline = create_pipeline(
                self.gpu.device(),
                &self.pipeline_layout,
                &self.shader,
                format,
                blend,
            );
            self.pipelines.insert((format, blend), pipeline);
        }
    }

    fn encode_draw(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        source: &Slot,
        scissor: Option<ScissorRect>,
        vertex_buffer: &wgpu::Buffer,
        index_buffer: &wgpu::Buffer,
        index_count: u32,
    ) {
        let Some(target) = self.target_slot(self.target) else {
            return;
        };
        let Some(viewport) = target.viewport.as_ref() else {
            return;
        };
        let Some(pipeline) = self.pipelines.get(&(target.format, self.blend)) else {
            return;
        };

        let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("vellum draw pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &target.view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        rpass.set_pipeline(pipeline);
        rpass.set_bind_group(0, viewport, &[]);
        rpass.set_bind_group(1, &source.bind_group, &[]);
        rpass.set_vertex_buffer(0, vertex_buffer.slice(..));
        rpass.set_index_buffer(index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        if let Some(s) = scissor {
            rpass.set_scissor_rect(s.x, s.y, s.width, s.height);
        }
        rpass.draw_indexed(0..index_count, 0, 0..1);
    }
}

impl Rasterizer for WgpuRasterizer {
    fn create_texture(&mut self, desc: TextureDesc) -> Result<TextureHandle, RasterError> {
        let max = self.gpu.max_texture_dimension();
        if desc.width == 0 || desc.height == 0 || desc.width > max || desc.height > max {
            return Err(RasterError::InvalidSize { width: desc.width, height: desc.height });
        }

        let handle = TextureHandle(self.next_handle);
        self.next_handle += 1;

        let slot = create_slot(
            self.gpu.device(),
            &self.texture_layout,
            &self.viewport_layout,
            &mut self.samplers,
            desc,
            texture_format(desc.format),
            "vellum texture",
        );
        self.textures.insert(handle, slot);

        log::trace!("WgpuRasterizer: texture {} ({}×{})", handle.0, desc.width, desc.height);
        Ok(handle)
    }

    fn write_texture(&mut self, texture: TextureHandle, pixels: &[u8]) -> Result<(), RasterError> {
        let desc = self
            .textures
            .get(&texture)
            .map(|s| s.desc)
            .ok_or(RasterError::UnknownTexture(texture))?;

        let expected = desc.width as usize * desc.height as usize * desc.format.bytes_per_pixel();
        if pixels.len() != expected {
            return Err(RasterError::PixelDataMismatch { expected, actual: pixels.len() });
        }

        // Queue writes land before the next submission; draws already
        // encoded must go first.
        self.flush();
        if let Some(slot) = self.textures.get(&texture) {
            upload(self.gpu.queue(), slot, pixels);
        }
        Ok(())
    }

    fn release_texture(&mut self, texture: TextureHandle) {
        if self.textures.contains_key(&texture) {
            // Pending passes may still reference it.
            self.flush();
            self.textures.remove(&texture);
            if self.target == RenderTarget::Texture(texture) {
                self.target = RenderTarget::Screen;
            }
        }
    }

    fn bind_render_target(&mut self, target: RenderTarget) {
        if self.target_slot(target).is_none() {
            log::warn!("WgpuRasterizer: {target:?} is not a render target, binding the screen");
            self.target = RenderTarget::Screen;
            return;
        }
        self.target = target;
    }

    #[inline]
    fn set_blend_mode(&mut self, mode: BlendMode) {
        self.blend = mode;
    }

    #[inline]
    fn set_scissor(&mut self, scissor: Option<ScissorRect>) {
        self.scissor = scissor;
    }

    fn set_texture_filter(&mut self, texture: TextureHandle, min: FilterMode, mag: FilterMode) {
        let Some(slot) = self.textures.get(&texture) else {
            return;
        };
        if slot.filter == (min, mag) {
            return;
        }
        let sampler = sampler(self.gpu.device(), &mut self.samplers, (min, mag));
        let bind_group =
            texture_bind_group(self.gpu.device(), &self.texture_layout, &slot.view, &sampler);
        if let Some(slot) = self.textures.get_mut(&texture) {
            slot.filter = (min, mag);
            slot.bind_group = bind_group;
        }
    }

    fn set_texture_tint(&mut self, texture: TextureHandle, tint: Color) {
        if let Some(slot) = self.textures.get_mut(&texture) {
            slot.tint = tint;
        }
    }

    fn clear(&mut self, color: Color) {
        let mut encoder = self.take_encoder();
        if let Some(target) = self.target_slot(self.target) {
            let _rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("vellum clear pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &target.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: color.r as f64,
                            g: color.g as f64,
                            b: color.b as f64,
                            a: color.a as f64,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });
        }
        self.encoder = Some(encoder);
    }

    fn draw_triangles(
        &mut self,
        texture: Option<TextureHandle>,
        vertices: &[Vertex],
        indices: &[u32],
    ) {
        if vertices.is_empty() || indices.len() < 3 {
            return;
        }

        let Some((format, size)) = self.target_slot(self.target).map(|s| (s.format, s.size()))
        else {
            return;
        };

        if let Some(h) = texture {
            if self.target == RenderTarget::Texture(h) {
                log::warn!(
                    "WgpuRasterizer: texture {} sampled while bound as target, skipping",
                    h.0
                );
                return;
            }
            if !self.textures.contains_key(&h) {
                log::debug!("WgpuRasterizer: draw with unknown texture {}, skipping", h.0);
                return;
            }
        }

        let scissor = match self.scissor {
            Some(s) => {
                let s = clamp_scissor(s, size);
                if s.is_empty() {
                    return;
                }
                Some(s)
            }
            None => None,
        };

        self.ensure_pipeline(format, self.blend);

        let tint = texture
            .and_then(|h| self.textures.get(&h))
            .map_or(Color::white(), |s| s.tint);
        let vertices: Cow<'_, [Vertex]> = if tint == Color::white() {
            Cow::Borrowed(vertices)
        } else {
            Cow::Owned(
                vertices
                    .iter()
                    .map(|v| {
                        let mut v = *v;
                        v.set_color(v.color().modulate(tint));
                        v
                    })
                    .collect(),
            )
        };

        let device = self.gpu.device();
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("vellum vbo"),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("vellum ibo"),
            contents: bytemuck::cast_slice(indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        let mut encoder = self.take_encoder();
        let source = match texture {
            Some(h) => self.textures.get(&h).unwrap_or(&self.white),
            None => &self.white,
        };
        self.encode_draw(
            &mut encoder,
            source,
            scissor,
            &vertex_buffer,
            &index_buffer,
            indices.len() as u32,
        );
        self.encoder = Some(encoder);
    }

    fn target_size(&self, target: RenderTarget) -> Option<(u32, u32)> {
        match target {
            RenderTarget::Screen => Some(self.screen.size()),
            RenderTarget::Texture(h) => self.textures.get(&h).map(Slot::size),
        }
    }
}

impl Drop for WgpuRasterizer {
    fn drop(&mut self) {
        self.flush();
    }
}

// ── resource helpers ──────────────────────────────────────────────────────

fn sampler(
    device: &wgpu::Device,
    cache: &mut HashMap<(FilterMode, FilterMode), wgpu::Sampler>,
    (min, mag): (FilterMode, FilterMode),
) -> wgpu::Sampler {
    cache
        .entry((min, mag))
        .or_insert_with(|| {
            device.create_sampler(&wgpu::SamplerDescriptor {
                label: Some("vellum sampler"),
                address_mode_u: wgpu::AddressMode::ClampToEdge,
                address_mode_v: wgpu::AddressMode::ClampToEdge,
                address_mode_w: wgpu::AddressMode::ClampToEdge,
                mag_filter: filter_mode(mag),
                min_filter: filter_mode(min),
                mipmap_filter: wgpu::MipmapFilterMode::Nearest,
                ..Default::default()
            })
        })
        .clone()
}

fn texture_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    view: &wgpu::TextureView,
    sampler: &wgpu::Sampler,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("vellum texture bind group"),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
    })
}

fn create_slot(
    device: &wgpu::Device,
    texture_layout: &wgpu::BindGroupLayout,
    viewport_layout: &wgpu::BindGroupLayout,
    samplers: &mut HashMap<(FilterMode, FilterMode), wgpu::Sampler>,
    desc: TextureDesc,
    format: wgpu::TextureFormat,
    label: &str,
) -> Slot {
    let mut usage = wgpu::TextureUsages::TEXTURE_BINDING
        | wgpu::TextureUsages::COPY_DST
        | wgpu::TextureUsages::COPY_SRC;
    if desc.render_target {
        usage |= wgpu::TextureUsages::RENDER_ATTACHMENT;
    }

    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size: wgpu::Extent3d {
            width: desc.width,
            height: desc.height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage,
        view_formats: &[],
    });
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

    let filter = (FilterMode::default(), FilterMode::default());
    let sampler = sampler(device, samplers, filter);
    let bind_group = texture_bind_group(device, texture_layout, &view, &sampler);

    let viewport = desc.render_target.then(|| {
        let ubo = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("vellum viewport ubo"),
            contents: bytemuck::bytes_of(&ViewportUniform::new(desc.width, desc.height)),
            usage: wgpu::BufferUsages::UNIFORM,
        });
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("vellum viewport bind group"),
            layout: viewport_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: ubo.as_entire_binding(),
            }],
        })
    });

    Slot {
        texture,
        view,
        desc,
        format,
        filter,
        tint: Color::white(),
        bind_group,
        viewport,
    }
}

fn upload(queue: &wgpu::Queue, slot: &Slot, pixels: &[u8]) {
    let bpp = slot.desc.format.bytes_per_pixel() as u32;
    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture: &slot.texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        pixels,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(slot.desc.width * bpp),
            rows_per_image: Some(slot.desc.height),
        },
        wgpu::Extent3d {
            width: slot.desc.width,
            height: slot.desc.height,
            depth_or_array_layers: 1,
        },
    );
}
