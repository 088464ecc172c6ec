//! Pipeline construction and the mappings from core types to wgpu.

use bytemuck::{Pod, Zeroable};

use crate::coords::ScissorRect;
use crate::paint::BlendMode;
use crate::raster::{FilterMode, PixelFormat, Vertex};

// ── viewport uniform ──────────────────────────────────────────────────────

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub(super) struct ViewportUniform {
    pub viewport: [f32; 2],
    pub _pad: [f32; 2], // 16-byte alignment
}

impl ViewportUniform {
    pub(super) fn new(width: u32, height: u32) -> Self {
        Self {
            viewport: [width.max(1) as f32, height.max(1) as f32],
            _pad: [0.0; 2],
        }
    }
}

// ── vertex layout ─────────────────────────────────────────────────────────

const VERTEX_ATTRS: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
    0 => Float32x2, // x, y
    1 => Float32x4, // r, g, b, a
    2 => Float32x2  // u, v
];

pub(super) fn vertex_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<Vertex>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &VERTEX_ATTRS,
    }
}

// ── mappings ──────────────────────────────────────────────────────────────

pub(super) fn texture_format(format: PixelFormat) -> wgpu::TextureFormat {
    match format {
        PixelFormat::Rgba8 => wgpu::TextureFormat::Rgba8Unorm,
        PixelFormat::Rgba16Float => wgpu::TextureFormat::Rgba16Float,
    }
}

pub(super) fn filter_mode(filter: FilterMode) -> wgpu::FilterMode {
    match filter {
        FilterMode::Linear => wgpu::FilterMode::Linear,
        FilterMode::Nearest => wgpu::FilterMode::Nearest,
    }
}

fn component(src: wgpu::BlendFactor, dst: wgpu::BlendFactor) -> wgpu::BlendComponent {
    wgpu::BlendComponent {
        src_factor: src,
        dst_factor: dst,
        operation: wgpu::BlendOperation::Add,
    }
}

/// Fixed-function blend for straight-alpha colors. `None` disables blending.
pub(super) fn blend_state(mode: BlendMode) -> Option<wgpu::BlendState> {
    use wgpu::BlendFactor as F;
    let state = match mode {
        BlendMode::Replace => return None,
        BlendMode::Alpha => wgpu::BlendState {
            color: component(F::SrcAlpha, F::OneMinusSrcAlpha),
            alpha: component(F::One, F::OneMinusSrcAlpha),
        },
        BlendMode::Add => wgpu::BlendState {
            color: component(F::SrcAlpha, F::One),
            alpha: component(F::Zero, F::One),
        },
        BlendMode::Multiply => wgpu::BlendState {
            color: component(F::Dst, F::Zero),
            alpha: component(F::DstAlpha, F::Zero),
        },
        BlendMode::Screen => wgpu::BlendState {
            color: component(F::One, F::OneMinusSrc),
            alpha: component(F::One, F::OneMinusSrcAlpha),
        },
    };
    Some(state)
}

/// Clamps `s` to a `width × height` target. wgpu rejects rects reaching outside it.
pub(super) fn clamp_scissor(s: ScissorRect, (width, height): (u32, u32)) -> ScissorRect {
    let x = s.x.min(width);
    let y = s.y.min(height);
    ScissorRect {
        x,
        y,
        width: s.width.min(width - x),
        height: s.height.min(height - y),
    }
}

// ── pipeline ──────────────────────────────────────────────────────────────

pub(super) fn create_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    format: wgpu::TextureFormat,
    blend: BlendMode,
) -> wgpu::RenderPipeline {
    log::debug!("WgpuRasterizer: building pipeline for {format:?} / {blend:?}");

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("vellum textured pipeline"),
        layout: Some(layout),

        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            compilation_options: Default::default(),
            buffers: &[vertex_layout()],
        },

        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: blend_state(blend),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),

        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },

        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview_mask: None,
        cache: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── blend ─────────────────────────────────────────────────────────────

    #[test]
    fn replace_disables_blending() {
        assert!(blend_state(BlendMode::Replace).is_none());
        for mode in BlendMode::ALL.into_iter().filter(|m| *m != BlendMode::Replace) {
            assert!(blend_state(mode).is_some(), "{mode:?}");
        }
    }

    #[test]
    fn multiply_scales_every_channel_by_destination() {
        let s = blend_state(BlendMode::Multiply).unwrap();
        assert_eq!(s.color.src_factor, wgpu::BlendFactor::Dst);
        assert_eq!(s.color.dst_factor, wgpu::BlendFactor::Zero);
        assert_eq!(s.alpha.src_factor, wgpu::BlendFactor::DstAlpha);
    }

    #[test]
    fn alpha_is_straight() {
        let s = blend_state(BlendMode::Alpha).unwrap();
        assert_eq!(s.color.src_factor, wgpu::BlendFactor::SrcAlpha);
        assert_eq!(s.color.dst_factor, wgpu::BlendFactor::OneMinusSrcAlpha);
    }

    #[test]
    fn add_keeps_destination_alpha() {
        let s = blend_state(BlendMode::Add).unwrap();
        assert_eq!(s.alpha.src_factor, wgpu::BlendFactor::Zero);
        assert_eq!(s.alpha.dst_factor, wgpu::BlendFactor::One);
    }

    // ── layout ────────────────────────────────────────────────────────────

    #[test]
    fn vertex_layout_matches_vertex() {
        let l = vertex_layout();
        assert_eq!(l.array_stride, 32);
        let offsets: Vec<u64> = l.attributes.iter().map(|a| a.offset).collect();
        assert_eq!(offsets, [0, 8, 24]);
        assert_eq!(std::mem::size_of::<ViewportUniform>(), 16);
    }

    #[test]
    fn formats_and_filters() {
        assert_eq!(texture_format(PixelFormat::Rgba8), wgpu::TextureFormat::Rgba8Unorm);
        assert_eq!(texture_format(PixelFormat::Rgba16Float), wgpu::TextureFormat::Rgba16Float);
        assert_eq!(filter_mode(FilterMode::Nearest), wgpu::FilterMode::Nearest);
    }

    // ── scissor ───────────────────────────────────────────────────────────

    #[test]
    fn scissor_clamped_to_target() {
        let s = ScissorRect { x: 90, y: 10, width: 50, height: 50 };
        assert_eq!(
            clamp_scissor(s, (100, 40)),
            ScissorRect { x: 90, y: 10, width: 10, height: 30 }
        );
        let outside = ScissorRect { x: 200, y: 0, width: 5, height: 5 };
        assert!(clamp_scissor(outside, (100, 100)).is_empty());
    }
}
