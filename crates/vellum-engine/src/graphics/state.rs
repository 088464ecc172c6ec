use crate::coords::ScissorRect;
use crate::config::RenderConfig;
use crate::paint::{BlendMode, Color};
use crate::tessellate::LineStyle;

/// What `RenderContext::push` saves.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum StackKind {
    /// Only the transform.
    #[default]
    Transform,
    /// The transform plus the whole [`GraphicsState`].
    All,
}

/// Drawing state that `push(StackKind::All)` saves and `pop` restores.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GraphicsState {
    pub color: Color,
    pub background: Color,
    pub line_width: f32,
    pub line_style: LineStyle,
    pub point_size: f32,
    pub blend: BlendMode,
    /// Clip rectangle in target pixels; `None` disables clipping.
    pub scissor: Option<ScissorRect>,
}

impl GraphicsState {
    pub fn from_config(config: &RenderConfig) -> Self {
        Self {
            color: Color::white(),
            background: Color::black(),
            line_width: config.line_width,
            line_style: config.line_style,
            point_size: config.point_size,
            blend: BlendMode::Alpha,
            scissor: None,
        }
    }
}

impl Default for GraphicsState {
    fn default() -> Self {
        Self::from_config(&RenderConfig::default())
    }
}
