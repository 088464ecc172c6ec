use std::borrow::Cow;

use crate::batch::{Quad, SpriteBatch};
use crate::canvas::{
    Canvas, CompareMode, RenderTargetStack, StencilAction, StencilEmulator, StencilTest,
};
use crate::config::RenderConfig;
use crate::coords::{Rect, ScissorRect, Vec2};
use crate::paint::{BlendMode, Color};
use crate::raster::{QUAD_INDICES, Rasterizer, Texture, TextureHandle, Vertex};
use crate::scene::DrawCmd;
use crate::tessellate::{self, ArcType, DrawMode, Geometry, LineStyle, shapes};
use crate::transform::{AffineMatrix, Placement, TransformStack};

use super::{Drawable, GraphicsError, GraphicsState, Image, ImageData, StackKind};

/// Immediate-mode drawing context over one [`Rasterizer`].
///
/// Owns the transform stack, the graphics state, the active render target and
/// the stencil emulator. Every drawing call tessellates on the CPU and issues
/// exactly one rasterizer draw, in call order.
///
/// Without a backend every drawing call is a no-op and resource creation
/// returns [`GraphicsError::NoBackend`]. Helper canvases created for stencil
/// emulation are released on [`detach`](Self::detach), [`shutdown`](Self::shutdown)
/// and drop.
pub struct RenderContext<R: Rasterizer> {
    backend: Option<R>,
    config: RenderConfig,

    transform: TransformStack,
    state: GraphicsState,
    /// Parallel to the transform stack; `Some` for `StackKind::All` pushes.
    saved_states: Vec<Option<GraphicsState>>,

    targets: RenderTargetStack,
    stencil: StencilEmulator,
}

impl<R: Rasterizer> RenderContext<R> {
    /// A context with no backend attached.
    pub fn new(config: RenderConfig) -> Self {
        Self {
            backend: None,
            state: GraphicsState::from_config(&config),
            stencil: StencilEmulator::new(config.eager_inverse_mask),
            config,
            transform: TransformStack::new(),
            saved_states: Vec::new(),
            targets: RenderTargetStack::new(),
        }
    }

    pub fn with_backend(backend: R, config: RenderConfig) -> Self {
        let mut ctx = Self::new(config);
        ctx.attach(backend);
        ctx
    }

    /// Attaches `backend`, returning the previous one (detached first).
    pub fn attach(&mut self, backend: R) -> Option<R> {
        let previous = self.detach();
        self.backend = Some(backend);
        self.resync();
        previous
    }

    /// Releases stencil helpers on the backend and hands it back.
    ///
    /// Canvases belong to the returned backend, so the target falls back to the screen.
    pub fn detach(&mut self) -> Option<R> {
        let mut r = self.backend.take()?;
        self.stencil.release(&mut r);
        self.targets = RenderTargetStack::new();
        Some(r)
    }

    /// Releases stencil helpers and ends any test without compositing.
    pub fn shutdown(&mut self) {
        if let Some(r) = self.backend.as_mut() {
            self.stencil.release(r);
        }
    }

    #[inline]
    pub fn has_backend(&self) -> bool {
        self.backend.is_some()
    }

    #[inline]
    pub fn backend(&self) -> Option<&R> {
        self.backend.as_ref()
    }

    #[inline]
    pub fn backend_mut(&mut self) -> Option<&mut R> {
        self.backend.as_mut()
    }

    #[inline]
    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    // ── transform ─────────────────────────────────────────────────────────

    /// Saves the transform, plus the graphics state for [`StackKind::All`].
    ///
    /// Ignored once `max_stack_depth` pushes are outstanding.
    pub fn push(&mut self, kind: StackKind) {
        if self.transform.stack_depth() >= self.config.max_stack_depth {
            log::warn!(
                "RenderContext::push: stack depth {} reached, push ignored",
                self.config.max_stack_depth
            );
            return;
        }
        self.transform.push();
        self.saved_states.push(match kind {
            StackKind::Transform => None,
            StackKind::All => Some(self.state),
        });
    }

    /// Restores the last push. Underflow leaves everything unchanged.
    pub fn pop(&mut self) {
        if !self.transform.pop() {
            log::debug!("RenderContext::pop: stack underflow");
            return;
        }
        if let Some(Some(saved)) = self.saved_states.pop() {
            self.state = saved;
            self.apply_blend();
            self.apply_scissor();
        }
    }

    #[inline]
    pub fn stack_depth(&self) -> usize {
        self.transform.stack_depth()
    }

    #[inline]
    pub fn translate(&mut self, x: f32, y: f32) {
        self.transform.translate(x, y);
    }

    #[inline]
    pub fn rotate(&mut self, radians: f32) {
        self.transform.rotate(radians);
    }

    #[inline]
    pub fn scale(&mut self, sx: f32, sy: f32) {
        self.transform.scale(sx, sy);
    }

    /// Scales both axes by `s`.
    #[inline]
    pub fn scale_uniform(&mut self, s: f32) {
        self.transform.scale_uniform(s);
    }

    #[inline]
    pub fn shear(&mut self, kx: f32, ky: f32) {
        self.transform.shear(kx, ky);
    }

    /// Resets the transform to identity without touching the stack.
    #[inline]
    pub fn origin(&mut self) {
        self.transform.reset();
    }

    #[inline]
    pub fn apply_transform(&mut self, m: AffineMatrix) {
        self.transform.apply(m);
    }

    #[inline]
    pub fn replace_transform(&mut self, m: AffineMatrix) {
        self.transform.replace(m);
    }

    #[inline]
    pub fn transform(&self) -> AffineMatrix {
        self.transform.current()
    }

    #[inline]
    pub fn transform_point(&self, x: f32, y: f32) -> Vec2 {
        self.transform.transform_point(x, y)
    }

    #[inline]
    pub fn inverse_transform_point(&self, x: f32, y: f32) -> Vec2 {
        self.transform.inverse_transform_point(x, y)
    }

    // ── state ─────────────────────────────────────────────────────────────

    #[inline]
    pub fn state(&self) -> &GraphicsState {
        &self.state
    }

    #[inline]
    pub fn set_color(&mut self, color: Color) {
        self.state.color = color;
    }

    #[inline]
    pub fn color(&self) -> Color {
        self.state.color
    }

    #[inline]
    pub fn set_background_color(&mut self, color: Color) {
        self.state.background = color;
    }

    #[inline]
    pub fn background_color(&self) -> Color {
        self.state.background
    }

    /// Negative or non-finite widths are ignored.
    pub fn set_line_width(&mut self, width: f32) {
        if width.is_finite() && width >= 0.0 {
            self.state.line_width = width;
        }
    }

    #[inline]
    pub fn line_width(&self) -> f32 {
        self.state.line_width
    }

    #[inline]
    pub fn set_line_style(&mut self, style: LineStyle) {
        self.state.line_style = style;
    }

    #[inline]
    pub fn line_style(&self) -> LineStyle {
        self.state.line_style
    }

    pub fn set_point_size(&mut self, size: f32) {
        if size.is_finite() && size >= 0.0 {
            self.state.point_size = size;
        }
    }

    #[inline]
    pub fn point_size(&self) -> f32 {
        self.state.point_size
    }

    pub fn set_blend_mode(&mut self, mode: BlendMode) {
        self.state.blend = mode;
        self.apply_blend();
    }

    #[inline]
    pub fn blend_mode(&self) -> BlendMode {
        self.state.blend
    }

    /// Pixel size of the active target.
    pub fn dimensions(&self) -> (u32, u32) {
        if let Some(c) = self.targets.active() {
            return (c.width(), c.height());
        }
        self.backend
            .as_ref()
            .and_then(|r| r.target_size(self.targets.target()))
            .unwrap_or((self.config.screen_width, self.config.screen_height))
    }

    // ── scissor ───────────────────────────────────────────────────────────

    /// Clips to `rect` in target pixels (transform ignored); `None` disables clipping.
    pub fn set_scissor(&mut self, rect: Option<Rect>) {
        let (w, h) = self.dimensions();
        self.state.scissor = rect.map(|r| r.to_scissor(w, h));
        self.apply_scissor();
    }

    /// Narrows the scissor to its intersection with `rect`.
    pub fn intersect_scissor(&mut self, rect: Rect) {
        let (w, h) = self.dimensions();
        let next = match self.state.scissor {
            None => rect.to_scissor(w, h),
            Some(cur) => {
                let cur_rect =
                    Rect::new(cur.x as f32, cur.y as f32, cur.width as f32, cur.height as f32);
                match cur_rect.intersect(rect) {
                    Some(i) => i.to_scissor(w, h),
                    None => ScissorRect { width: 0, height: 0, ..cur },
                }
            }
        };
        self.state.scissor = Some(next);
        self.apply_scissor();
    }

    #[inline]
    pub fn scissor(&self) -> Option<ScissorRect> {
        self.state.scissor
    }

    // ── clearing ──────────────────────────────────────────────────────────

    /// Fills the active target; `None` uses the background color.
    ///
    /// Ignored while a stencil mask is being recorded.
    pub fn clear(&mut self, color: Option<Color>) {
        if self.stencil.is_recording() {
            log::debug!("RenderContext::clear: ignored while recording a stencil");
            return;
        }
        let color = color.unwrap_or(self.state.background);
        if let Some(r) = self.backend.as_mut() {
            r.clear(color);
        }
    }

    // ── shapes ────────────────────────────────────────────────────────────

    pub fn rectangle(&mut self, mode: DrawMode, x: f32, y: f32, w: f32, h: f32) {
        let corners = shapes::rectangle(x, y, w, h);
        match mode {
            DrawMode::Fill => {
                let m = self.transform.current();
                let pts = if m.is_identity() {
                    corners
                } else {
                    corners.map(|p| m.transform_point(p))
                };
                let color = self.state.color;
                let verts = pts.map(|p| Vertex::colored(p, color));
                self.submit(None, &verts, &QUAD_INDICES);
            }
            DrawMode::Line => self.stroke(&corners, true),
        }
    }

    /// `segments = None` picks a count from the radius.
    #[inline]
    pub fn circle(&mut self, mode: DrawMode, x: f32, y: f32, radius: f32, segments: Option<usize>) {
        self.ellipse(mode, x, y, radius, radius, segments);
    }

    pub fn ellipse(
        &mut self,
        mode: DrawMode,
        x: f32,
        y: f32,
        rx: f32,
        ry: f32,
        segments: Option<usize>,
    ) {
        let center = Vec2::new(x, y);
        match mode {
            DrawMode::Fill => self.fill_fan(&shapes::ellipse_fan(center, rx, ry, segments)),
            DrawMode::Line => {
                let outline = shapes::ellipse_outline(center, rx, ry, segments);
                self.stroke(&outline.points, outline.closed);
            }
        }
    }

    /// Arc from `start` to `end` radians, clockwise for increasing angles.
    #[allow(clippy::too_many_arguments)]
    pub fn arc(
        &mut self,
        mode: DrawMode,
        arc_type: ArcType,
        x: f32,
        y: f32,
        radius: f32,
        start: f32,
        end: f32,
        segments: Option<usize>,
    ) {
        let center = Vec2::new(x, y);
        match mode {
            DrawMode::Fill => {
                self.fill_fan(&shapes::arc_fan(arc_type, center, radius, start, end, segments))
            }
            DrawMode::Line => {
                let outline = shapes::arc_outline(arc_type, center, radius, start, end, segments);
                self.stroke(&outline.points, outline.closed);
            }
        }
    }

    /// Filled polygons use a fan when convex and ear clipping otherwise.
    pub fn polygon(&mut self, mode: DrawMode, points: &[Vec2]) {
        match mode {
            DrawMode::Fill => {
                if points.len() < 3 {
                    log::debug!("RenderContext::polygon: {} points, nothing to fill", points.len());
                    return;
                }
                let indices = tessellate::fill_indices(points, self.config.ear_clip_start);
                let pts = self.to_device(points);
                let mut geo = Geometry::with_capacity(pts.len(), indices.len());
                geo.push_triangles(&pts, &indices, self.state.color);
                self.submit_geometry(None, &geo);
            }
            DrawMode::Line => self.stroke(points, true),
        }
    }

    /// Open polyline.
    #[inline]
    pub fn line(&mut self, points: &[Vec2]) {
        self.stroke(points, false);
    }

    /// One square of `point_size` target pixels per point.
    pub fn points(&mut self, points: &[Vec2]) {
        let half = self.state.point_size * 0.5;
        let color = self.state.color;
        let mut geo = Geometry::with_capacity(points.len() * 4, points.len() * 6);
        for p in self.to_device(points) {
            let corners = shapes::rectangle(p.x - half, p.y - half, half * 2.0, half * 2.0);
            geo.push_quad(corners, [[0.0; 2]; 4], color);
        }
        self.submit_geometry(None, &geo);
    }

    fn fill_fan(&mut self, local: &[Vec2]) {
        if local.len() < 3 {
            return;
        }
        let pts = self.to_device(local);
        let mut geo = Geometry::with_capacity(pts.len(), (pts.len() - 2) * 3);
        geo.push_fan(&pts, self.state.color);
        self.submit_geometry(None, &geo);
    }

    /// Strokes after the transform so the width stays in target pixels.
    fn stroke(&mut self, local: &[Vec2], closed: bool) {
        let pts = self.to_device(local);
        let geo = tessellate::build_line(
            &pts,
            closed,
            self.state.line_width,
            self.state.line_style,
            self.config.line_fringe,
            self.state.color,
        );
        self.submit_geometry(None, &geo);
    }

    fn to_device(&self, local: &[Vec2]) -> Vec<Vec2> {
        let m = self.transform.current();
        if m.is_identity() {
            return local.to_vec();
        }
        local.iter().map(|&p| m.transform_point(p)).collect()
    }

    // ── drawables ─────────────────────────────────────────────────────────

    /// Draws `drawable` at `placement`, composed with the current transform.
    ///
    /// The current color tints the result.
    pub fn draw<'a>(&mut self, drawable: impl Into<Drawable<'a>>, placement: Placement) {
        let m = self.transform.current() * placement.matrix();
        match drawable.into() {
            Drawable::Image(img) => {
                let t = img.texture();
                self.draw_textured_quad(t, &Quad::full(&t), &m);
            }
            Drawable::Canvas(c) => {
                if self.targets.active() == Some(*c) {
                    log::debug!("RenderContext::draw: canvas cannot be drawn onto itself");
                    return;
                }
                let t = c.texture();
                self.draw_textured_quad(t, &Quad::full(&t), &m);
            }
            Drawable::SpriteBatch(batch) => self.draw_batch(batch, &m),
            Drawable::Text(text) => self.draw_batch(text.batch(), &m),
            Drawable::Mesh(mesh) => {
                let data = mesh.draw_data(self.state.point_size);
                let vertices = transformed(data.vertices, &m);
                self.submit_tinted(mesh.texture().map(|t| t.handle), &vertices, &data.indices);
            }
            Drawable::ParticleSystem(ps) => {
                let mut geo = ps.draw_data();
                geo.transform(&m);
                self.submit_tinted(Some(ps.texture().handle), &geo.vertices, &geo.indices);
            }
        }
    }

    /// Draws the `quad` region of an image. Other drawables ignore the call.
    pub fn draw_quad<'a>(
        &mut self,
        drawable: impl Into<Drawable<'a>>,
        quad: &Quad,
        placement: Placement,
    ) {
        match drawable.into() {
            Drawable::Image(img) => {
                let m = self.transform.current() * placement.matrix();
                self.draw_textured_quad(img.texture(), quad, &m);
            }
            other => log::debug!("RenderContext::draw_quad: {} does not take a quad", other.kind()),
        }
    }

    fn draw_textured_quad(&mut self, texture: Texture, quad: &Quad, m: &AffineMatrix) {
        let color = self.state.color;
        let mut verts = [Vertex::default(); 4];
        for ((v, p), uv) in verts.iter_mut().zip(quad.corners()).zip(quad.uvs()) {
            let p = m.transform_point(p);
            *v = Vertex::new(p.x, p.y, uv[0], uv[1], color);
        }
        self.submit(Some(texture.handle), &verts, &QUAD_INDICES);
    }

    fn draw_batch(&mut self, batch: &SpriteBatch, m: &AffineMatrix) {
        let vertices = batch.transformed_vertices(m);
        self.submit_tinted(Some(batch.texture().handle), &vertices, batch.indices());
    }

    // ── canvases and images ───────────────────────────────────────────────

    pub fn new_canvas(&mut self, width: u32, height: u32) -> Result<Canvas, GraphicsError> {
        let r = self.backend.as_mut().ok_or(GraphicsError::NoBackend)?;
        Canvas::create(r, width, height).map_err(|e| {
            log::warn!("RenderContext::new_canvas: {width}×{height} failed: {e}");
            e.into()
        })
    }

    pub fn new_image(&mut self, data: &ImageData) -> Result<Image, GraphicsError> {
        let r = self.backend.as_mut().ok_or(GraphicsError::NoBackend)?;
        Image::create(r, data).map_err(|e| {
            log::warn!("RenderContext::new_image: {e}");
            e.into()
        })
    }

    pub fn release_image(&mut self, image: &Image) {
        if let Some(r) = self.backend.as_mut() {
            image.release(r);
        }
    }

    /// Makes `canvas` (or the screen for `None`) the active target.
    ///
    /// An enabled stencil test is composited and ended first. Ignored while a
    /// stencil mask is being recorded.
    pub fn set_canvas(&mut self, canvas: Option<Canvas>) {
        if self.stencil.is_recording() {
            log::warn!("RenderContext::set_canvas: ignored while recording a stencil");
            return;
        }
        self.end_stencil_test();
        self.targets.set(canvas);
        self.resync();
    }

    #[inline]
    pub fn canvas(&self) -> Option<Canvas> {
        self.targets.active()
    }

    /// Runs `draw` with `canvas` active, then restores the previous target.
    pub fn render_to<F: FnOnce(&mut Self)>(&mut self, canvas: Canvas, draw: F) {
        if self.stencil.is_recording() {
            log::warn!("RenderContext::render_to: ignored while recording a stencil");
            return;
        }
        self.end_stencil_test();
        self.targets.push(Some(canvas));
        self.resync();

        draw(self);

        self.end_stencil_test();
        self.targets.pop();
        self.resync();
    }

    /// Releases `canvas`. If it is active, drawing falls back to the screen.
    pub fn release_canvas(&mut self, canvas: &Canvas) {
        if self.targets.active() == Some(*canvas) {
            self.end_stencil_test();
        }
        self.targets.forget(canvas.texture().handle);
        if let Some(r) = self.backend.as_mut() {
            canvas.release(r);
        }
        self.resync();
    }

    // ── stencil ───────────────────────────────────────────────────────────

    /// Records the draws made by `draw` as the stencil mask.
    ///
    /// Covered pixels take the value `action` produces from `value`. Unless
    /// `keep`, the previous mask is discarded first.
    pub fn stencil<F: FnOnce(&mut Self)>(
        &mut self,
        draw: F,
        action: StencilAction,
        value: u8,
        keep: bool,
    ) {
        if self.stencil.is_recording() {
            log::warn!("RenderContext::stencil: already recording, nested call ignored");
            return;
        }
        let size = self.dimensions();
        let Some(r) = self.backend.as_mut() else {
            log::debug!("RenderContext::stencil: no backend");
            return;
        };
        if let Err(e) = self.stencil.begin_recording(r, size, keep) {
            log::warn!("RenderContext::stencil: mask canvas unavailable: {e}");
            self.resync();
            return;
        }

        draw(self);

        if let Some(r) = self.backend.as_mut() {
            self.stencil.end_recording(r, action, value);
        }
        self.resync();
    }

    /// Enables (`Some`) or disables (`None`) the stencil test.
    ///
    /// While enabled, drawing is captured; disabling composites it onto the
    /// target that was active when the test began.
    pub fn set_stencil_test(&mut self, test: Option<(CompareMode, u8)>) {
        if self.stencil.is_recording() {
            log::warn!("RenderContext::set_stencil_test: ignored while recording a stencil");
            return;
        }
        match test {
            None => self.end_stencil_test(),
            Some((compare, reference)) => {
                let size = self.dimensions();
                let destination = self.targets.target();
                let Some(r) = self.backend.as_mut() else {
                    return;
                };
                let test = StencilTest::new(compare, reference);
                if let Err(e) = self.stencil.enable_test(r, test, destination, size) {
                    log::warn!("RenderContext::set_stencil_test: content canvas unavailable: {e}");
                }
            }
        }
        self.resync();
    }

    pub fn stencil_test(&self) -> Option<(CompareMode, u8)> {
        self.stencil.test().map(|t| (t.compare, t.reference))
    }

    fn end_stencil_test(&mut self) {
        if self.stencil.test().is_none() {
            return;
        }
        let Some(r) = self.backend.as_mut() else {
            return;
        };
        if let Err(e) = self.stencil.finish_test(r) {
            log::warn!("RenderContext: stencil composite failed: {e}");
        }
        self.resync();
    }

    // ── submission ────────────────────────────────────────────────────────

    fn submit_geometry(&mut self, texture: Option<TextureHandle>, geo: &Geometry) {
        self.submit(texture, &geo.vertices, &geo.indices);
    }

    /// Multiplies the current color into pre-colored vertices before submitting.
    fn submit_tinted(
        &mut self,
        texture: Option<TextureHandle>,
        vertices: &[Vertex],
        indices: &[u32],
    ) {
        let tint = self.state.color;
        if tint == Color::white() {
            self.submit(texture, vertices, indices);
            return;
        }
        let tinted: Vec<Vertex> = vertices
            .iter()
            .map(|v| {
                let mut v = *v;
                v.set_color(v.color().modulate(tint));
                v
            })
            .collect();
        self.submit(texture, &tinted, indices);
    }

    fn submit(&mut self, texture: Option<TextureHandle>, vertices: &[Vertex], indices: &[u32]) {
        if indices.len() < 3 || vertices.is_empty() {
            return;
        }
        let Some(r) = self.backend.as_mut() else {
            log::debug!("RenderContext: no backend, draw dropped");
            return;
        };
        if self.stencil.is_recording() {
            let cmd = DrawCmd::new(texture, vertices, indices);
            cmd.issue(r, Some(Color::white()));
            self.stencil.record(cmd, self.state.scissor);
        } else {
            r.draw_triangles(texture, vertices, indices);
        }
    }

    /// Pushes target, blend mode and scissor to the backend.
    fn resync(&mut self) {
        let target = self.stencil.redirect(self.targets.target());
        let blend = self.effective_blend();
        let scissor = self.state.scissor;
        if let Some(r) = self.backend.as_mut() {
            r.bind_render_target(target);
            r.set_blend_mode(blend);
            r.set_scissor(scissor);
        }
    }

    #[inline]
    fn effective_blend(&self) -> BlendMode {
        if self.stencil.is_recording() { BlendMode::Replace } else { self.state.blend }
    }

    fn apply_blend(&mut self) {
        let blend = self.effective_blend();
        if let Some(r) = self.backend.as_mut() {
            r.set_blend_mode(blend);
        }
    }

    fn apply_scissor(&mut self) {
        let scissor = self.state.scissor;
        if let Some(r) = self.backend.as_mut() {
            r.set_scissor(scissor);
        }
    }
}

impl<R: Rasterizer> Drop for RenderContext<R> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Maps vertices through `m`, borrowing when it is the identity.
fn transformed<'v>(vertices: Cow<'v, [Vertex]>, m: &AffineMatrix) -> Cow<'v, [Vertex]> {
    if m.is_identity() {
        return vertices;
    }
    Cow::Owned(vertices.iter().map(|v| v.transformed(m)).collect())
}
