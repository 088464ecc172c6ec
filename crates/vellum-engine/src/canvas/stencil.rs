use crate::coords::ScissorRect;
use crate::paint::{BlendMode, Color};
use crate::raster::{RasterError, Rasterizer, RenderTarget};
use crate::scene::{CommandList, DrawCmd};

use super::Canvas;

/// Comparison between the stencil value of a pixel and the reference value.
///
/// A pixel passes when `stencil <op> reference` holds.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum CompareMode {
    Never,
    Less,
    LessEqual,
    Equal,
    NotEqual,
    GreaterEqual,
    Greater,
    Always,
}

impl CompareMode {
    #[inline]
    pub fn passes(self, stencil: u8, reference: u8) -> bool {
        match self {
            CompareMode::Never => false,
            CompareMode::Less => stencil < reference,
            CompareMode::LessEqual => stencil <= reference,
            CompareMode::Equal => stencil == reference,
            CompareMode::NotEqual => stencil != reference,
            CompareMode::GreaterEqual => stencil >= reference,
            CompareMode::Greater => stencil > reference,
            CompareMode::Always => true,
        }
    }
}

/// What drawing the mask does to the stencil value of covered pixels.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum StencilAction {
    #[default]
    Replace,
    Increment,
    Decrement,
    IncrementWrap,
    DecrementWrap,
    Invert,
}

impl StencilAction {
    /// Stencil value of covered pixels, starting from a cleared (zero) buffer.
    #[inline]
    pub fn mask_value(self, value: u8) -> u8 {
        match self {
            StencilAction::Replace => value,
            StencilAction::Increment | StencilAction::IncrementWrap => 1,
            StencilAction::Decrement => 0,
            StencilAction::DecrementWrap | StencilAction::Invert => u8::MAX,
        }
    }
}

/// An enabled stencil test.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct StencilTest {
    pub compare: CompareMode,
    pub reference: u8,
}

impl StencilTest {
    #[inline]
    pub const fn new(compare: CompareMode, reference: u8) -> Self {
        Self { compare, reference }
    }

    /// Decides how content is composited.
    ///
    /// Pixels covered by the mask hold `mask_value`, the rest hold 0. `None`
    /// means nothing was drawn into the mask.
    pub fn classify(&self, mask_value: Option<u8>) -> TestOutcome {
        let outside = self.compare.passes(0, self.reference);
        let inside = mask_value.map_or(outside, |v| self.compare.passes(v, self.reference));
        match (inside, outside) {
            (true, true) => TestOutcome::Direct,
            (false, false) => TestOutcome::Nothing,
            (true, false) => TestOutcome::Masked(MaskPolarity::Normal),
            (false, true) => TestOutcome::Masked(MaskPolarity::Inverted),
        }
    }
}

/// Which side of the recorded mask keeps content.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum MaskPolarity {
    /// Where the mask was drawn.
    Normal,
    /// Where the mask was not drawn.
    Inverted,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum TestOutcome {
    Nothing,
    Direct,
    Masked(MaskPolarity),
}

#[derive(Debug, Copy, Clone)]
struct ActiveTest {
    test: StencilTest,
    destination: RenderTarget,
}

/// Stencil testing emulated with three helper canvases.
///
/// - mask: opaque white where the stencil shape was drawn, transparent elsewhere
/// - inverse: the opposite, built from the recorded commands on first need
///   (or right after recording when eager)
/// - content: everything drawn while a test is enabled
///
/// Ending a test multiplies the chosen mask onto the content, then draws the
/// content onto the target that was active when the test began. The helpers
/// are sized to the target and recreated when that size changes.
#[derive(Debug, Default)]
pub struct StencilEmulator {
    mask: Option<Canvas>,
    inverse: Option<Canvas>,
    content: Option<Canvas>,

    recorded: CommandList,
    mask_value: Option<u8>,
    inverse_valid: bool,
    eager_inverse: bool,

    recording: bool,
    test: Option<ActiveTest>,
}

impl StencilEmulator {
    pub fn new(eager_inverse: bool) -> Self {
        Self { eager_inverse, ..Self::default() }
    }

    #[inline]
    pub fn is_recording(&self) -> bool {
        self.recording
    }

    /// The enabled test, if any.
    #[inline]
    pub fn test(&self) -> Option<StencilTest> {
        self.test.map(|t| t.test)
    }

    /// Recorded mask draw calls.
    #[inline]
    pub fn recorded(&self) -> &CommandList {
        &self.recorded
    }

    /// Target draws should physically land on, given the logical target.
    pub fn redirect(&self, logical: RenderTarget) -> RenderTarget {
        if self.recording {
            if let Some(mask) = self.mask {
                return mask.target();
            }
        }
        if self.test.is_some() {
            if let Some(content) = self.content {
                return content.target();
            }
        }
        logical
    }

    /// Redirects drawing into the mask.
    ///
    /// Unless `keep`, the mask is cleared and previously recorded commands are
    /// dropped. Leaves the mask bound with `Replace` blending.
    pub fn begin_recording<R: Rasterizer + ?Sized>(
        &mut self,
        r: &mut R,
        size: (u32, u32),
        keep: bool,
    ) -> Result<(), RasterError> {
        let recreated = ensure_canvas(&mut self.mask, r, size)?;
        let Some(mask) = self.mask else { return Ok(()) };

        r.bind_render_target(mask.target());
        if !keep || recreated {
            r.clear(Color::transparent());
            self.recorded.clear();
            self.mask_value = None;
        }
        r.set_blend_mode(BlendMode::Replace);

        self.recording = true;
        self.inverse_valid = false;
        Ok(())
    }

    /// Captures one mask draw. Ignored when not recording.
    pub fn record(&mut self, cmd: DrawCmd, scissor: Option<ScissorRect>) {
        if self.recording {
            self.recorded.push(cmd, scissor);
        }
    }

    /// Stops recording. The caller rebinds its target afterwards.
    pub fn end_recording<R: Rasterizer + ?Sized>(
        &mut self,
        r: &mut R,
        action: StencilAction,
        value: u8,
    ) {
        if !self.recording {
            return;
        }
        self.recording = false;
        self.mask_value = Some(action.mask_value(value));

        if self.eager_inverse {
            if let Err(e) = self.ensure_inverse(r) {
                log::warn!("StencilEmulator: eager inverse mask failed: {e}");
            }
        }
    }

    /// Starts capturing content for `test`. An already enabled test is
    /// composited first.
    pub fn enable_test<R: Rasterizer + ?Sized>(
        &mut self,
        r: &mut R,
        test: StencilTest,
        destination: RenderTarget,
        size: (u32, u32),
    ) -> Result<(), RasterError> {
        self.finish_test(r)?;

        ensure_canvas(&mut self.content, r, size)?;
        let Some(content) = self.content else { return Ok(()) };

        r.bind_render_target(content.target());
        r.set_scissor(None);
        r.clear(Color::transparent());
        self.test = Some(ActiveTest { test, destination });
        Ok(())
    }

    /// Composites captured content onto the destination and disables the test.
    ///
    /// Leaves the destination bound; blend mode and scissor are left changed.
    pub fn finish_test<R: Rasterizer + ?Sized>(&mut self, r: &mut R) -> Result<(), RasterError> {
        let Some(active) = self.test.take() else {
            return Ok(());
        };
        let Some(content) = self.content else {
            r.bind_render_target(active.destination);
            return Ok(());
        };

        r.set_scissor(None);
        let outcome = active.test.classify(self.mask_value);
        log::debug!("StencilEmulator: finishing {:?} -> {outcome:?}", active.test);

        match outcome {
            TestOutcome::Nothing => {}
            TestOutcome::Direct => {
                r.bind_render_target(active.destination);
                r.set_blend_mode(BlendMode::Alpha);
                content.blit(r, Color::white());
            }
            TestOutcome::Masked(polarity) => {
                let mask = match polarity {
                    MaskPolarity::Normal => self.mask,
                    MaskPolarity::Inverted => {
                        self.ensure_inverse(r)?;
                        self.inverse
                    }
                };
                if let Some(mask) = mask {
                    r.bind_render_target(content.target());
                    r.set_blend_mode(BlendMode::Multiply);
                    mask.blit(r, Color::white());
                }
                r.bind_render_target(active.destination);
                r.set_blend_mode(BlendMode::Alpha);
                content.blit(r, Color::white());
            }
        }

        r.bind_render_target(active.destination);
        Ok(())
    }

    /// Builds the inverted mask by replaying the recorded commands as
    /// transparent onto white. No-op when already current.
    fn ensure_inverse<R: Rasterizer + ?Sized>(&mut self, r: &mut R) -> Result<(), RasterError> {
        if self.inverse_valid {
            return Ok(());
        }
        let size = self.mask.map_or((1, 1), |m| (m.width(), m.height()));
        ensure_canvas(&mut self.inverse, r, size)?;
        let Some(inverse) = self.inverse else { return Ok(()) };

        r.bind_render_target(inverse.target());
        r.set_scissor(None);
        r.clear(Color::white());
        r.set_blend_mode(BlendMode::Replace);
        self.recorded.replay(r, Some(Color::transparent()));

        self.inverse_valid = true;
        Ok(())
    }

    /// Releases every helper canvas and resets all state.
    pub fn release<R: Rasterizer + ?Sized>(&mut self, r: &mut R) {
        let helpers = [self.mask.take(), self.inverse.take(), self.content.take()];
        for canvas in helpers.into_iter().flatten() {
            canvas.release(r);
        }
        self.recorded.clear();
        self.mask_value = None;
        self.inverse_valid = false;
        self.recording = false;
        self.test = None;
    }
}

/// Makes `slot` hold a canvas of `size`. Returns `true` when a new one was created.
fn ensure_canvas<R: Rasterizer + ?Sized>(
    slot: &mut Option<Canvas>,
    r: &mut R,
    (width, height): (u32, u32),
) -> Result<bool, RasterError> {
    if let Some(c) = slot {
        if c.width() == width && c.height() == height {
            return Ok(false);
        }
        c.release(r);
        *slot = None;
    }
    *slot = Some(Canvas::create(r, width, height)?);
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::{RasterCmd, RecordingRasterizer, Vertex};

    fn tri() -> DrawCmd {
        DrawCmd::new(None, &[Vertex::default(); 3], &[0, 1, 2])
    }

    fn record_mask(s: &mut StencilEmulator, r: &mut RecordingRasterizer) {
        s.begin_recording(r, (64, 64), false).unwrap();
        let cmd = tri();
        cmd.issue(r, None);
        s.record(cmd, None);
        s.end_recording(r, StencilAction::Replace, 1);
    }

    fn test_screen(
        s: &mut StencilEmulator,
        r: &mut RecordingRasterizer,
        compare: CompareMode,
        reference: u8,
    ) {
        let test = StencilTest::new(compare, reference);
        s.enable_test(r, test, RenderTarget::Screen, (64, 64)).unwrap();
    }

    // ── classification ────────────────────────────────────────────────────

    #[test]
    fn equal_zero_selects_inverted_mask() {
        let t = StencilTest::new(CompareMode::Equal, 0);
        assert_eq!(t.classify(Some(1)), TestOutcome::Masked(MaskPolarity::Inverted));
    }

    #[test]
    fn greater_zero_selects_normal_mask() {
        let t = StencilTest::new(CompareMode::Greater, 0);
        assert_eq!(t.classify(Some(1)), TestOutcome::Masked(MaskPolarity::Normal));
    }

    #[test]
    fn always_and_never_bypass() {
        assert_eq!(StencilTest::new(CompareMode::Always, 3).classify(Some(1)), TestOutcome::Direct);
        assert_eq!(StencilTest::new(CompareMode::Never, 0).classify(Some(1)), TestOutcome::Nothing);
    }

    #[test]
    fn general_reference_values() {
        let t = StencilTest::new(CompareMode::Equal, 2);
        assert_eq!(t.classify(Some(2)), TestOutcome::Masked(MaskPolarity::Normal));
        assert_eq!(t.classify(Some(1)), TestOutcome::Nothing);

        let t = StencilTest::new(CompareMode::GreaterEqual, 0);
        assert_eq!(t.classify(Some(1)), TestOutcome::Direct);

        let t = StencilTest::new(CompareMode::Less, 1);
        assert_eq!(t.classify(Some(StencilAction::Decrement.mask_value(7))), TestOutcome::Direct);
        assert_eq!(
            t.classify(Some(StencilAction::Invert.mask_value(7))),
            TestOutcome::Masked(MaskPolarity::Inverted)
        );
    }

    #[test]
    fn empty_mask_uses_outside_only() {
        assert_eq!(StencilTest::new(CompareMode::Equal, 0).classify(None), TestOutcome::Direct);
        assert_eq!(StencilTest::new(CompareMode::Greater, 0).classify(None), TestOutcome::Nothing);
    }

    // ── recording ─────────────────────────────────────────────────────────

    #[test]
    fn recording_clears_mask_and_forces_replace() {
        let mut r = RecordingRasterizer::new(64, 64);
        let mut s = StencilEmulator::new(false);
        s.begin_recording(&mut r, (64, 64), false).unwrap();

        assert!(s.is_recording());
        assert_eq!(r.blend_mode(), BlendMode::Replace);
        assert_eq!(s.redirect(RenderTarget::Screen), r.bound_target());
        assert!(r.commands().iter().any(
            |c| matches!(c, RasterCmd::Clear { color, .. } if *color == Color::transparent())
        ));
    }

    #[test]
    fn keep_appends_to_recorded_commands() {
        let mut r = RecordingRasterizer::new(64, 64);
        let mut s = StencilEmulator::new(false);
        record_mask(&mut s, &mut r);
        s.begin_recording(&mut r, (64, 64), true).unwrap();
        s.record(tri(), None);
        s.end_recording(&mut r, StencilAction::Replace, 1);
        assert_eq!(s.recorded().len(), 2);

        record_mask(&mut s, &mut r);
        assert_eq!(s.recorded().len(), 1);
    }

    // ── compositing ───────────────────────────────────────────────────────

    #[test]
    fn inverted_mask_is_built_lazily_once() {
        let mut r = RecordingRasterizer::new(64, 64);
        let mut s = StencilEmulator::new(false);
        record_mask(&mut s, &mut r);
        let live_after_record = r.live_texture_count();
        assert_eq!(live_after_record, 1);

        for _ in 0..2 {
            test_screen(&mut s, &mut r, CompareMode::Equal, 0);
            r.draw_triangles(None, &[Vertex::default(); 3], &[0, 1, 2]);
            s.finish_test(&mut r).unwrap();
        }

        assert_eq!(r.live_texture_count(), 3);
        let white_clears = r
            .commands()
            .iter()
            .filter(|c| matches!(c, RasterCmd::Clear { color, .. } if *color == Color::white()))
            .count();
        assert_eq!(white_clears, 1);

        let transparent_replays = r
            .draws()
            .filter(|d| d.blend == BlendMode::Replace && d.vertices.iter().all(|v| v.a == 0.0))
            .count();
        assert_eq!(transparent_replays, 1);
        assert_eq!(r.bound_target(), RenderTarget::Screen);
    }

    #[test]
    fn normal_mask_multiplies_then_alpha_blends() {
        let mut r = RecordingRasterizer::new(64, 64);
        let mut s = StencilEmulator::new(false);
        record_mask(&mut s, &mut r);

        test_screen(&mut s, &mut r, CompareMode::Greater, 0);
        r.take_commands();
        s.finish_test(&mut r).unwrap();

        let draws: Vec<_> = r.draws().collect();
        assert_eq!(draws.len(), 2);
        assert_eq!(draws[0].blend, BlendMode::Multiply);
        assert_ne!(draws[0].target, RenderTarget::Screen);
        assert_eq!(draws[1].blend, BlendMode::Alpha);
        assert_eq!(draws[1].target, RenderTarget::Screen);
        assert!(s.test().is_none());
    }

    #[test]
    fn never_draws_nothing_and_always_draws_directly() {
        let mut r = RecordingRasterizer::new(64, 64);
        let mut s = StencilEmulator::new(false);
        record_mask(&mut s, &mut r);

        test_screen(&mut s, &mut r, CompareMode::Never, 0);
        r.take_commands();
        s.finish_test(&mut r).unwrap();
        assert_eq!(r.draw_count(), 0);

        test_screen(&mut s, &mut r, CompareMode::Always, 0);
        r.take_commands();
        s.finish_test(&mut r).unwrap();
        let draws: Vec<_> = r.draws().collect();
        assert_eq!(draws.len(), 1);
        assert_eq!(draws[0].blend, BlendMode::Alpha);
    }

    #[test]
    fn eager_inverse_builds_at_record_time() {
        let mut r = RecordingRasterizer::new(64, 64);
        let mut s = StencilEmulator::new(true);
        record_mask(&mut s, &mut r);
        assert_eq!(r.live_texture_count(), 2);
    }

    #[test]
    fn enabling_twice_composites_first() {
        let mut r = RecordingRasterizer::new(64, 64);
        let mut s = StencilEmulator::new(false);
        record_mask(&mut s, &mut r);
        test_screen(&mut s, &mut r, CompareMode::Always, 0);
        r.take_commands();
        test_screen(&mut s, &mut r, CompareMode::Greater, 0);
        assert_eq!(r.draw_count(), 1);
        assert_eq!(s.test(), Some(StencilTest::new(CompareMode::Greater, 0)));
    }

    // ── lifetime ──────────────────────────────────────────────────────────

    #[test]
    fn release_frees_helpers() {
        let mut r = RecordingRasterizer::new(64, 64);
        let mut s = StencilEmulator::new(true);
        record_mask(&mut s, &mut r);
        test_screen(&mut s, &mut r, CompareMode::Equal, 0);
        assert_eq!(r.live_texture_count(), 3);
        s.release(&mut r);
        assert_eq!(r.live_texture_count(), 0);
        assert!(s.test().is_none());
        s.release(&mut r);
    }

    #[test]
    fn size_change_recreates_helper() {
        let mut r = RecordingRasterizer::new(64, 64);
        let mut s = StencilEmulator::new(false);
        s.begin_recording(&mut r, (64, 64), false).unwrap();
        s.end_recording(&mut r, StencilAction::Replace, 1);
        s.begin_recording(&mut r, (32, 32), true).unwrap();
        assert_eq!(r.target_size(s.redirect(RenderTarget::Screen)), Some((32, 32)));
        s.end_recording(&mut r, StencilAction::Replace, 1);
        assert_eq!(r.live_texture_count(), 1);
    }
}
