use crate::raster::{RenderTarget, TextureHandle};

use super::Canvas;

/// Active drawing target plus a save/restore stack for nested `render_to` calls.
///
/// Only tracks the logical target; binding it on the rasterizer is left to
/// the caller, which may redirect drawing elsewhere (stencil buffers).
#[derive(Debug, Clone, Default)]
pub struct RenderTargetStack {
    active: Option<Canvas>,
    saved: Vec<Option<Canvas>>,
}

impl RenderTargetStack {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// The active canvas, or `None` for the screen.
    #[inline]
    pub fn active(&self) -> Option<Canvas> {
        self.active
    }

    #[inline]
    pub fn target(&self) -> RenderTarget {
        self.active.map_or(RenderTarget::Screen, |c| c.target())
    }

    /// Replaces the active target and returns the previous one.
    #[inline]
    pub fn set(&mut self, canvas: Option<Canvas>) -> Option<Canvas> {
        std::mem::replace(&mut self.active, canvas)
    }

    /// Saves the active target, then makes `canvas` active.
    #[inline]
    pub fn push(&mut self, canvas: Option<Canvas>) {
        self.saved.push(self.active);
        self.active = canvas;
    }

    /// Restores the most recently saved target. `false` on underflow.
    #[inline]
    pub fn pop(&mut self) -> bool {
        match self.saved.pop() {
            Some(c) => {
                self.active = c;
                true
            }
            None => false,
        }
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.saved.len()
    }

    /// Drops every reference to a released texture, falling back to the screen.
    pub fn forget(&mut self, handle: TextureHandle) {
        let matches = |c: &Option<Canvas>| c.is_some_and(|c| c.texture().handle == handle);
        if matches(&self.active) {
            self.active = None;
        }
        for slot in &mut self.saved {
            if matches(slot) {
                *slot = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::RecordingRasterizer;

    #[test]
    fn push_pop_restores_previous_target() {
        let mut r = RecordingRasterizer::new(64, 64);
        let a = Canvas::create(&mut r, 8, 8).unwrap();
        let b = Canvas::create(&mut r, 8, 8).unwrap();

        let mut s = RenderTargetStack::new();
        assert_eq!(s.target(), RenderTarget::Screen);
        s.set(Some(a));
        s.push(Some(b));
        assert_eq!(s.active(), Some(b));
        assert!(s.pop());
        assert_eq!(s.active(), Some(a));
        assert!(!s.pop());
        assert_eq!(s.active(), Some(a));
    }

    #[test]
    fn forget_clears_released_canvas() {
        let mut r = RecordingRasterizer::new(64, 64);
        let a = Canvas::create(&mut r, 8, 8).unwrap();

        let mut s = RenderTargetStack::new();
        s.push(Some(a));
        s.push(Some(a));
        s.forget(a.texture().handle);
        assert_eq!(s.active(), None);
        s.pop();
        assert_eq!(s.active(), None);
    }
}
