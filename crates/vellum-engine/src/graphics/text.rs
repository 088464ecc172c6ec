use std::collections::HashMap;

use crate::batch::{Quad, SpriteBatch};
use crate::paint::Color;
use crate::raster::Texture;
use crate::transform::{AffineMatrix, Placement};

/// Horizontal alignment of wrapped lines.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

/// One glyph of a font atlas.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Glyph {
    /// Atlas region; `None` for glyphs that only advance (spaces).
    pub quad: Option<Quad>,
    pub advance: f32,
}

/// A laid out line and its pixel width.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    pub text: String,
    pub width: f32,
}

/// Glyph provider backed by a texture atlas.
///
/// Shaping is out of scope: every `char` maps to at most one glyph and lines
/// advance by a fixed height.
pub trait Font {
    fn texture(&self) -> Texture;

    fn line_height(&self) -> f32;

    /// `None` for characters the font cannot draw; those are skipped.
    fn glyph(&self, ch: char) -> Option<Glyph>;

    /// Pixel width of `s` laid out on one line.
    fn width(&self, s: &str) -> f32 {
        s.chars().filter_map(|c| self.glyph(c)).map(|g| g.advance).sum()
    }

    /// Splits `text` at newlines and greedily wraps each paragraph at word
    /// boundaries so no line exceeds `limit`. A single word wider than the
    /// limit gets a line of its own.
    fn wrap(&self, text: &str, limit: Option<f32>) -> Vec<TextLine> {
        let mut lines = Vec::new();
        for paragraph in text.split('\n') {
            let Some(limit) = limit else {
                lines.push(TextLine { text: paragraph.to_owned(), width: self.width(paragraph) });
                continue;
            };

            let mut current = String::new();
            for word in paragraph.split(' ') {
                if current.is_empty() {
                    current.push_str(word);
                    continue;
                }
                let candidate = format!("{current} {word}");
                if self.width(&candidate) <= limit {
                    current = candidate;
                } else {
                    let width = self.width(&current);
                    lines.push(TextLine { text: std::mem::take(&mut current), width });
                    current.push_str(word);
                }
            }
            let width = self.width(&current);
            lines.push(TextLine { text: current, width });
        }
        lines
    }
}

/// Monospaced font whose glyphs sit in a grid of equal cells.
///
/// Cells are read left to right, top to bottom, one per character of the
/// `glyphs` string. A space missing from the atlas still advances one cell.
#[derive(Debug, Clone)]
pub struct ImageFont {
    texture: Texture,
    cell_width: f32,
    cell_height: f32,
    spacing: f32,
    glyphs: HashMap<char, Quad>,
}

impl ImageFont {
    pub fn new(texture: Texture, glyphs: &str, cell_width: u32, cell_height: u32) -> Self {
        let columns = (texture.width / cell_width.max(1)).max(1);
        let (cw, ch) = (cell_width as f32, cell_height as f32);

        let mut map = HashMap::new();
        for (i, c) in glyphs.chars().enumerate() {
            let i = i as u32;
            let (col, row) = (i % columns, i / columns);
            if (row + 1) * cell_height > texture.height {
                log::warn!("ImageFont: atlas too small for glyph {c:?}, dropping the rest");
                break;
            }
            map.insert(c, Quad::of(&texture, col as f32 * cw, row as f32 * ch, cw, ch));
        }

        Self {
            texture,
            cell_width: cw,
            cell_height: ch,
            spacing: 0.0,
            glyphs: map,
        }
    }

    /// Extra advance after every glyph.
    pub fn with_spacing(mut self, spacing: f32) -> Self {
        self.spacing = spacing;
        self
    }

    #[inline]
    pub fn has_glyph(&self, ch: char) -> bool {
        self.glyphs.contains_key(&ch)
    }
}

impl Font for ImageFont {
    #[inline]
    fn texture(&self) -> Texture {
        self.texture
    }

    #[inline]
    fn line_height(&self) -> f32 {
        self.cell_height
    }

    fn glyph(&self, ch: char) -> Option<Glyph> {
        let advance = self.cell_width + self.spacing;
        match self.glyphs.get(&ch) {
            Some(q) => Some(Glyph { quad: Some(*q), advance }),
            None if ch == ' ' => Some(Glyph { quad: None, advance }),
            None => None,
        }
    }
}

/// Cached text geometry.
///
/// Glyph quads are laid out once into an internal [`SpriteBatch`] and drawn
/// in one call until the text changes.
#[derive(Debug, Clone)]
pub struct Text {
    batch: SpriteBatch,
    lines: Vec<TextLine>,
    width: f32,
    height: f32,
}

impl Text {
    pub fn new<F: Font + ?Sized>(font: &F) -> Self {
        Self {
            batch: SpriteBatch::new(font.texture(), 16),
            lines: Vec::new(),
            width: 0.0,
            height: 0.0,
        }
    }

    /// Replaces the contents with a single unwrapped block.
    pub fn set<F: Font + ?Sized>(&mut self, font: &F, text: &str) {
        self.clear();
        self.add(font, text, Placement::default());
    }

    /// Replaces the contents with wrapped, aligned text.
    pub fn set_wrapped<F: Font + ?Sized>(
        &mut self,
        font: &F,
        text: &str,
        limit: f32,
        align: Align,
    ) {
        self.clear();
        self.add_wrapped(font, text, limit, align, Placement::default());
    }

    /// Appends an unwrapped block at `placement`.
    pub fn add<F: Font + ?Sized>(&mut self, font: &F, text: &str, placement: Placement) {
        let lines = font.wrap(text, None);
        self.layout(font, lines, None, Align::Left, &placement.matrix());
    }

    /// Appends a block wrapped at `limit` pixels at `placement`.
    pub fn add_wrapped<F: Font + ?Sized>(
        &mut self,
        font: &F,
        text: &str,
        limit: f32,
        align: Align,
        placement: Placement,
    ) {
        let lines = font.wrap(text, Some(limit));
        self.layout(font, lines, Some(limit), align, &placement.matrix());
    }

    fn layout<F: Font + ?Sized>(
        &mut self,
        font: &F,
        lines: Vec<TextLine>,
        limit: Option<f32>,
        align: Align,
        m: &AffineMatrix,
    ) {
        if self.batch.texture() != font.texture() {
            self.batch.set_texture(font.texture());
        }

        let box_width = limit.unwrap_or_else(|| lines.iter().map(|l| l.width).fold(0.0, f32::max));
        let line_height = font.line_height();

        for (row, line) in lines.iter().enumerate() {
            let mut x = match align {
                Align::Left => 0.0,
                Align::Center => ((box_width - line.width) * 0.5).floor(),
                Align::Right => box_width - line.width,
            };
            let y = row as f32 * line_height;

            for c in line.text.chars() {
                let Some(glyph) = font.glyph(c) else {
                    continue;
                };
                if let Some(quad) = glyph.quad {
                    let local = *m * AffineMatrix::translation(x, y);
                    self.batch.add_transformed(Some(&quad), &local);
                }
                x += glyph.advance;
            }
        }

        self.width = self.width.max(lines.iter().map(|l| l.width).fold(0.0, f32::max));
        self.height += lines.len() as f32 * line_height;
        self.lines.extend(lines);
    }

    /// Removes all text. The glyph buffer is kept.
    pub fn clear(&mut self) {
        self.batch.clear();
        self.lines.clear();
        self.width = 0.0;
        self.height = 0.0;
    }

    /// Widest laid out line.
    #[inline]
    pub fn width(&self) -> f32 {
        self.width
    }

    /// Sum of line heights of every added block.
    #[inline]
    pub fn height(&self) -> f32 {
        self.height
    }

    #[inline]
    pub fn lines(&self) -> &[TextLine] {
        &self.lines
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.batch.is_empty()
    }

    /// Tint for glyphs added from now on.
    #[inline]
    pub fn set_color(&mut self, color: Option<Color>) {
        self.batch.set_color(color);
    }

    #[inline]
    pub fn batch(&self) -> &SpriteBatch {
        &self.batch
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::Vec2;
    use crate::raster::TextureHandle;

    fn font() -> ImageFont {
        // 4 columns × 2 rows of 8×10 cells.
        ImageFont::new(Texture::new(TextureHandle(3), 32, 20), "abcdefg", 8, 10)
    }

    // ── font ──────────────────────────────────────────────────────────────

    #[test]
    fn atlas_grid_lookup() {
        let f = font();
        let e = f.glyph('e').unwrap().quad.unwrap();
        assert_eq!(e.viewport().origin, Vec2::new(0.0, 10.0));
        assert_eq!(f.glyph(' ').unwrap().quad, None);
        assert!(f.glyph('z').is_none());
    }

    #[test]
    fn glyphs_beyond_atlas_are_dropped() {
        let f = ImageFont::new(Texture::new(TextureHandle(3), 16, 10), "abcd", 8, 10);
        assert!(f.has_glyph('b'));
        assert!(!f.has_glyph('c'));
    }

    #[test]
    fn width_sums_advances() {
        let f = font().with_spacing(1.0);
        assert_eq!(f.width("ab a"), 36.0);
        assert_eq!(f.width("zz"), 0.0);
    }

    // ── wrapping ──────────────────────────────────────────────────────────

    #[test]
    fn greedy_wrap() {
        let f = font();
        let lines = f.wrap("ab cd efg", Some(40.0));
        let texts: Vec<&str> = lines.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, ["ab cd", "efg"]);
        assert_eq!(lines[0].width, 40.0);
    }

    #[test]
    fn overlong_word_gets_own_line() {
        let lines = font().wrap("a abcdefg b", Some(16.0));
        let texts: Vec<&str> = lines.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, ["a", "abcdefg", "b"]);
    }

    #[test]
    fn newlines_split_paragraphs() {
        let lines = font().wrap("ab\n\ncd", None);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1].width, 0.0);
    }

    // ── layout ────────────────────────────────────────────────────────────

    #[test]
    fn set_lays_out_one_sprite_per_drawn_glyph() {
        let f = font();
        let mut t = Text::new(&f);
        t.set(&f, "ab c");
        assert_eq!(t.batch().count(), 3);
        assert_eq!(t.width(), 32.0);
        assert_eq!(t.height(), 10.0);

        let c = t.batch().get(3).unwrap();
        assert_eq!(c[0].position(), Vec2::new(24.0, 0.0));
    }

    #[test]
    fn right_alignment_offsets_short_lines() {
        let f = font();
        let mut t = Text::new(&f);
        t.set_wrapped(&f, "ab c", 16.0, Align::Right);
        assert_eq!(t.lines().len(), 2);
        let c = t.batch().get(3).unwrap();
        assert_eq!(c[0].position(), Vec2::new(8.0, 10.0));
        assert_eq!(t.height(), 20.0);
    }

    #[test]
    fn center_alignment_and_placement() {
        let f = font();
        let mut t = Text::new(&f);
        t.add_wrapped(&f, "a", 24.0, Align::Center, Placement::at(100.0, 50.0));
        let a = t.batch().get(1).unwrap();
        assert_eq!(a[0].position(), Vec2::new(108.0, 50.0));
    }

    #[test]
    fn clear_resets_metrics() {
        let f = font();
        let mut t = Text::new(&f);
        t.set(&f, "abc");
        t.clear();
        assert!(t.is_empty());
        assert_eq!((t.width(), t.height()), (0.0, 0.0));
    }
}
