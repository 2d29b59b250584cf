use bitflags::bitflags;

use crate::Color;

bitflags! {
    /// Font variants and decorations applied when rasterizing a glyph.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct CellStyle: u8 {
        const BOLD          = 0b0000_0001;
        const ITALIC        = 0b0000_0010;
        const UNDERLINE     = 0b0000_0100;
        const STRIKETHROUGH = 0b0000_1000;
    }
}

impl Default for CellStyle {
    fn default() -> Self {
        Self::empty()
    }
}

/// A single character positioned on the console grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlyphCell {
    /// Grid column
    pub col: u16,
    /// Grid row
    pub row: u16,
    /// The code point to draw
    pub ch: char,
    /// Foreground (glyph) color
    pub fg: Color,
    /// Background color
    pub bg: Color,
    /// Font variant and decorations
    pub style: CellStyle,
}

impl GlyphCell {
    /// Creates a white-on-black, unstyled glyph cell.
    #[must_use]
    pub const fn new(col: u16, row: u16, ch: char) -> Self {
        Self {
            col,
            row,
            ch,
            fg: Color::WHITE,
            bg: Color::BLACK,
            style: CellStyle::empty(),
        }
    }

    #[must_use]
    pub const fn fg(mut self, fg: Color) -> Self {
        self.fg = fg;
        self
    }

    #[must_use]
    pub const fn bg(mut self, bg: Color) -> Self {
        self.bg = bg;
        self
    }

    #[must_use]
    pub const fn style(mut self, style: CellStyle) -> Self {
        self.style = style;
        self
    }

    /// The appearance key of this cell, using its own colors.
    #[must_use]
    pub fn identity(&self) -> CellIdentity {
        self.identity_with(self.fg, self.bg)
    }

    /// The appearance key of this cell with substituted colors, e.g. after
    /// depth adaptation.
    #[must_use]
    pub fn identity_with(&self, fg: Color, bg: Color) -> CellIdentity {
        CellIdentity { ch: self.ch, fg, bg, style: self.style }
    }
}

/// A solid rectangle drawn over the grid.
///
/// The origin is in surface pixels, the extent in cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RectCell {
    /// Left edge in pixels
    pub x: u32,
    /// Top edge in pixels
    pub y: u32,
    /// Width in cells
    pub width: u16,
    /// Height in cells
    pub height: u16,
    /// Fill color
    pub color: Color,
}

impl RectCell {
    #[must_use]
    pub const fn new(x: u32, y: u32, width: u16, height: u16, color: Color) -> Self {
        Self { x, y, width, height, color }
    }
}

/// One drawable entry of the console buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    Glyph(GlyphCell),
    Rect(RectCell),
}

impl From<GlyphCell> for Cell {
    fn from(cell: GlyphCell) -> Self {
        Cell::Glyph(cell)
    }
}

impl From<RectCell> for Cell {
    fn from(cell: RectCell) -> Self {
        Cell::Rect(cell)
    }
}

/// Everything that determines how a glyph cell looks once rasterized.
///
/// Glyph cells with equal identities are visually identical regardless of
/// their grid position, and share one cached image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellIdentity {
    pub ch: char,
    pub fg: Color,
    pub bg: Color,
    pub style: CellStyle,
}

impl CellIdentity {
    #[must_use]
    pub const fn new(ch: char, fg: Color, bg: Color, style: CellStyle) -> Self {
        Self { ch, fg, bg, style }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn identity_ignores_position() {
        let a = GlyphCell::new(0, 0, '@').fg(Color::rgb(255, 255, 0));
        let b = GlyphCell::new(41, 7, '@').fg(Color::rgb(255, 255, 0));

        assert_eq!(a.identity(), b.identity());
    }

    #[test]
    fn identity_hash_distinguishes_every_field() {
        let base = CellIdentity::new('#', Color::WHITE, Color::BLACK, CellStyle::empty());
        let variants = [
            base,
            CellIdentity { ch: '.', ..base },
            CellIdentity { fg: Color::rgb(254, 255, 255), ..base },
            CellIdentity { bg: Color::rgb(0, 0, 1), ..base },
            CellIdentity { style: CellStyle::BOLD, ..base },
            CellIdentity { style: CellStyle::ITALIC, ..base },
            CellIdentity { style: CellStyle::UNDERLINE, ..base },
            CellIdentity { style: CellStyle::STRIKETHROUGH, ..base },
            CellIdentity { style: CellStyle::BOLD | CellStyle::ITALIC, ..base },
        ];

        let unique: HashSet<_> = variants.iter().copied().collect();
        assert_eq!(unique.len(), variants.len());
    }

    #[test]
    fn identity_with_substitutes_colors_only() {
        let cell = GlyphCell::new(3, 4, 'g').style(CellStyle::UNDERLINE);
        let identity = cell.identity_with(Color::rgb(1, 2, 3), Color::rgb(4, 5, 6));

        assert_eq!(identity.ch, 'g');
        assert_eq!(identity.style, CellStyle::UNDERLINE);
        assert_eq!(identity.fg, Color::rgb(1, 2, 3));
        assert_eq!(identity.bg, Color::rgb(4, 5, 6));
    }

    #[test]
    fn default_style_is_plain() {
        assert!(CellStyle::default().is_empty());
        assert_eq!(GlyphCell::new(0, 0, 'x').style, CellStyle::default());
    }
}
