use rogueterm_data::{Color, GlyphBitmap};

use crate::config::{FontConfig, RenderMode};

/// Coverage at or above this is "on" in [`RenderMode::Solid`].
const SOLID_THRESHOLD: u8 = 0x80;

/// A cell-sized RGBA canvas that glyph coverage is composited onto.
pub(crate) struct Canvas {
    bitmap: GlyphBitmap,
    fg: Color,
    mode: RenderMode,
}

impl Canvas {
    /// Starts a cell filled with `bg`; transparent in
    /// [`RenderMode::Blended`].
    pub(crate) fn new(width: u32, height: u32, fg: Color, bg: Color, mode: RenderMode) -> Self {
        let alpha = if mode == RenderMode::Blended { 0 } else { 0xff };
        let [r, g, b, _] = bg.to_rgba();

        Self {
            bitmap: GlyphBitmap::filled(width, height, [r, g, b, alpha]),
            fg,
            mode,
        }
    }

    /// Composites a single-channel coverage value at (`x`, `y`).
    pub(crate) fn cover(&mut self, x: i32, y: i32, coverage: u8) {
        let Some((x, y, under)) = self.pixel_at(x, y) else { return };
        let fg = self.fg;

        let out = match self.mode {
            RenderMode::Solid if coverage >= SOLID_THRESHOLD => opaque(fg),
            RenderMode::Solid => return,
            RenderMode::Shaded | RenderMode::Lcd => {
                let [r, g, b, _] = under;
                [mix(fg.r, r, coverage), mix(fg.g, g, coverage), mix(fg.b, b, coverage), 0xff]
            },
            RenderMode::Blended => over([fg.r, fg.g, fg.b, coverage], under),
        };
        self.bitmap.put_pixel(x, y, out);
    }

    /// Composites per-channel (subpixel) coverage at (`x`, `y`).
    pub(crate) fn cover_subpixel(&mut self, x: i32, y: i32, coverage: [u8; 3]) {
        let Some((x, y, [r, g, b, a])) = self.pixel_at(x, y) else { return };
        let fg = self.fg;

        let out = [
            mix(fg.r, r, coverage[0]),
            mix(fg.g, g, coverage[1]),
            mix(fg.b, b, coverage[2]),
            a.max(coverage.into_iter().max().unwrap_or(0)),
        ];
        self.bitmap.put_pixel(x, y, out);
    }

    /// Composites a full-color pixel (color glyphs) at (`x`, `y`).
    pub(crate) fn paint(&mut self, x: i32, y: i32, rgba: [u8; 4]) {
        let Some((x, y, under)) = self.pixel_at(x, y) else { return };
        self.bitmap.put_pixel(x, y, over(rgba, under));
    }

    /// Fills `thickness` rows from `top` with the opaque foreground.
    pub(crate) fn hline(&mut self, top: u32, thickness: u32) {
        let color = opaque(self.fg);
        let bottom = top.saturating_add(thickness).min(self.bitmap.height());

        for y in top..bottom {
            for x in 0..self.bitmap.width() {
                self.bitmap.put_pixel(x, y, color);
            }
        }
    }

    pub(crate) fn into_bitmap(self) -> GlyphBitmap {
        self.bitmap
    }

    fn pixel_at(&self, x: i32, y: i32) -> Option<(u32, u32, [u8; 4])> {
        let x = u32::try_from(x).ok()?;
        let y = u32::try_from(y).ok()?;
        self.bitmap.pixel(x, y).map(|px| (x, y, px))
    }
}

/// Top row and thickness of a horizontal line, both in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct LineRows {
    pub(crate) top: u32,
    pub(crate) thickness: u32,
}

/// Underline and strikethrough placement for one cell height.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Decorations {
    pub(crate) underline: LineRows,
    pub(crate) strikethrough: LineRows,
}

impl Decorations {
    pub(crate) fn for_cell(cell_height: u32, config: &FontConfig) -> Self {
        Self {
            underline: line_rows(
                cell_height,
                config.underline_position,
                config.underline_thickness,
            ),
            strikethrough: line_rows(
                cell_height,
                config.strikethrough_position,
                config.strikethrough_thickness,
            ),
        }
    }
}

/// `position` is a fraction of the cell height, `thickness` a percentage;
/// the line is at least one pixel thick and kept inside the cell.
fn line_rows(cell_height: u32, position: f32, thickness_pct: f32) -> LineRows {
    let height = cell_height as f32;
    let thickness = ((height * thickness_pct / 100.0).round() as u32).max(1);
    let top = ((height * position) as u32).min(cell_height.saturating_sub(thickness));

    LineRows { top, thickness }
}

fn opaque(color: Color) -> [u8; 4] {
    let [r, g, b, _] = color.to_rgba();
    [r, g, b, 0xff]
}

/// Linear interpolation from `under` to `over` by `alpha`.
fn mix(over: u8, under: u8, alpha: u8) -> u8 {
    let (o, u, a) = (over as u32, under as u32, alpha as u32);
    ((o * a + u * (255 - a) + 127) / 255) as u8
}

/// Source-over composite of two straight-alpha RGBA pixels.
fn over(src: [u8; 4], dst: [u8; 4]) -> [u8; 4] {
    let sa = src[3] as u32;
    let da = dst[3] as u32;
    let out_a = sa + (da * (255 - sa) + 127) / 255;
    if out_a == 0 {
        return [dst[0], dst[1], dst[2], 0];
    }

    let channel = |s: u8, d: u8| -> u8 {
        let premul = s as u32 * sa * 255 + d as u32 * da * (255 - sa);
        ((premul + out_a * 255 / 2) / (out_a * 255)) as u8
    };

    [
        channel(src[0], dst[0]),
        channel(src[1], dst[1]),
        channel(src[2], dst[2]),
        out_a as u8,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    const FG: Color = Color::rgb(255, 255, 255);
    const BG: Color = Color::rgb(0, 0, 100);

    #[test]
    fn solid_thresholds_coverage() {
        let mut canvas = Canvas::new(2, 1, FG, BG, RenderMode::Solid);
        canvas.cover(0, 0, 0x7f);
        canvas.cover(1, 0, 0x80);
        let bitmap = canvas.into_bitmap();

        assert_eq!(bitmap.pixel(0, 0), Some([0, 0, 100, 255]));
        assert_eq!(bitmap.pixel(1, 0), Some([255, 255, 255, 255]));
    }

    #[test]
    fn shaded_mixes_over_background() {
        let mut canvas = Canvas::new(1, 1, FG, BG, RenderMode::Shaded);
        canvas.cover(0, 0, 128);

        assert_eq!(canvas.into_bitmap().pixel(0, 0), Some([128, 128, 178, 255]));
    }

    #[test]
    fn blended_keeps_background_transparent() {
        let mut canvas = Canvas::new(2, 1, FG, BG, RenderMode::Blended);
        canvas.cover(1, 0, 200);
        let bitmap = canvas.into_bitmap();

        assert_eq!(bitmap.pixel(0, 0).map(|px| px[3]), Some(0));
        assert_eq!(bitmap.pixel(1, 0), Some([255, 255, 255, 200]));
    }

    #[test]
    fn subpixel_mixes_per_channel() {
        let mut canvas = Canvas::new(1, 1, FG, Color::BLACK, RenderMode::Lcd);
        canvas.cover_subpixel(0, 0, [255, 0, 128]);

        assert_eq!(canvas.into_bitmap().pixel(0, 0), Some([255, 0, 128, 255]));
    }

    #[test]
    fn out_of_cell_coverage_is_clipped() {
        let mut canvas = Canvas::new(1, 1, FG, BG, RenderMode::Shaded);
        canvas.cover(-1, 0, 255);
        canvas.cover(0, 1, 255);
        canvas.paint(3, 3, [1, 2, 3, 255]);

        assert_eq!(canvas.into_bitmap().pixel(0, 0), Some([0, 0, 100, 255]));
    }

    #[test]
    fn decoration_rows_for_default_config() {
        let decorations = Decorations::for_cell(16, &FontConfig::default());

        assert_eq!(decorations.underline, LineRows { top: 13, thickness: 1 });
        assert_eq!(decorations.strikethrough, LineRows { top: 8, thickness: 1 });
    }

    #[test]
    fn decoration_stays_inside_cell() {
        let rows = line_rows(10, 1.0, 30.0);

        assert_eq!(rows, LineRows { top: 7, thickness: 3 });
    }

    #[test]
    fn hline_paints_opaque_rows() {
        let mut canvas = Canvas::new(3, 4, FG, BG, RenderMode::Blended);
        canvas.hline(2, 1);
        let bitmap = canvas.into_bitmap();

        for x in 0..3 {
            assert_eq!(bitmap.pixel(x, 2), Some([255, 255, 255, 255]));
            assert_eq!(bitmap.pixel(x, 1).map(|px| px[3]), Some(0));
        }
    }

    #[test]
    fn source_over_on_opaque_destination() {
        assert_eq!(over([255, 0, 0, 255], [0, 0, 255, 255]), [255, 0, 0, 255]);
        assert_eq!(over([255, 0, 0, 0], [0, 0, 255, 255]), [0, 0, 255, 255]);
        assert_eq!(over([0, 0, 0, 0], [9, 9, 9, 0]), [9, 9, 9, 0]);
    }
}
