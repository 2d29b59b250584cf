use rogueterm_data::{Cell, CellBuffer, DepthCast, GlyphRasterizer};

use crate::{error::Error, geometry::GridGeometry, glyph_cache::GlyphCache, surface::Surface};

/// Number of cells drawn by one [`present_frame`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub glyphs: usize,
    pub rects: usize,
}

/// Everything a frame reads besides the buffer and the surface.
pub struct FrameResources<'a, R, I> {
    pub geometry: &'a GridGeometry,
    pub cast: &'a DepthCast,
    pub cache: &'a mut GlyphCache<R, I>,
}

/// Draws every cell of `buffer` onto `surface`, once, in buffer order.
///
/// Glyph cells are resolved through the glyph cache with depth-adapted
/// colors; rectangle cells are filled directly. Overlapping cells composite
/// last-write-wins. The surface is neither cleared nor presented here.
///
/// # Errors
/// Stops at the first glyph that fails to rasterize or upload.
pub fn present_frame<B, R, S>(
    buffer: &B,
    resources: FrameResources<'_, R, S::Image>,
    surface: &mut S,
) -> Result<FrameStats, Error>
where
    B: CellBuffer + ?Sized,
    R: GlyphRasterizer,
    S: Surface + ?Sized,
{
    let FrameResources { geometry, cast, cache } = resources;
    let mut stats = FrameStats::default();

    for cell in buffer.cells() {
        match cell {
            Cell::Glyph(glyph) => {
                let identity = glyph.identity_with(cast.apply(glyph.fg), cast.apply(glyph.bg));
                let image = cache.get_or_create(&identity, surface)?;
                let dst = geometry.cell_to_pixel_rect(glyph.col, glyph.row);

                surface.set_draw_color(glyph.bg);
                surface.copy_image(image.handle(), dst);
                stats.glyphs += 1;
            },
            Cell::Rect(rect) => {
                let dst = geometry.rect_cell_to_pixel_rect(rect);

                surface.set_draw_color(rect.color);
                surface.fill_rect(dst);
                stats.rects += 1;
            },
        }
    }

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use rogueterm_data::{
        CellIdentity, CellStyle, Color, ColorDepth, GlyphBitmap, GlyphCell, GridBuffer,
        RasterizeError, RectCell, cast_depth,
    };

    use super::*;
    use crate::surface::PixelSurface;

    const GREEN: Color = Color::rgb(0, 255, 0);

    /// Solid block in the foreground color, sized 8x16.
    #[derive(Default)]
    struct BlockRasterizer {
        calls: Vec<CellIdentity>,
    }

    impl GlyphRasterizer for BlockRasterizer {
        fn rasterize(&mut self, identity: &CellIdentity) -> Result<GlyphBitmap, RasterizeError> {
            self.calls.push(*identity);
            Ok(GlyphBitmap::filled(8, 16, identity.fg.to_rgba()))
        }
    }

    fn present(
        buffer: &GridBuffer,
        cast: &DepthCast,
        cache: &mut GlyphCache<BlockRasterizer, crate::surface::PixelImage>,
        surface: &mut PixelSurface,
    ) -> FrameStats {
        let geometry = GridGeometry::new(8, 16).unwrap();
        let resources = FrameResources { geometry: &geometry, cast, cache };
        present_frame(buffer, resources, surface).unwrap()
    }

    #[test]
    fn rect_drawn_after_glyph_wins() {
        let mut buffer = GridBuffer::new(2, 1);
        buffer.put(GlyphCell::new(0, 0, '#').fg(Color::WHITE)).unwrap();
        buffer.fill_rect(RectCell::new(0, 0, 1, 1, GREEN));

        let mut cache = GlyphCache::new(BlockRasterizer::default());
        let mut surface = PixelSurface::new(16, 16);
        let stats = present(&buffer, &DepthCast::default(), &mut cache, &mut surface);

        assert_eq!(stats, FrameStats { glyphs: 1, rects: 1 });
        for (x, y) in [(0, 0), (7, 15), (3, 8)] {
            assert_eq!(surface.pixel(x, y), Some(GREEN));
        }
        // the neighbouring cell is untouched
        assert_eq!(surface.pixel(8, 0), Some(Color::BLACK));
    }

    #[test]
    fn glyph_drawn_after_rect_wins() {
        let mut buffer = GridBuffer::new(1, 1);
        buffer.fill_rect(RectCell::new(0, 0, 1, 1, GREEN));
        buffer.put(GlyphCell::new(0, 0, '#').fg(Color::WHITE)).unwrap();

        let mut cache = GlyphCache::new(BlockRasterizer::default());
        let mut surface = PixelSurface::new(8, 16);
        present(&buffer, &DepthCast::default(), &mut cache, &mut surface);

        assert_eq!(surface.pixel(4, 4), Some(Color::WHITE));
    }

    #[test]
    fn glyph_lands_in_its_cell_and_sets_background_draw_color() {
        let bg = Color::rgb(10, 20, 30);
        let mut buffer = GridBuffer::new(3, 2);
        buffer.put(GlyphCell::new(2, 1, '@').fg(GREEN).bg(bg)).unwrap();

        let mut cache = GlyphCache::new(BlockRasterizer::default());
        let mut surface = PixelSurface::new(24, 32);
        present(&buffer, &DepthCast::default(), &mut cache, &mut surface);

        assert_eq!(surface.pixel(16, 16), Some(GREEN));
        assert_eq!(surface.pixel(23, 31), Some(GREEN));
        assert_eq!(surface.pixel(15, 16), Some(Color::BLACK));
        assert_eq!(surface.draw_color(), bg);
    }

    #[test]
    fn colors_are_depth_adapted_before_lookup() {
        let mut buffer = GridBuffer::new(2, 1);
        let fg = Color::rgb(200, 100, 128);
        buffer.put(GlyphCell::new(0, 0, 'a').fg(fg)).unwrap();
        buffer.put(GlyphCell::new(1, 0, 'a').fg(Color::rgb(255, 0, 255))).unwrap();

        let cast = DepthCast::new(ColorDepth::Ansi8, cast_depth);
        let mut cache = GlyphCache::new(BlockRasterizer::default());
        let mut surface = PixelSurface::new(16, 16);
        present(&buffer, &cast, &mut cache, &mut surface);

        // both cells collapse onto the same adapted identity
        let expected = CellIdentity::new('a', Color::rgb(255, 0, 255), Color::BLACK, CellStyle::empty());
        assert_eq!(cache.rasterizer().calls, vec![expected]);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn identical_cells_rasterize_once_per_session() {
        let mut buffer = GridBuffer::new(10, 1);
        buffer
            .put_str(0, 0, "aaaaaaaaaa", Color::WHITE, Color::BLACK, CellStyle::empty())
            .unwrap();

        let mut cache = GlyphCache::new(BlockRasterizer::default());
        let mut surface = PixelSurface::new(80, 16);
        for _ in 0..3 {
            present(&buffer, &DepthCast::default(), &mut cache, &mut surface);
        }

        assert_eq!(cache.rasterizer().calls.len(), 1);
        assert_eq!(cache.stats().lookups, 30);
    }

    #[test]
    fn empty_grid_draws_nothing() {
        let mut buffer = GridBuffer::new(1, 1);
        buffer.put(GlyphCell::new(0, 0, 'x')).unwrap();
        rogueterm_data::CellBuffer::resize(&mut buffer, 0, 0);

        let mut cache = GlyphCache::new(BlockRasterizer::default());
        let mut surface = PixelSurface::new(8, 16);
        let stats = present(&buffer, &DepthCast::default(), &mut cache, &mut surface);

        assert_eq!(stats, FrameStats::default());
        assert!(cache.rasterizer().calls.is_empty());
    }
}
