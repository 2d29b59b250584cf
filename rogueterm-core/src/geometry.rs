use rogueterm_data::{CellIdentity, CellStyle, Color, GlyphRasterizer, RectCell};

use crate::{error::Error, surface::PixelRect};

/// The character whose rasterized extent defines the cell size.
pub const REFERENCE_GLYPH: char = ' ';

/// Pixel size of one grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridMetrics {
    pub cell_width: u32,
    pub cell_height: u32,
}

/// Maps between grid coordinates and surface pixels.
///
/// The cell size is fixed at construction; resizing the surface changes the
/// number of cells, never their size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridGeometry {
    metrics: GridMetrics,
}

impl GridGeometry {
    /// Creates the geometry for a known cell size.
    ///
    /// # Errors
    /// Fails with [`Error::Resource`] if either dimension is zero.
    pub fn new(cell_width: u32, cell_height: u32) -> Result<Self, Error> {
        if cell_width == 0 || cell_height == 0 {
            return Err(Error::zero_cell_size(cell_width, cell_height));
        }

        Ok(Self { metrics: GridMetrics { cell_width, cell_height } })
    }

    /// Derives the cell size by rasterizing [`REFERENCE_GLYPH`].
    ///
    /// # Errors
    /// Propagates rasterizer failures, and fails if the reference glyph has
    /// an empty extent.
    pub fn from_rasterizer<R: GlyphRasterizer + ?Sized>(rasterizer: &mut R) -> Result<Self, Error> {
        let reference =
            CellIdentity::new(REFERENCE_GLYPH, Color::BLACK, Color::BLACK, CellStyle::empty());
        let (width, height) = rasterizer.rasterize(&reference)?.size();

        tracing::debug!(width, height, "derived cell size from reference glyph");
        Self::new(width, height)
    }

    #[must_use]
    pub fn metrics(&self) -> GridMetrics {
        self.metrics
    }

    /// (width, height) of one cell in pixels.
    #[must_use]
    pub fn cell_size(&self) -> (u32, u32) {
        (self.metrics.cell_width, self.metrics.cell_height)
    }

    /// Destination rectangle of the glyph cell at (`col`, `row`).
    #[must_use]
    pub fn cell_to_pixel_rect(&self, col: u16, row: u16) -> PixelRect {
        let (w, h) = self.cell_size();
        PixelRect::new(
            (col as u32).saturating_mul(w),
            (row as u32).saturating_mul(h),
            w,
            h,
        )
    }

    /// Destination rectangle of a rectangle cell: pixel origin, extent in
    /// cells.
    #[must_use]
    pub fn rect_cell_to_pixel_rect(&self, rect: &RectCell) -> PixelRect {
        let (w, h) = self.cell_size();
        PixelRect::new(
            rect.x,
            rect.y,
            (rect.width as u32).saturating_mul(w),
            (rect.height as u32).saturating_mul(h),
        )
    }

    /// Grid size (columns, rows) that fits a surface of the given pixel size.
    ///
    /// Partial cells are dropped; a surface smaller than one cell yields a
    /// zero dimension.
    #[must_use]
    pub fn on_surface_resized(&self, pixel_width: u32, pixel_height: u32) -> (u16, u16) {
        let (w, h) = self.cell_size();
        let clamp = |cells: u32| u16::try_from(cells).unwrap_or(u16::MAX);

        (clamp(pixel_width / w), clamp(pixel_height / h))
    }

    /// Pixel size of a surface holding exactly `cols` x `rows` cells.
    #[must_use]
    pub fn surface_size_for(&self, cols: u16, rows: u16) -> (u32, u32) {
        let (w, h) = self.cell_size();
        ((cols as u32).saturating_mul(w), (rows as u32).saturating_mul(h))
    }
}

#[cfg(test)]
mod tests {
    use rogueterm_data::{GlyphBitmap, RasterizeError};

    use super::*;

    fn geometry() -> GridGeometry {
        GridGeometry::new(8, 16).unwrap()
    }

    #[test]
    fn cell_rects() {
        let geometry = geometry();

        assert_eq!(geometry.cell_to_pixel_rect(0, 0), PixelRect::new(0, 0, 8, 16));
        assert_eq!(geometry.cell_to_pixel_rect(79, 29), PixelRect::new(632, 464, 8, 16));
    }

    #[test]
    fn rect_cell_keeps_pixel_origin() {
        let rect = RectCell::new(5, 7, 3, 2, Color::WHITE);

        assert_eq!(
            geometry().rect_cell_to_pixel_rect(&rect),
            PixelRect::new(5, 7, 24, 32)
        );
    }

    #[test]
    fn resize_floors_to_whole_cells() {
        let geometry = geometry();

        assert_eq!(geometry.on_surface_resized(640, 480), (80, 30));
        assert_eq!(geometry.on_surface_resized(645, 483), (80, 30));
        assert_eq!(geometry.on_surface_resized(4, 4), (0, 0));
        assert_eq!(geometry.on_surface_resized(8, 15), (1, 0));
    }

    #[test]
    fn resize_saturates_huge_surfaces() {
        let geometry = GridGeometry::new(1, 1).unwrap();
        assert_eq!(geometry.on_surface_resized(u32::MAX, 70_000), (u16::MAX, u16::MAX));
    }

    #[test]
    fn surface_size_inverts_resize() {
        let geometry = geometry();
        let (w, h) = geometry.surface_size_for(80, 30);

        assert_eq!((w, h), (640, 480));
        assert_eq!(geometry.on_surface_resized(w, h), (80, 30));
    }

    #[test]
    fn zero_cell_size_is_rejected() {
        assert!(matches!(GridGeometry::new(0, 16), Err(Error::Resource(_))));
        assert!(matches!(GridGeometry::new(8, 0), Err(Error::Resource(_))));
    }

    struct FixedRasterizer(u32, u32);

    impl GlyphRasterizer for FixedRasterizer {
        fn rasterize(&mut self, identity: &CellIdentity) -> Result<GlyphBitmap, RasterizeError> {
            assert_eq!(identity.ch, REFERENCE_GLYPH);
            Ok(GlyphBitmap::filled(self.0, self.1, [0, 0, 0, 255]))
        }
    }

    #[test]
    fn metrics_from_reference_glyph() {
        let geometry = GridGeometry::from_rasterizer(&mut FixedRasterizer(9, 18)).unwrap();

        assert_eq!(geometry.metrics(), GridMetrics { cell_width: 9, cell_height: 18 });
        assert!(GridGeometry::from_rasterizer(&mut FixedRasterizer(0, 0)).is_err());
    }
}
