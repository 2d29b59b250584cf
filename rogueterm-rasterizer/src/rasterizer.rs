use fontdb::Database;
use rogueterm_data::{CellIdentity, CellStyle, GlyphBitmap, GlyphRasterizer, RasterizeError};
use swash::{
    FontRef,
    scale::{Render, ScaleContext, Source, StrikeWith, image::Content},
    zeno::{Angle, Format, Transform},
};

use crate::{
    compose::{Canvas, Decorations},
    config::{FontConfig, RenderMode},
    face::FontFaces,
};

/// Synthetic bold stroke width, relative to the font size.
const EMBOLDEN_RATIO: f32 = 0.04;
/// Synthetic italic slant.
const ITALIC_SKEW_DEGREES: f32 = 14.0;

/// Color glyphs first so emoji keep their colors.
const SOURCES: &[Source] = &[
    Source::ColorOutline(0),
    Source::ColorBitmap(StrikeWith::BestFit),
    Source::Outline,
];

/// Pixel size of one cell and the baseline offset from its top.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellMetrics {
    pub width: u32,
    pub height: u32,
    pub baseline: i32,
}

impl CellMetrics {
    /// Cell size from the advance of a space and the font's vertical
    /// extents, all in pixels.
    ///
    /// # Errors
    /// Fails if the resulting cell would be empty.
    pub fn from_extents(advance: f32, ascent: f32, descent: f32) -> Result<Self, RasterizeError> {
        let width = advance.max(0.0).ceil() as u32;
        let height = (ascent + descent.abs()).max(0.0).ceil() as u32;
        if width == 0 || height == 0 {
            return Err(RasterizeError::Font(format!(
                "Font produces an empty {width}x{height} cell"
            )));
        }

        Ok(Self { width, height, baseline: ascent.round() as i32 })
    }

    fn measure(font: FontRef<'_>, size_px: f32) -> Result<Self, RasterizeError> {
        let metrics = font.metrics(&[]);
        let scale = size_px / metrics.units_per_em.max(1) as f32;

        let space = font.charmap().map(' ');
        let advance = font.glyph_metrics(&[]).advance_width(space) * scale;

        Self::from_extents(advance, metrics.ascent * scale, metrics.descent * scale)
    }
}

/// [`GlyphRasterizer`] backed by system fonts.
///
/// Each glyph is rendered into a bitmap of exactly one cell, so the
/// reference space defines the console's grid metrics. Bold and italic pick
/// the matching face when the family has one and are synthesized otherwise.
/// Characters the font lacks render as its `.notdef` glyph.
pub struct SwashRasterizer {
    config: FontConfig,
    faces: Option<FontFaces>,
    metrics: CellMetrics,
    decorations: Decorations,
    context: ScaleContext,
}

impl SwashRasterizer {
    /// Loads the configured family from the system font database.
    ///
    /// # Errors
    /// Fails if the configuration is invalid or no usable face is found.
    pub fn new(config: FontConfig) -> Result<Self, RasterizeError> {
        config.validate()?;

        let mut db = Database::new();
        db.load_system_fonts();
        tracing::debug!(faces = db.len(), "loaded system font database");

        Self::with_database(&db, config)
    }

    /// Loads the configured family from an existing font database.
    ///
    /// # Errors
    /// See [`SwashRasterizer::new`].
    pub fn with_database(db: &Database, config: FontConfig) -> Result<Self, RasterizeError> {
        config.validate()?;

        let faces = FontFaces::load(db, config.family.as_deref())?;
        let metrics = CellMetrics::measure(faces.regular().font(), config.size_px)?;
        let decorations = Decorations::for_cell(metrics.height, &config);

        tracing::debug!(
            family = config.family_name(),
            size_px = config.size_px,
            mode = config.mode.name(),
            cell_width = metrics.width,
            cell_height = metrics.height,
            "font ready"
        );

        Ok(Self {
            config,
            faces: Some(faces),
            metrics,
            decorations,
            context: ScaleContext::new(),
        })
    }

    #[must_use]
    pub fn metrics(&self) -> CellMetrics {
        self.metrics
    }

    #[must_use]
    pub fn config(&self) -> &FontConfig {
        &self.config
    }

    /// True once [`GlyphRasterizer::release`] has dropped the font faces.
    #[must_use]
    pub fn is_released(&self) -> bool {
        self.faces.is_none()
    }
}

impl GlyphRasterizer for SwashRasterizer {
    fn rasterize(&mut self, identity: &CellIdentity) -> Result<GlyphBitmap, RasterizeError> {
        let faces = self.faces.as_ref().ok_or_else(RasterizeError::font_released)?;
        let face = faces.select(identity.style);
        let CellMetrics { width, height, baseline } = self.metrics;
        let mut canvas = Canvas::new(width, height, identity.fg, identity.bg, self.config.mode);

        if !identity.ch.is_whitespace() {
            let font = face.font();
            let glyph_id = font.charmap().map(identity.ch);
            let mut scaler = self
                .context
                .builder(font)
                .size(self.config.size_px)
                .hint(true)
                .build();

            let mut render = Render::new(SOURCES);
            render.format(match self.config.mode {
                RenderMode::Lcd => Format::Subpixel,
                _ => Format::Alpha,
            });
            if face.synthesis.embolden {
                render.embolden(self.config.size_px * EMBOLDEN_RATIO);
            }
            if face.synthesis.skew {
                let skew = Angle::from_degrees(ITALIC_SKEW_DEGREES);
                render.transform(Some(Transform::skew(skew, Angle::ZERO)));
            }

            let image = render
                .render(&mut scaler, glyph_id)
                .ok_or_else(|| RasterizeError::glyph_render_failed(identity.ch))?;

            let placement = image.placement;
            let (left, top) = (placement.left, baseline - placement.top);
            let columns = placement.width as usize;
            match image.content {
                Content::Mask => {
                    for (i, &coverage) in image.data.iter().enumerate() {
                        let (x, y) = offset(i, columns);
                        canvas.cover(left + x, top + y, coverage);
                    }
                },
                Content::SubpixelMask => {
                    for (i, px) in image.data.chunks_exact(4).enumerate() {
                        let (x, y) = offset(i, columns);
                        canvas.cover_subpixel(left + x, top + y, [px[0], px[1], px[2]]);
                    }
                },
                Content::Color => {
                    for (i, px) in image.data.chunks_exact(4).enumerate() {
                        let (x, y) = offset(i, columns);
                        canvas.paint(left + x, top + y, [px[0], px[1], px[2], px[3]]);
                    }
                },
            }
        }

        if identity.style.contains(CellStyle::UNDERLINE) {
            let line = self.decorations.underline;
            canvas.hline(line.top, line.thickness);
        }
        if identity.style.contains(CellStyle::STRIKETHROUGH) {
            let line = self.decorations.strikethrough;
            canvas.hline(line.top, line.thickness);
        }

        Ok(canvas.into_bitmap())
    }

    fn release(&mut self) {
        if self.faces.take().is_some() {
            tracing::debug!(family = self.config.family_name(), "released font faces");
        }
    }
}

impl std::fmt::Debug for SwashRasterizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SwashRasterizer")
            .field("config", &self.config)
            .field("metrics", &self.metrics)
            .field("released", &self.is_released())
            .finish_non_exhaustive()
    }
}

/// (x, y) of the `index`th pixel in a row-major image `columns` wide.
fn offset(index: usize, columns: usize) -> (i32, i32) {
    let columns = columns.max(1);
    ((index % columns) as i32, (index / columns) as i32)
}

#[cfg(test)]
mod tests {
    use rogueterm_data::Color;

    use super::*;

    #[test]
    fn cell_metrics_round_up() {
        let metrics = CellMetrics::from_extents(7.2, 12.6, -3.1).unwrap();

        assert_eq!(metrics.width, 8);
        assert_eq!(metrics.height, 16);
        assert_eq!(metrics.baseline, 13);
    }

    #[test]
    fn empty_cell_is_an_error() {
        assert!(CellMetrics::from_extents(0.0, 12.0, 3.0).is_err());
        assert!(CellMetrics::from_extents(8.0, 0.0, 0.0).is_err());
    }

    #[test]
    fn pixel_offsets_are_row_major() {
        assert_eq!(offset(0, 3), (0, 0));
        assert_eq!(offset(4, 3), (1, 1));
        assert_eq!(offset(2, 0), (0, 2));
    }

    #[test]
    fn missing_family_fails_construction() {
        let db = Database::new();
        let config = FontConfig::new(Some("No Such Family Mono"), 16.0);

        assert!(matches!(
            SwashRasterizer::with_database(&db, config),
            Err(RasterizeError::Font(_))
        ));
    }

    #[test]
    fn invalid_config_fails_before_font_lookup() {
        let db = Database::new();
        let config = FontConfig::new(None, 0.0);

        let err = SwashRasterizer::with_database(&db, config).unwrap_err();
        assert!(err.to_string().contains("Font size"));
    }

    /// Exercises the full pipeline when the host has a monospace font.
    #[test]
    fn renders_with_system_font_when_available() {
        let Ok(mut rasterizer) = SwashRasterizer::new(FontConfig::default()) else {
            return;
        };
        let CellMetrics { width, height, .. } = rasterizer.metrics();

        let space = CellIdentity::new(' ', Color::BLACK, Color::BLACK, CellStyle::empty());
        assert_eq!(rasterizer.rasterize(&space).unwrap().size(), (width, height));

        let underlined = CellIdentity::new('_', Color::WHITE, Color::BLACK, CellStyle::UNDERLINE);
        let bitmap = rasterizer.rasterize(&underlined).unwrap();
        assert_eq!(bitmap.size(), (width, height));

        rasterizer.release();
        rasterizer.release();
        assert!(rasterizer.is_released());
        assert!(rasterizer.rasterize(&space).is_err());
    }
}
