use crate::CellIdentity;

/// CPU-side RGBA8 image of one rasterized glyph, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlyphBitmap {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl GlyphBitmap {
    /// Wraps raw RGBA8 pixel data.
    ///
    /// # Errors
    /// Fails if `pixels` does not hold exactly `width * height` RGBA pixels.
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, RasterizeError> {
        let expected = width as usize * height as usize * 4;
        if pixels.len() != expected {
            return Err(RasterizeError::bitmap_size_mismatch(
                width,
                height,
                pixels.len(),
            ));
        }

        Ok(Self { width, height, pixels })
    }

    /// Creates a bitmap with every pixel set to `rgba`.
    #[must_use]
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let pixels = rgba.repeat(width as usize * height as usize);
        Self { width, height, pixels }
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// (width, height) in pixels.
    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    #[must_use]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        let idx = self.offset(x, y)?;
        let mut rgba = [0; 4];
        rgba.copy_from_slice(&self.pixels[idx..idx + 4]);
        Some(rgba)
    }

    /// Sets a pixel; coordinates outside the bitmap are ignored.
    pub fn put_pixel(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        if let Some(idx) = self.offset(x, y) {
            self.pixels[idx..idx + 4].copy_from_slice(&rgba);
        }
    }

    fn offset(&self, x: u32, y: u32) -> Option<usize> {
        (x < self.width && y < self.height)
            .then(|| (y as usize * self.width as usize + x as usize) * 4)
    }
}

/// Turns a cell's appearance into pixels.
///
/// Style is part of every call: implementations must not carry font style
/// over from one call to the next.
pub trait GlyphRasterizer {
    /// Rasterizes one glyph with its colors and style applied.
    ///
    /// # Errors
    /// Fails if the underlying font engine cannot produce an image.
    fn rasterize(&mut self, identity: &CellIdentity) -> Result<GlyphBitmap, RasterizeError>;

    /// Releases font resources. Called once during console teardown; must
    /// tolerate repeated calls.
    fn release(&mut self) {}
}

impl<R: GlyphRasterizer + ?Sized> GlyphRasterizer for Box<R> {
    fn rasterize(&mut self, identity: &CellIdentity) -> Result<GlyphBitmap, RasterizeError> {
        (**self).rasterize(identity)
    }

    fn release(&mut self) {
        (**self).release();
    }
}

/// Failure to produce a glyph image.
#[derive(thiserror::Error, Debug)]
pub enum RasterizeError {
    /// Font discovery, loading or parsing errors.
    #[error("Font error: {0}")]
    Font(String),

    /// The font engine could not render a specific glyph.
    #[error("Glyph error: {0}")]
    Glyph(String),

    /// Pixel data does not match its declared dimensions.
    #[error("Bitmap error: {0}")]
    Bitmap(String),
}

impl RasterizeError {
    pub fn font_not_found(family: &str) -> Self {
        Self::Font(format!("No font face found for family '{family}'"))
    }

    pub fn font_load_failed(family: &str) -> Self {
        Self::Font(format!("Failed to load font data for '{family}'"))
    }

    pub fn font_released() -> Self {
        Self::Font("Font resources were already released".to_string())
    }

    pub fn glyph_render_failed(ch: char) -> Self {
        Self::Glyph(format!("Failed to render glyph {ch:?}"))
    }

    pub fn bitmap_size_mismatch(width: u32, height: u32, len: usize) -> Self {
        Self::Bitmap(format!(
            "Expected {width}x{height} RGBA pixels, got {len} bytes"
        ))
    }
}
