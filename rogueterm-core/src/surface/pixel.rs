use compact_str::CompactString;
use rogueterm_data::{Color, GlyphBitmap};

use super::{PixelRect, Surface};
use crate::error::Error;

/// A glyph image held by a [`PixelSurface`], RGBA per pixel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelImage {
    width: u32,
    height: u32,
    pixels: Vec<[u8; 4]>,
}

impl PixelImage {
    #[must_use]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        (x < self.width && y < self.height)
            .then(|| self.pixels[(y * self.width + x) as usize])
    }
}

/// Software render target backed by a `0x00RRGGBB` framebuffer.
///
/// Used headless (tests, benchmarks, screenshots) and as the back buffer of
/// windowed backends that blit the finished frame to the screen.
#[derive(Debug, Clone)]
pub struct PixelSurface {
    width: u32,
    height: u32,
    pixels: Vec<u32>,
    draw_color: Color,
    frames_presented: u64,
    title: CompactString,
}

impl PixelSurface {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize],
            draw_color: Color::BLACK,
            frames_presented: 0,
            title: CompactString::default(),
        }
    }

    /// Resizes the framebuffer; the new content is black.
    pub fn resize(&mut self, width: u32, height: u32) {
        if (width, height) == (self.width, self.height) {
            return;
        }

        self.width = width;
        self.height = height;
        self.pixels = vec![0; width as usize * height as usize];
    }

    /// The framebuffer, row-major `0x00RRGGBB`.
    #[must_use]
    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        (x < self.width && y < self.height)
            .then(|| Color::from_u32(self.pixels[self.index(x, y)]))
    }

    #[must_use]
    pub fn draw_color(&self) -> Color {
        self.draw_color
    }

    #[must_use]
    pub fn frames_presented(&self) -> u64 {
        self.frames_presented
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Clips `rect` to the surface, returning `(x0, y0, x1, y1)` with
    /// exclusive upper bounds.
    fn clip(&self, rect: PixelRect) -> Option<(u32, u32, u32, u32)> {
        let x0 = rect.x.min(self.width);
        let y0 = rect.y.min(self.height);
        let x1 = rect.x.saturating_add(rect.width).min(self.width);
        let y1 = rect.y.saturating_add(rect.height).min(self.height);

        (x0 < x1 && y0 < y1).then_some((x0, y0, x1, y1))
    }
}

impl Surface for PixelSurface {
    type Image = PixelImage;

    fn pixel_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn set_draw_color(&mut self, color: Color) {
        self.draw_color = color;
    }

    fn clear(&mut self) {
        self.pixels.fill(self.draw_color.to_u32());
    }

    fn fill_rect(&mut self, rect: PixelRect) {
        let Some((x0, y0, x1, y1)) = self.clip(rect) else { return };

        let color = self.draw_color.to_u32();
        for y in y0..y1 {
            let row = self.index(x0, y)..self.index(x1, y);
            self.pixels[row].fill(color);
        }
    }

    fn copy_image(&mut self, image: &PixelImage, dst: PixelRect) {
        if image.width == 0 || image.height == 0 {
            return;
        }
        let Some((x0, y0, x1, y1)) = self.clip(dst) else { return };

        // nearest-neighbor scaling from image space into dst
        for y in y0..y1 {
            let sy = ((y - dst.y) as u64 * image.height as u64 / dst.height as u64) as u32;
            for x in x0..x1 {
                let sx = ((x - dst.x) as u64 * image.width as u64 / dst.width as u64) as u32;
                let src = image.pixels[(sy * image.width + sx) as usize];
                let idx = self.index(x, y);
                self.pixels[idx] = blend(src, self.pixels[idx]);
            }
        }
    }

    fn present(&mut self) -> Result<(), Error> {
        self.frames_presented += 1;
        Ok(())
    }

    fn create_image(&mut self, bitmap: &GlyphBitmap) -> Result<PixelImage, Error> {
        let pixels = bitmap
            .pixels()
            .chunks_exact(4)
            .map(|px| [px[0], px[1], px[2], px[3]])
            .collect();

        Ok(PixelImage {
            width: bitmap.width(),
            height: bitmap.height(),
            pixels,
        })
    }

    fn destroy_image(&mut self, _image: PixelImage) {}

    fn set_title(&mut self, title: &str) {
        self.title = CompactString::new(title);
    }
}

/// Source-over blend of an RGBA pixel onto a packed RGB pixel.
fn blend(src: [u8; 4], dst: u32) -> u32 {
    let [r, g, b, a] = src;
    match a {
        0xff => Color::rgb(r, g, b).to_u32(),
        0x00 => dst,
        a => {
            let under = Color::from_u32(dst);
            let mix = |s: u8, d: u8| -> u8 {
                ((s as u32 * a as u32 + d as u32 * (255 - a as u32) + 127) / 255) as u8
            };
            Color::rgb(mix(r, under.r), mix(g, under.g), mix(b, under.b)).to_u32()
        },
    }
}
