mod pixel;

pub use pixel::{PixelImage, PixelSurface};
use rogueterm_data::{Color, GlyphBitmap};

use crate::error::Error;

/// Destination rectangle on a surface, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    #[must_use]
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }
}

/// A pixel-addressable render target.
///
/// Mirrors a classic 2D renderer: a current draw color used by [`clear`] and
/// [`fill_rect`], images created from rasterized glyphs and copied into
/// rectangles, and an explicit [`present`] that makes the frame visible.
///
/// [`clear`]: Surface::clear
/// [`fill_rect`]: Surface::fill_rect
/// [`present`]: Surface::present
pub trait Surface {
    /// Handle to an image owned by this surface.
    type Image;

    /// Current size in pixels.
    fn pixel_size(&self) -> (u32, u32);

    /// Sets the color used by subsequent `clear` and `fill_rect` calls.
    fn set_draw_color(&mut self, color: Color);

    /// Fills the whole surface with the current draw color.
    fn clear(&mut self);

    /// Fills `rect` with the current draw color.
    fn fill_rect(&mut self, rect: PixelRect);

    /// Copies `image` into `dst`, scaling it to the rectangle.
    fn copy_image(&mut self, image: &Self::Image, dst: PixelRect);

    /// Makes the drawn frame visible.
    ///
    /// # Errors
    /// Fails if the underlying display rejects the frame.
    fn present(&mut self) -> Result<(), Error>;

    /// Uploads a rasterized glyph into a surface-owned image.
    ///
    /// # Errors
    /// Fails if the surface cannot allocate the image.
    fn create_image(&mut self, bitmap: &GlyphBitmap) -> Result<Self::Image, Error>;

    /// Releases an image created by [`create_image`](Surface::create_image).
    fn destroy_image(&mut self, image: Self::Image);

    /// Sets the window title, if the surface has one.
    fn set_title(&mut self, _title: &str) {}

    /// Releases the native renderer. Called once during console teardown;
    /// must tolerate repeated calls.
    fn release(&mut self) {}
}

