/// An opaque 24-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color {
    /// Red channel
    pub r: u8,
    /// Green channel
    pub g: u8,
    /// Blue channel
    pub b: u8,
}

impl Color {
    /// Pure black, the default console background.
    pub const BLACK: Color = Color::rgb(0x00, 0x00, 0x00);
    /// Pure white, the default glyph foreground.
    pub const WHITE: Color = Color::rgb(0xff, 0xff, 0xff);

    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Unpacks a `0x00RRGGBB` value.
    #[must_use]
    pub const fn from_u32(rgb: u32) -> Self {
        Self {
            r: (rgb >> 16) as u8,
            g: (rgb >> 8) as u8,
            b: rgb as u8,
        }
    }

    /// Packs the color as `0x00RRGGBB`.
    #[must_use]
    pub const fn to_u32(self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | (self.b as u32)
    }

    /// Returns the color as opaque RGBA bytes.
    #[must_use]
    pub const fn to_rgba(self) -> [u8; 4] {
        [self.r, self.g, self.b, 0xff]
    }
}

impl From<(u8, u8, u8)> for Color {
    fn from((r, g, b): (u8, u8, u8)) -> Self {
        Self::rgb(r, g, b)
    }
}

impl From<u32> for Color {
    fn from(rgb: u32) -> Self {
        Self::from_u32(rgb)
    }
}

/// Color depth of the display the console presents to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ColorDepth {
    /// 8 bits per channel; colors pass through unchanged.
    #[default]
    TrueColor,
    /// 16-bit RGB565.
    HighColor,
    /// 8-bit RGB332.
    Indexed256,
    /// One bit per channel, the eight classic terminal colors.
    Ansi8,
}

impl ColorDepth {
    pub const ALL: [ColorDepth; 4] = [
        ColorDepth::TrueColor,
        ColorDepth::HighColor,
        ColorDepth::Indexed256,
        ColorDepth::Ansi8,
    ];

    /// Bits retained per (red, green, blue) channel.
    #[must_use]
    pub const fn channel_bits(self) -> (u8, u8, u8) {
        match self {
            ColorDepth::TrueColor => (8, 8, 8),
            ColorDepth::HighColor => (5, 6, 5),
            ColorDepth::Indexed256 => (3, 3, 2),
            ColorDepth::Ansi8 => (1, 1, 1),
        }
    }

    /// Total bits per pixel.
    #[must_use]
    pub const fn bits_per_pixel(self) -> u8 {
        let (r, g, b) = self.channel_bits();
        r + g + b
    }

    /// Looks up a depth by its bits per pixel (24, 16, 8 or 3).
    #[must_use]
    pub fn from_bits_per_pixel(bits: u8) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|depth| depth.bits_per_pixel() == bits)
    }
}

/// Maps a color to the nearest color representable at a target depth.
///
/// Must be pure; the presenter calls it once per color-bearing field per cell
/// per frame.
pub type DepthAdapter = fn(Color, ColorDepth) -> Color;

/// Default [`DepthAdapter`]: quantizes each channel to the depth's bit count
/// and expands it back to 8 bits.
#[must_use]
pub fn cast_depth(color: Color, depth: ColorDepth) -> Color {
    let (r, g, b) = depth.channel_bits();
    Color::rgb(
        quantize(color.r, r),
        quantize(color.g, g),
        quantize(color.b, b),
    )
}

fn quantize(value: u8, bits: u8) -> u8 {
    if bits >= 8 {
        return value;
    }

    let levels = (1u16 << bits) - 1;
    let level = (value as u16 * levels + 127) / 255;
    ((level * 255 + levels / 2) / levels) as u8
}

/// A target depth paired with the adapter that casts colors to it.
#[derive(Debug, Clone, Copy)]
pub struct DepthCast {
    pub depth: ColorDepth,
    pub adapter: DepthAdapter,
}

impl DepthCast {
    #[must_use]
    pub fn new(depth: ColorDepth, adapter: DepthAdapter) -> Self {
        Self { depth, adapter }
    }

    #[must_use]
    pub fn apply(&self, color: Color) -> Color {
        (self.adapter)(color, self.depth)
    }
}

impl Default for DepthCast {
    fn default() -> Self {
        Self::new(ColorDepth::TrueColor, cast_depth)
    }
}
