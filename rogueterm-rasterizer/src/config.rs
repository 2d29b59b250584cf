use rogueterm_data::RasterizeError;

/// How glyph coverage is turned into pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum RenderMode {
    /// Coverage thresholded to on/off, over an opaque background.
    Solid,
    /// Antialiased foreground over an opaque background.
    #[default]
    Shaded,
    /// Per-channel subpixel antialiasing over an opaque background.
    Lcd,
    /// Antialiased foreground over a transparent background.
    Blended,
}

impl RenderMode {
    pub const ALL: [RenderMode; 4] =
        [RenderMode::Solid, RenderMode::Shaded, RenderMode::Lcd, RenderMode::Blended];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            RenderMode::Solid => "solid",
            RenderMode::Shaded => "shaded",
            RenderMode::Lcd => "lcd",
            RenderMode::Blended => "blended",
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|mode| mode.name().eq_ignore_ascii_case(name))
    }
}

/// Font selection and rendering settings for a
/// [`SwashRasterizer`](crate::SwashRasterizer).
#[derive(Debug, Clone, PartialEq)]
pub struct FontConfig {
    /// Font family name; `None` selects the system monospace family.
    pub family: Option<String>,
    /// Font size in pixels.
    pub size_px: f32,
    pub mode: RenderMode,
    /// Underline position as a fraction of the cell height, from the top.
    pub underline_position: f32,
    /// Underline thickness in percent of the cell height.
    pub underline_thickness: f32,
    /// Strikethrough position as a fraction of the cell height, from the top.
    pub strikethrough_position: f32,
    /// Strikethrough thickness in percent of the cell height.
    pub strikethrough_thickness: f32,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            family: None,
            size_px: 16.0,
            mode: RenderMode::Shaded,
            underline_position: 0.85,
            underline_thickness: 5.0,
            strikethrough_position: 0.5,
            strikethrough_thickness: 5.0,
        }
    }
}

impl FontConfig {
    #[must_use]
    pub fn new(family: Option<&str>, size_px: f32) -> Self {
        Self {
            family: family.map(str::to_owned),
            size_px,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_mode(mut self, mode: RenderMode) -> Self {
        self.mode = mode;
        self
    }

    /// Display name of the configured family.
    #[must_use]
    pub fn family_name(&self) -> &str {
        self.family.as_deref().unwrap_or("monospace")
    }

    /// Checks that sizes and decoration settings are usable.
    ///
    /// # Errors
    /// Returns [`RasterizeError::Font`] naming the first invalid setting.
    pub fn validate(&self) -> Result<(), RasterizeError> {
        if !self.size_px.is_finite() || self.size_px <= 0.0 {
            return Err(RasterizeError::Font(format!(
                "Font size must be positive, got {}",
                self.size_px
            )));
        }

        let fractions = [
            ("underline position", self.underline_position),
            ("strikethrough position", self.strikethrough_position),
        ];
        for (name, value) in fractions {
            if !(0.0..=1.0).contains(&value) {
                return Err(RasterizeError::Font(format!(
                    "{name} must be between 0.0 and 1.0, got {value}"
                )));
            }
        }

        let thicknesses = [
            ("underline thickness", self.underline_thickness),
            ("strikethrough thickness", self.strikethrough_thickness),
        ];
        for (name, value) in thicknesses {
            if value <= 0.0 || value > 100.0 {
                return Err(RasterizeError::Font(format!(
                    "{name} must be in (0, 100] percent, got {value}"
                )));
            }
        }

        Ok(())
    }
}
