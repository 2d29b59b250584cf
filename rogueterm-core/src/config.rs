use compact_str::CompactString;
use rogueterm_data::{Color, ColorDepth};

/// Startup settings for a [`VirtualConsole`](crate::VirtualConsole).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleConfig {
    pub title: CompactString,
    /// Initial window size in pixels. Backends use it when creating their
    /// surface; the console itself sizes the buffer from `buffer_size`.
    pub window_size: (u32, u32),
    /// Initial grid size in (columns, rows).
    pub buffer_size: (u16, u16),
    pub background: Color,
    pub color_depth: ColorDepth,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            title: CompactString::const_new("rogueterm"),
            window_size: (640, 480),
            buffer_size: (80, 30),
            background: Color::BLACK,
            color_depth: ColorDepth::TrueColor,
        }
    }
}

impl ConsoleConfig {
    #[must_use]
    pub fn with_title(mut self, title: &str) -> Self {
        self.title = CompactString::new(title);
        self
    }

    #[must_use]
    pub fn with_window_size(mut self, width: u32, height: u32) -> Self {
        self.window_size = (width, height);
        self
    }

    #[must_use]
    pub fn with_buffer_size(mut self, cols: u16, rows: u16) -> Self {
        self.buffer_size = (cols, rows);
        self
    }

    #[must_use]
    pub fn with_background(mut self, background: Color) -> Self {
        self.background = background;
        self
    }

    #[must_use]
    pub fn with_color_depth(mut self, depth: ColorDepth) -> Self {
        self.color_depth = depth;
        self
    }
}
