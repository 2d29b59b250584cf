use std::time::Duration;

use clap::Parser;
use color_eyre::{Report, eyre::eyre};
use rogueterm_core::ColorDepth;
use rogueterm_rasterizer::{FontConfig, RenderMode};

#[derive(Parser, Debug)]
#[command(
    name = "window-console",
    about = "Walk a small dungeon drawn by the rogueterm virtual console",
    long_about = "Opens a window sized to the requested grid and renders a roguelike scene \
                  through rogueterm. Move with the arrow keys or WASD, quit with Escape."
)]
pub struct Cli {
    /// Font family name; defaults to the system monospace font
    #[arg(short = 'f', long, value_name = "FAMILY")]
    pub font: Option<String>,

    /// Font size in pixels
    #[arg(short = 's', long, default_value = "16.0", value_name = "PIXELS")]
    pub font_size: f32,

    /// Grid width in cells
    #[arg(long, default_value = "80", value_name = "CELLS")]
    pub cols: u16,

    /// Grid height in cells
    #[arg(long, default_value = "30", value_name = "CELLS")]
    pub rows: u16,

    /// Color depth in bits per pixel: 24, 16, 8 or 3
    #[arg(short = 'd', long, default_value = "24", value_parser = parse_color_depth)]
    pub depth: ColorDepth,

    /// Glyph rendering quality: solid, shaded, lcd or blended
    #[arg(short = 'q', long, default_value = "shaded", value_parser = parse_render_mode)]
    pub quality: RenderMode,

    /// Window title
    #[arg(short = 't', long, default_value = "rogueterm")]
    pub title: String,

    /// Frame rate cap; 0 renders as fast as possible
    #[arg(long, default_value = "60", value_name = "FPS")]
    pub fps: u32,

    /// Stop after this many frames
    #[arg(long, value_name = "COUNT")]
    pub frames: Option<u64>,

    /// Underline position (0.0 = top, 1.0 = bottom of cell)
    #[arg(long, default_value = "0.85", value_name = "FRACTION")]
    pub underline_position: f32,

    /// Underline thickness as percentage of cell height
    #[arg(long, default_value = "5.0", value_name = "PERCENT")]
    pub underline_thickness: f32,

    /// Strikethrough position (0.0 = top, 1.0 = bottom of cell)
    #[arg(long, default_value = "0.5", value_name = "FRACTION")]
    pub strikethrough_position: f32,

    /// Strikethrough thickness as percentage of cell height
    #[arg(long, default_value = "5.0", value_name = "PERCENT")]
    pub strikethrough_thickness: f32,
}

fn parse_color_depth(s: &str) -> Result<ColorDepth, String> {
    s.parse::<u8>()
        .ok()
        .and_then(ColorDepth::from_bits_per_pixel)
        .ok_or_else(|| format!("Invalid color depth '{s}'. Use 24, 16, 8 or 3"))
}

fn parse_render_mode(s: &str) -> Result<RenderMode, String> {
    RenderMode::from_name(s).ok_or_else(|| {
        format!("Invalid quality '{s}'. Use solid, shaded, lcd or blended")
    })
}

impl Cli {
    /// Validates the CLI arguments
    pub fn validate(&self) -> Result<(), Report> {
        if self.cols == 0 || self.rows == 0 {
            return Err(eyre!("Grid must be at least 1x1 cells"));
        }

        // font size and decorations share the rasterizer's checks
        self.font_config()
            .validate()
            .map_err(|e| eyre!("Invalid font settings: {e}"))
    }

    pub fn font_config(&self) -> FontConfig {
        FontConfig {
            family: self.font.clone(),
            size_px: self.font_size,
            mode: self.quality,
            underline_position: self.underline_position,
            underline_thickness: self.underline_thickness,
            strikethrough_position: self.strikethrough_position,
            strikethrough_thickness: self.strikethrough_thickness,
        }
    }

    /// Minimum time between presented frames, if capped.
    pub fn frame_budget(&self) -> Option<Duration> {
        (self.fps > 0).then(|| Duration::from_secs(1) / self.fps)
    }
}
