//! Native glyph rasterization for rogueterm.
//!
//! Fonts are discovered through `fontdb` and rendered with `swash`. Every
//! glyph is drawn into a bitmap the size of one console cell, with the cell's
//! colors, style and decorations already applied.

mod compose;
mod config;
mod face;
mod rasterizer;

pub use config::{FontConfig, RenderMode};
pub use rasterizer::{CellMetrics, SwashRasterizer};
