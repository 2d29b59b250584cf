//! Plain data shared by the rogueterm crates: console cells, colors, text
//! styles, the cell buffer, and the contract a glyph rasterizer fulfills.

mod buffer;
mod cell;
mod color;
mod raster;

pub use buffer::{BufferError, CellBuffer, GridBuffer};
pub use cell::{Cell, CellIdentity, CellStyle, GlyphCell, RectCell};
pub use color::{Color, ColorDepth, DepthAdapter, DepthCast, cast_depth};
pub use raster::{GlyphBitmap, GlyphRasterizer, RasterizeError};
