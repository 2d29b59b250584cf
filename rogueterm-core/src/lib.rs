//! Grid-to-pixel presentation engine for character-cell virtual consoles.
//!
//! A [`VirtualConsole`] owns a cell buffer and a pixel [`Surface`]. Every
//! frame it drains input events, hands the buffer to a callback, and draws
//! each cell: glyph cells through a [`GlyphCache`] of rasterized images,
//! rectangle cells as solid fills.

pub mod console;
pub mod error;
pub mod event;
pub mod surface;

mod config;
mod geometry;
mod glyph_cache;
mod presenter;

pub use ::rogueterm_data::{
    BufferError, Cell, CellBuffer, CellIdentity, CellStyle, Color, ColorDepth, DepthAdapter,
    DepthCast, GlyphBitmap, GlyphCell, GlyphRasterizer, GridBuffer, RasterizeError, RectCell,
    cast_depth,
};
pub use config::ConsoleConfig;
pub use console::{Backend, ConsoleState, Frame, VirtualConsole};
pub use error::{CallbackError, Error};
pub use event::{ConsoleEvent, EventSource, QueuedEvents};
pub use geometry::{GridGeometry, GridMetrics, REFERENCE_GLYPH};
pub use glyph_cache::{CacheStats, GlyphCache, RasterImage};
pub use presenter::{FrameResources, FrameStats, present_frame};
pub use surface::{PixelImage, PixelRect, PixelSurface, Surface};
