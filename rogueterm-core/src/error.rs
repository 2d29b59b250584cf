use rogueterm_data::RasterizeError;

/// Error type returned by a failing per-frame callback.
pub type CallbackError = Box<dyn std::error::Error + Send + Sync>;

/// Error categories for the presentation engine.
///
/// None of these are retried: each one unwinds the console to an orderly
/// shutdown.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The glyph rasterizer could not produce an image.
    #[error("Rasterization error: {0}")]
    Rasterization(#[from] RasterizeError),

    /// Surface, window or font acquisition and management errors.
    #[error("Resource error: {0}")]
    Resource(String),

    /// The per-frame callback failed; the callback's error is the source.
    #[error("Frame callback failed: {0}")]
    Callback(#[source] CallbackError),
}

impl Error {
    // Resource errors
    pub fn zero_cell_size(width: u32, height: u32) -> Self {
        Self::Resource(format!(
            "Reference glyph rasterized to an empty cell ({width}x{height})"
        ))
    }

    pub fn image_creation_failed(detail: &str) -> Self {
        Self::Resource(format!("Failed to create glyph image: {detail}"))
    }

    pub fn surface_creation_failed(detail: &str) -> Self {
        Self::Resource(format!("Failed to create surface: {detail}"))
    }

    pub fn window_creation_failed(detail: &str) -> Self {
        Self::Resource(format!("Failed to create window: {detail}"))
    }

    pub fn present_failed(detail: &str) -> Self {
        Self::Resource(format!("Failed to present frame: {detail}"))
    }
}
