use thiserror::Error;

/// Errors raised while turning content into an encoded image.
///
/// Asset download failures never show up here; the fetch layer substitutes a
/// placeholder instead.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The generated SVG markup could not be parsed.
    #[error("svg parse error: {0}")]
    Svg(#[from] usvg::Error),

    /// A pixmap or image buffer could not be allocated.
    #[error("raster error: {0}")]
    Raster(String),

    /// JPEG encoding (or any other `image` crate operation) failed.
    #[error("image encode error: {0}")]
    Encode(#[from] image::ImageError),

    /// A blocking render task panicked or was cancelled.
    #[error("render task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    /// The headless browser failed to produce a screenshot.
    #[error("screenshot failed: {0}")]
    Screenshot(String),
}

impl RenderError {
    pub fn raster(msg: impl Into<String>) -> Self {
        RenderError::Raster(msg.into())
    }
}
