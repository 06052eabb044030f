//! promo-core – rendering pipeline for promotional banners and football
//! schedule cards.
//!
//! The crate is split along the request flow:
//! - [`fetch`] downloads remote assets and substitutes placeholders on failure
//! - [`layout`] derives the per-resolution composition plan
//! - [`overlay`] / [`html`] turn content into SVG or HTML markup
//! - [`compose`] rasterises and encodes the final JPEG
//! - [`pipeline`] ties the steps together for every supported resolution

pub mod color;
pub mod compose;
pub mod content;
pub mod error;
pub mod fetch;
pub mod html;
pub mod layout;
pub mod overlay;
pub mod pipeline;
pub mod placeholder;
pub mod sample;
pub mod screenshot;
pub mod text;

mod background;

pub use content::{
    Contact, Content, ContentKind, Game, MovieContent, RenderConfig, Resolution, ScheduleContent,
};
pub use error::RenderError;
pub use fetch::{AssetFetcher, AssetOrigin, Fit, HttpFetcher, OfflineFetcher, RenderedAsset};
pub use pipeline::{OutputFormat, RenderSet, RenderedImage, Renderer};
pub use screenshot::{ScreenshotCapability, Screenshotter};
