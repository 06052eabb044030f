//! The render pipeline: one parameterised flow for every content kind.
//!
//! For each of the three resolutions the pipeline fetches the background and
//! the positioned images concurrently, builds the SVG underlay/overlay, and
//! composes the final JPEG on the blocking pool. Resolutions render
//! concurrently and share nothing mutable.

use std::sync::Arc;
use std::time::Instant;

use futures::future::{join_all, try_join_all};
use image::{RgbaImage, imageops};
use tracing::{debug, info, warn};

use crate::background::gradient_svg;
use crate::color::resolve_base;
use crate::compose::{Compositor, Layer, Scene};
use crate::content::{Content, ContentKind, RenderConfig, Resolution, ScheduleContent};
use crate::error::RenderError;
use crate::fetch::{AssetFetcher, Fit};
use crate::html::schedule_document;
use crate::layout::{CompositionPlan, PlanBody, Rect};
use crate::overlay::scene_markup;
use crate::placeholder::initials;
use crate::screenshot::{ScreenshotCapability, Screenshotter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Jpeg,
    Html,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "jpg",
            OutputFormat::Html => "html",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "image/jpeg",
            OutputFormat::Html => "text/html; charset=utf-8",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "jpeg",
            OutputFormat::Html => "html",
        }
    }
}

/// Encoded output for one resolution.
#[derive(Debug, Clone)]
pub struct RenderedImage {
    pub resolution: Resolution,
    pub format: OutputFormat,
    pub bytes: Vec<u8>,
}

/// All resolutions rendered for one request, in [`Resolution::ALL`] order.
#[derive(Debug, Clone)]
pub struct RenderSet {
    pub kind: ContentKind,
    pub images: Vec<RenderedImage>,
}

impl RenderSet {
    pub fn get(&self, resolution: Resolution) -> Option<&RenderedImage> {
        self.images.iter().find(|i| i.resolution == resolution)
    }

    pub fn format(&self) -> OutputFormat {
        self.images.first().map_or(OutputFormat::Jpeg, |i| i.format)
    }
}

/// A positioned image to fetch for one resolution.
struct LayerRequest {
    url: String,
    rect: Rect,
    fit: Fit,
    label: String,
}

impl LayerRequest {
    fn new(url: &str, rect: Rect, fit: Fit, label: impl Into<String>) -> Self {
        Self { url: url.to_owned(), rect, fit, label: label.into() }
    }
}

#[derive(Clone)]
pub struct Renderer {
    config: Arc<RenderConfig>,
    fetcher: Arc<dyn AssetFetcher>,
    compositor: Compositor,
    capability: ScreenshotCapability,
    screenshotter: Option<Arc<dyn Screenshotter>>,
}

impl std::fmt::Debug for Renderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Renderer")
            .field("config", &self.config)
            .field("compositor", &self.compositor)
            .field("capability", &self.capability)
            .finish_non_exhaustive()
    }
}

impl Renderer {
    pub fn new(config: RenderConfig, fetcher: Arc<dyn AssetFetcher>, compositor: Compositor) -> Self {
        Self {
            config: Arc::new(config),
            fetcher,
            compositor,
            capability: ScreenshotCapability::Unavailable("not probed".into()),
            screenshotter: None,
        }
    }

    pub fn with_screenshots(
        mut self,
        capability: ScreenshotCapability,
        screenshotter: Option<Arc<dyn Screenshotter>>,
    ) -> Self {
        self.capability = match (&capability, &screenshotter) {
            (ScreenshotCapability::Available, None) => {
                ScreenshotCapability::Unavailable("no screenshotter supplied".into())
            }
            _ => capability,
        };
        self.screenshotter = if self.capability.is_available() { screenshotter } else { None };
        self
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn screenshot_capability(&self) -> &ScreenshotCapability {
        &self.capability
    }

    /// Render `content` at every resolution as JPEG.
    pub async fn render(&self, content: &Content) -> Result<RenderSet, RenderError> {
        let started = Instant::now();
        let images = try_join_all(Resolution::ALL.into_iter().map(|res| self.render_one(content, res))).await?;
        info!(
            kind = %content.kind(),
            title = %content.title(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "content rendered"
        );
        Ok(RenderSet { kind: content.kind(), images })
    }

    async fn render_one(&self, content: &Content, resolution: Resolution) -> Result<RenderedImage, RenderError> {
        let (width, height) = resolution.size();
        let plan = CompositionPlan::for_content(content, resolution);

        let requests = layer_requests(content, &plan);
        let layers = join_all(requests.iter().map(|req| async move {
            let (w, h) = req.rect.pixel_size();
            let asset = self.fetcher.fetch(&req.url, w, h, req.fit, &req.label).await;
            let (x, y) = req.rect.origin();
            Layer { image: asset.image, x, y }
        }));
        let (background, layers) = tokio::join!(self.background(content, width, height), layers);
        let (background, image_background) = background?;

        let markup = scene_markup(content, &plan, &self.config, image_background);
        let scene = Scene { background, underlay: markup.underlay, layers, overlay: markup.overlay };

        let compositor = self.compositor.clone();
        let quality = self.config.jpeg_quality;
        let bytes = tokio::task::spawn_blocking(move || compositor.compose(scene, quality)).await??;
        debug!(resolution = %resolution, bytes = bytes.len(), "resolution composed");

        Ok(RenderedImage { resolution, format: OutputFormat::Jpeg, bytes })
    }

    /// Full-canvas background and whether it came from a fetched image.
    ///
    /// A fetched background is laid over the generated gradient, so
    /// transparent regions show the gradient. A background URL that cannot be
    /// loaded leaves the gradient alone.
    async fn background(&self, content: &Content, width: u32, height: u32) -> Result<(RgbaImage, bool), RenderError> {
        let base = resolve_base(content.background_color(), content.kind());
        let svg = gradient_svg(width, height, base);
        let compositor = self.compositor.clone();
        let gradient = tokio::task::spawn_blocking(move || compositor.rasterize_svg(&svg, width, height));

        let url = content.background_url().map(str::trim).filter(|u| !u.is_empty());
        let fetched = async {
            match url {
                Some(url) => Some(self.fetcher.fetch(url, width, height, Fit::Cover, "").await),
                None => None,
            }
        };

        let (gradient, fetched) = tokio::join!(gradient, fetched);
        let mut canvas = gradient??;
        match fetched {
            Some(asset) if !asset.is_placeholder() => {
                imageops::overlay(&mut canvas, &asset.image, 0, 0);
                Ok((canvas, true))
            }
            Some(_) => {
                warn!(url = url.unwrap_or_default(), "background unavailable; using generated gradient");
                Ok((canvas, false))
            }
            None => Ok((canvas, false)),
        }
    }

    /// Render the HTML rendition of a schedule at every resolution.
    ///
    /// With a screenshotter each document is captured as JPEG; without one
    /// the raw document bytes are returned as [`OutputFormat::Html`]. A failed
    /// capture downgrades the whole set to documents so one response never
    /// mixes formats.
    pub async fn render_html(&self, schedule: &ScheduleContent) -> Result<RenderSet, RenderError> {
        let started = Instant::now();
        let images = match &self.screenshotter {
            Some(shooter) => {
                let captures = try_join_all(
                    Resolution::ALL.into_iter().map(|res| self.capture_one(shooter, schedule, res)),
                )
                .await;
                match captures {
                    Ok(images) => images,
                    Err(RenderError::Screenshot(reason)) => {
                        warn!(%reason, "screenshot capture failed; returning html documents");
                        self.documents(schedule)
                    }
                    Err(e) => return Err(e),
                }
            }
            None => self.documents(schedule),
        };
        info!(
            title = %schedule.title,
            format = images.first().map_or("none", |i| i.format.as_str()),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "schedule html rendered"
        );
        Ok(RenderSet { kind: ContentKind::FootballSchedule, images })
    }

    fn documents(&self, schedule: &ScheduleContent) -> Vec<RenderedImage> {
        Resolution::ALL
            .into_iter()
            .map(|resolution| RenderedImage {
                resolution,
                format: OutputFormat::Html,
                bytes: schedule_document(schedule, resolution, &self.config).into_bytes(),
            })
            .collect()
    }

    async fn capture_one(
        &self,
        shooter: &Arc<dyn Screenshotter>,
        schedule: &ScheduleContent,
        resolution: Resolution,
    ) -> Result<RenderedImage, RenderError> {
        let document = schedule_document(schedule, resolution, &self.config);
        let shooter = Arc::clone(shooter);
        let (width, height) = resolution.size();
        let quality = self.config.jpeg_quality;
        let bytes = tokio::task::spawn_blocking(move || shooter.capture(&document, width, height, quality)).await??;
        Ok(RenderedImage { resolution, format: OutputFormat::Jpeg, bytes })
    }
}

fn layer_requests(content: &Content, plan: &CompositionPlan) -> Vec<LayerRequest> {
    match (content, &plan.body) {
        (Content::Movie(movie), PlanBody::Movie(body)) => vec![
            LayerRequest::new(&movie.logo_url, body.logo, Fit::Contain, "LOGO"),
            LayerRequest::new(&movie.poster_url, body.poster, Fit::Cover, "POSTER"),
        ],
        (Content::FootballSchedule(schedule), PlanBody::Schedule(body)) => {
            let mut requests = vec![LayerRequest::new(&schedule.logo_url, body.logo, Fit::Contain, "LOGO")];
            for (game, row) in schedule.games.iter().zip(&body.rows) {
                requests.push(LayerRequest::new(&game.home_logo_url, row.home_logo, Fit::Contain, initials(&game.home_team)));
                requests.push(LayerRequest::new(&game.away_logo_url, row.away_logo, Fit::Contain, initials(&game.away_team)));
            }
            requests
        }
        _ => layer_requests(content, &CompositionPlan::for_content(content, plan.resolution)),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::color::PLACEHOLDER_FILL;
    use crate::fetch::{AssetOrigin, OfflineFetcher, RenderedAsset};
    use crate::sample;

    fn compositor() -> Compositor {
        Compositor::without_fonts()
    }

    fn renderer() -> Renderer {
        Renderer::new(RenderConfig::default(), Arc::new(OfflineFetcher::new(compositor())), compositor())
    }

    struct FakeShooter;

    impl Screenshotter for FakeShooter {
        fn capture(&self, html: &str, width: u32, height: u32, _quality: u8) -> Result<Vec<u8>, RenderError> {
            assert!(html.starts_with("<!DOCTYPE html>"));
            Ok(format!("{width}x{height}").into_bytes())
        }
    }

    struct FailingShooter;

    impl Screenshotter for FailingShooter {
        fn capture(&self, _html: &str, _width: u32, _height: u32, _quality: u8) -> Result<Vec<u8>, RenderError> {
            Err(RenderError::Screenshot("browser gone".into()))
        }
    }

    /// Serves a fully transparent image for every URL.
    struct TransparentFetcher;

    #[async_trait::async_trait]
    impl AssetFetcher for TransparentFetcher {
        async fn fetch(&self, _url: &str, width: u32, height: u32, _fit: Fit, _label: &str) -> RenderedAsset {
            RenderedAsset { image: RgbaImage::new(width, height), origin: AssetOrigin::Fetched }
        }
    }

    fn close(a: [u8; 3], b: [u8; 3]) -> bool {
        a.iter().zip(b).all(|(x, y)| x.abs_diff(y) <= 10)
    }

    #[tokio::test]
    async fn unavailable_assets_still_render_every_resolution() {
        let content = Content::Movie(sample::movie_example());
        let set = renderer().render(&content).await.expect("render");
        assert_eq!(set.kind, ContentKind::Movie);
        assert_eq!(set.format(), OutputFormat::Jpeg);
        assert_eq!(set.images.len(), 3);

        for res in Resolution::ALL {
            let image = set.get(res).expect("resolution present");
            let decoded = image::load_from_memory(&image.bytes).expect("decode").to_rgb8();
            assert_eq!(decoded.dimensions(), res.size(), "{res}");

            let plan = CompositionPlan::movie(res);
            let PlanBody::Movie(body) = &plan.body else { unreachable!() };
            let px = decoded
                .get_pixel(body.poster.center_x() as u32, (body.poster.y + body.poster.h * 0.2) as u32)
                .0;
            let fill = PLACEHOLDER_FILL;
            assert!(close(px, [fill.0, fill.1, fill.2]), "{res}: poster pixel {px:?}");
        }
    }

    #[tokio::test]
    async fn rendering_is_deterministic() {
        let content = Content::FootballSchedule(sample::schedule_example());
        let r = renderer();
        let a = r.render(&content).await.expect("first");
        let b = r.render(&content).await.expect("second");
        for (x, y) in a.images.iter().zip(&b.images) {
            assert_eq!(x.bytes, y.bytes, "{}", x.resolution);
        }
    }

    #[tokio::test]
    #[tracing_test::traced_test]
    async fn broken_background_falls_back_to_gradient() {
        let mut movie = sample::movie_example();
        movie.background_url = Some("https://example.invalid/bg.jpg".into());
        let content = Content::Movie(movie);
        let (image, fetched) = renderer().background(&content, 64, 36).await.expect("background");
        assert!(!fetched);
        assert_eq!(image.dimensions(), (64, 36));
        assert!(logs_contain("background unavailable"));
    }

    #[tokio::test]
    async fn transparent_background_keeps_gradient_underneath() {
        let r = Renderer::new(RenderConfig::default(), Arc::new(TransparentFetcher), compositor());
        let mut movie = sample::movie_example();
        movie.background_url = Some("https://example.com/bg.png".into());
        let (image, fetched) = r.background(&Content::Movie(movie), 64, 36).await.expect("background");
        assert!(fetched);
        for (x, y) in [(0, 0), (32, 18), (63, 35)] {
            let px = image.get_pixel(x, y).0;
            assert_eq!(px[3], 255, "({x}, {y}) is not opaque");
            assert_ne!(&px[..3], &[0, 0, 0], "({x}, {y}) lost the gradient");
        }
    }

    #[tokio::test]
    async fn html_without_screenshots_returns_documents() {
        let r = renderer();
        assert!(!r.screenshot_capability().is_available());
        let set = r.render_html(&sample::schedule_example()).await.expect("render html");
        assert_eq!(set.format(), OutputFormat::Html);
        for image in &set.images {
            let doc = String::from_utf8(image.bytes.clone()).expect("utf8");
            assert!(doc.starts_with("<!DOCTYPE html>"));
        }
    }

    #[tokio::test]
    async fn html_with_screenshots_returns_captures() {
        let r = renderer().with_screenshots(ScreenshotCapability::Available, Some(Arc::new(FakeShooter)));
        let set = r.render_html(&sample::schedule_example()).await.expect("render html");
        assert_eq!(set.format(), OutputFormat::Jpeg);
        assert_eq!(set.get(Resolution::Portrait).map(|i| i.bytes.as_slice()), Some(&b"1080x1920"[..]));
    }

    #[tokio::test]
    #[tracing_test::traced_test]
    async fn failed_capture_falls_back_to_documents() {
        let r = renderer().with_screenshots(ScreenshotCapability::Available, Some(Arc::new(FailingShooter)));
        let set = r.render_html(&sample::schedule_example()).await.expect("render html");
        assert_eq!(set.format(), OutputFormat::Html);
        assert_eq!(set.images.len(), 3);
        assert!(set.images.iter().all(|i| i.format == OutputFormat::Html));
        assert!(logs_contain("screenshot capture failed"));
    }

    #[test]
    fn available_without_screenshotter_is_downgraded() {
        let r = renderer().with_screenshots(ScreenshotCapability::Available, None);
        assert!(!r.screenshot_capability().is_available());
    }

    #[test]
    fn format_metadata() {
        assert_eq!(OutputFormat::Jpeg.extension(), "jpg");
        assert_eq!(OutputFormat::Html.extension(), "html");
        assert_eq!(OutputFormat::Jpeg.content_type(), "image/jpeg");
    }
}
