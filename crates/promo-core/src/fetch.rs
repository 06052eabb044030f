//! Remote asset fetching with placeholder fallback.
//!
//! [`AssetFetcher::fetch`] never fails: network errors, non-2xx responses
//! and undecodable bodies all resolve to a placeholder of the requested size.
//! There is exactly one attempt per asset.

use async_trait::async_trait;
use image::imageops::FilterType;
use image::{RgbaImage, imageops};
use reqwest::Client;
use tracing::{debug, warn};

use crate::color::PLACEHOLDER_FILL;
use crate::compose::{Compositor, solid};
use crate::content::RenderConfig;
use crate::placeholder::placeholder;

/// How a fetched image is fitted into its target rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fit {
    /// Scale to cover the whole rectangle, cropping the overflow.
    Cover,
    /// Scale to fit inside the rectangle, padding with transparency.
    Contain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetOrigin {
    Fetched,
    Placeholder,
}

/// A decoded image, sized exactly as requested.
#[derive(Debug, Clone)]
pub struct RenderedAsset {
    pub image: RgbaImage,
    pub origin: AssetOrigin,
}

impl RenderedAsset {
    pub fn is_placeholder(&self) -> bool {
        self.origin == AssetOrigin::Placeholder
    }
}

#[async_trait]
pub trait AssetFetcher: Send + Sync {
    /// Download `url` and fit it into `width` x `height`.
    ///
    /// `label` is printed on the placeholder if the asset is unavailable.
    async fn fetch(&self, url: &str, width: u32, height: u32, fit: Fit, label: &str) -> RenderedAsset;
}

/// `reqwest`-backed fetcher used in production.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    compositor: Compositor,
}

impl HttpFetcher {
    pub fn new(config: &RenderConfig, compositor: Compositor) -> Self {
        let client = Client::builder()
            .user_agent(concat!("promo-core/", env!("CARGO_PKG_VERSION")))
            .timeout(config.fetch_timeout)
            .build()
            .unwrap_or_default();
        Self { client, compositor }
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>, reqwest::Error> {
        let bytes = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl AssetFetcher for HttpFetcher {
    async fn fetch(&self, url: &str, width: u32, height: u32, fit: Fit, label: &str) -> RenderedAsset {
        let (width, height) = (width.max(1), height.max(1));

        let bytes = match self.download(url).await {
            Ok(b) => b,
            Err(e) => {
                warn!(url = %url, error = %e, "asset download failed; using placeholder");
                return placeholder_asset(&self.compositor, width, height, label).await;
            }
        };

        let decoded = tokio::task::spawn_blocking(move || prepare(&bytes, width, height, fit)).await;
        match decoded {
            Ok(Ok(image)) => {
                debug!(url = %url, width, height, "asset fetched");
                RenderedAsset { image, origin: AssetOrigin::Fetched }
            }
            Ok(Err(e)) => {
                warn!(url = %url, error = %e, "asset decode failed; using placeholder");
                placeholder_asset(&self.compositor, width, height, label).await
            }
            Err(e) => {
                warn!(url = %url, error = %e, "asset decode task failed; using placeholder");
                placeholder_asset(&self.compositor, width, height, label).await
            }
        }
    }
}

/// Never touches the network; every asset resolves to its placeholder.
#[derive(Debug, Clone)]
pub struct OfflineFetcher {
    compositor: Compositor,
}

impl OfflineFetcher {
    pub fn new(compositor: Compositor) -> Self {
        Self { compositor }
    }
}

#[async_trait]
impl AssetFetcher for OfflineFetcher {
    async fn fetch(&self, url: &str, width: u32, height: u32, _fit: Fit, label: &str) -> RenderedAsset {
        debug!(url = %url, "offline fetcher; using placeholder");
        placeholder_asset(&self.compositor, width.max(1), height.max(1), label).await
    }
}

async fn placeholder_asset(compositor: &Compositor, width: u32, height: u32, label: &str) -> RenderedAsset {
    let compositor = compositor.clone();
    let label = label.to_owned();
    let image = tokio::task::spawn_blocking(move || placeholder(&compositor, width, height, &label))
        .await
        .unwrap_or_else(|e| {
            warn!(error = %e, "placeholder task failed; using flat fill");
            solid(width, height, PLACEHOLDER_FILL.to_rgba(255))
        });
    RenderedAsset { image, origin: AssetOrigin::Placeholder }
}

/// Decode and fit encoded image bytes.
pub fn prepare(bytes: &[u8], width: u32, height: u32, fit: Fit) -> Result<RgbaImage, image::ImageError> {
    let img = image::load_from_memory(bytes)?;
    Ok(match fit {
        Fit::Cover => img.resize_to_fill(width, height, FilterType::Lanczos3).to_rgba8(),
        Fit::Contain => {
            let fitted = img.resize(width, height, FilterType::Lanczos3).to_rgba8();
            let mut canvas = RgbaImage::new(width, height);
            let x = (width - fitted.width().min(width)) / 2;
            let y = (height - fitted.height().min(height)) / 2;
            imageops::overlay(&mut canvas, &fitted, x as i64, y as i64);
            canvas
        }
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use axum::Router;
    use axum::http::StatusCode;
    use axum::routing::get;
    use image::Rgba;
    use std::io::Cursor;

    fn png(w: u32, h: u32, color: Rgba<u8>) -> Vec<u8> {
        let mut out = Vec::new();
        solid(w, h, color)
            .write_to(&mut Cursor::new(&mut out), image::ImageFormat::Png)
            .expect("encode png");
        out
    }

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("addr");
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        format!("http://{addr}")
    }

    async fn asset_server() -> String {
        let wide = png(200, 100, Rgba([255, 0, 0, 255]));
        let app = Router::new()
            .route("/wide.png", get(move || {
                let body = wide.clone();
                async move { body }
            }))
            .route("/garbage", get(|| async { "definitely not an image" }))
            .route("/missing", get(|| async { (StatusCode::NOT_FOUND, "gone") }));
        serve(app).await
    }

    fn fetcher() -> HttpFetcher {
        HttpFetcher::new(
            &RenderConfig::default(),
            Compositor::without_fonts(),
        )
    }

    #[tokio::test]
    async fn fetches_and_resizes() {
        let base = asset_server().await;
        let asset = fetcher()
            .fetch(&format!("{base}/wide.png"), 80, 60, Fit::Cover, "x")
            .await;
        assert_eq!(asset.origin, AssetOrigin::Fetched);
        assert_eq!(asset.image.dimensions(), (80, 60));
        let px = asset.image.get_pixel(40, 30).0;
        assert!(px[0] > 240 && px[1] < 15 && px[2] < 15, "unexpected pixel {px:?}");
    }

    #[tokio::test]
    async fn contain_pads_with_transparency() {
        let base = asset_server().await;
        let asset = fetcher()
            .fetch(&format!("{base}/wide.png"), 100, 100, Fit::Contain, "x")
            .await;
        assert_eq!(asset.origin, AssetOrigin::Fetched);
        assert_eq!(asset.image.dimensions(), (100, 100));
        assert_eq!(asset.image.get_pixel(50, 2).0[3], 0);
        assert_eq!(asset.image.get_pixel(50, 50).0[3], 255);
    }

    #[tokio::test]
    async fn undecodable_body_falls_back() {
        let base = asset_server().await;
        let asset = fetcher()
            .fetch(&format!("{base}/garbage"), 120, 90, Fit::Contain, "LOGO")
            .await;
        assert!(asset.is_placeholder());
        assert_eq!(asset.image.dimensions(), (120, 90));
    }

    #[tokio::test]
    async fn non_success_status_falls_back() {
        let base = asset_server().await;
        let asset = fetcher()
            .fetch(&format!("{base}/missing"), 64, 64, Fit::Cover, "LOGO")
            .await;
        assert!(asset.is_placeholder());
        assert_eq!(asset.image.dimensions(), (64, 64));
    }

    #[tokio::test]
    #[tracing_test::traced_test]
    async fn unreachable_host_falls_back_and_logs() {
        let asset = fetcher()
            .fetch("http://127.0.0.1:1/poster.jpg", 30, 45, Fit::Cover, "POSTER")
            .await;
        assert!(asset.is_placeholder());
        assert_eq!(asset.image.dimensions(), (30, 45));
        assert!(logs_contain("asset download failed"));
    }

    #[tokio::test]
    async fn malformed_url_falls_back() {
        let asset = fetcher().fetch("not a url", 10, 10, Fit::Cover, "x").await;
        assert!(asset.is_placeholder());
    }

    #[tokio::test]
    async fn offline_fetcher_always_placeholders() {
        let f = OfflineFetcher::new(Compositor::without_fonts());
        let asset = f.fetch("https://example.com/a.png", 20, 10, Fit::Cover, "x").await;
        assert!(asset.is_placeholder());
        assert_eq!(asset.image.dimensions(), (20, 10));
    }
}
