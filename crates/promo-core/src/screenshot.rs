//! Optional headless-browser capture of HTML documents.
//!
//! The capability is probed once at startup. When no browser can be
//! launched the HTML path stores the document itself instead of a JPEG.

use std::sync::Arc;

use tracing::{info, warn};

use crate::error::RenderError;

/// Turns an HTML document into JPEG bytes of exactly `width` x `height`.
///
/// Implementations block; callers run them on the blocking pool.
pub trait Screenshotter: Send + Sync {
    fn capture(&self, html: &str, width: u32, height: u32, quality: u8) -> Result<Vec<u8>, RenderError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScreenshotCapability {
    Available,
    Unavailable(String),
}

impl ScreenshotCapability {
    pub fn is_available(&self) -> bool {
        matches!(self, ScreenshotCapability::Available)
    }

    /// Why capture is unavailable, if it is.
    pub fn reason(&self) -> Option<&str> {
        match self {
            ScreenshotCapability::Available => None,
            ScreenshotCapability::Unavailable(reason) => Some(reason),
        }
    }
}

/// Detect whether screenshots can be taken in this process.
pub fn probe(enabled: bool) -> (ScreenshotCapability, Option<Arc<dyn Screenshotter>>) {
    if !enabled {
        info!("screenshot capture disabled by configuration");
        return (ScreenshotCapability::Unavailable("disabled by configuration".into()), None);
    }
    launch()
}

#[cfg(feature = "screenshot")]
fn launch() -> (ScreenshotCapability, Option<Arc<dyn Screenshotter>>) {
    match chrome::ChromeScreenshotter::launch() {
        Ok(shooter) => {
            info!("headless browser available for screenshots");
            (ScreenshotCapability::Available, Some(Arc::new(shooter)))
        }
        Err(e) => {
            warn!(error = %e, "headless browser unavailable; html output will be stored as html");
            (ScreenshotCapability::Unavailable(e.to_string()), None)
        }
    }
}

#[cfg(not(feature = "screenshot"))]
fn launch() -> (ScreenshotCapability, Option<Arc<dyn Screenshotter>>) {
    warn!("built without the screenshot feature; html output will be stored as html");
    (ScreenshotCapability::Unavailable("built without screenshot support".into()), None)
}

#[cfg(feature = "screenshot")]
mod chrome {
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use headless_chrome::protocol::cdp::Page;
    use headless_chrome::{Browser, LaunchOptions, Tab};
    use tracing::{debug, warn};

    use super::Screenshotter;
    use crate::error::RenderError;

    /// Largest canvas edge; the browser window is opened at this size.
    const WINDOW_EDGE: u32 = 1920;

    /// The browser lives for the whole process and may sit idle between
    /// requests for hours.
    const IDLE_TIMEOUT: Duration = Duration::from_secs(60 * 60 * 24 * 365);

    fn screenshot_error<E: std::fmt::Display>(step: &str) -> impl FnOnce(E) -> RenderError + '_ {
        move |e| RenderError::Screenshot(format!("{step}: {e}"))
    }

    fn start_browser() -> Result<Browser, RenderError> {
        let options = LaunchOptions::default_builder()
            .headless(true)
            .window_size(Some((WINDOW_EDGE, WINDOW_EDGE)))
            .idle_browser_timeout(IDLE_TIMEOUT)
            .build()
            .map_err(|e| RenderError::Screenshot(format!("launch options: {e}")))?;
        Browser::new(options).map_err(screenshot_error("launch"))
    }

    pub struct ChromeScreenshotter {
        browser: Mutex<Browser>,
    }

    impl ChromeScreenshotter {
        pub fn launch() -> Result<Self, RenderError> {
            Ok(Self { browser: Mutex::new(start_browser()?) })
        }

        /// Open a tab, relaunching the browser once if it has gone away.
        fn open_tab(&self) -> Result<Arc<Tab>, RenderError> {
            let mut browser = self
                .browser
                .lock()
                .map_err(|_| RenderError::Screenshot("browser lock poisoned".into()))?;
            match browser.new_tab() {
                Ok(tab) => Ok(tab),
                Err(e) => {
                    warn!(error = %e, "browser stopped responding; relaunching");
                    *browser = start_browser()?;
                    browser.new_tab().map_err(screenshot_error("new tab"))
                }
            }
        }
    }

    fn shoot(tab: &Tab, html: &str, width: u32, height: u32, quality: u8) -> Result<Vec<u8>, RenderError> {
        let url = format!("data:text/html;base64,{}", STANDARD.encode(html));
        tab.navigate_to(&url).map_err(screenshot_error("navigate"))?;
        tab.wait_until_navigated().map_err(screenshot_error("wait for navigation"))?;

        let clip = Page::Viewport {
            x: 0.0,
            y: 0.0,
            width: width as f64,
            height: height as f64,
            scale: 1.0,
        };
        tab.capture_screenshot(
            Page::CaptureScreenshotFormatOption::Jpeg,
            Some(u32::from(quality.clamp(1, 100))),
            Some(clip),
            true,
        )
        .map_err(screenshot_error("capture"))
    }

    impl Screenshotter for ChromeScreenshotter {
        fn capture(&self, html: &str, width: u32, height: u32, quality: u8) -> Result<Vec<u8>, RenderError> {
            let tab = self.open_tab()?;
            let shot = shoot(&tab, html, width, height, quality);
            if let Err(e) = tab.close(true) {
                warn!(error = %e, "failed to close screenshot tab");
            } else {
                debug!(width, height, "screenshot tab closed");
            }
            shot
        }
    }

}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    #[tracing_test::traced_test]
    fn disabled_probe_is_unavailable() {
        let (cap, shooter) = probe(false);
        assert!(!cap.is_available());
        assert_eq!(cap.reason(), Some("disabled by configuration"));
        assert!(shooter.is_none());
        assert!(logs_contain("screenshot capture disabled"));
    }

    #[test]
    fn capability_reason() {
        assert_eq!(ScreenshotCapability::Available.reason(), None);
        assert!(ScreenshotCapability::Available.is_available());
    }
}
