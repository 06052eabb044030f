//! Server configuration, loaded from environment variables at startup.

use std::path::PathBuf;
use std::time::Duration;

use promo_core::RenderConfig;

/// Runtime configuration for promo-server.
///
/// Every field has a sensible default so the server works out-of-the-box
/// without any environment variables set.
#[derive(Debug, Clone)]
pub struct Config {
    /// TCP address to bind (default: `"0.0.0.0:3000"`).
    pub bind_address: String,

    /// `tracing` filter string, e.g. `"info"` or `"debug,tower_http=warn"`.
    pub log_level: String,

    /// When `true`, emit log records as newline-delimited JSON.
    pub log_json: bool,

    /// Directory holding generated artifacts until they expire.
    pub uploads_dir: PathBuf,

    /// Base URL used for download links. Derived from request headers when unset.
    pub public_url: Option<String>,

    pub watermark_text: String,
    pub watermark_enabled: bool,

    /// How long movie banners stay downloadable.
    pub movie_retention: Duration,

    /// How long schedule cards (raster and HTML) stay downloadable.
    pub schedule_retention: Duration,

    /// Period of the background expiry sweep.
    pub sweep_interval: Duration,

    /// Upper bound for a whole request, including every asset download.
    pub request_timeout: Duration,

    /// Upper bound for a single asset download.
    pub fetch_timeout: Duration,

    pub jpeg_quality: u8,

    /// Largest accepted JSON body.
    pub body_limit_bytes: usize,

    /// Comma-separated list of allowed CORS origins; wildcard when unset.
    pub cors_allowed_origins: Option<String>,

    /// Serve Swagger UI at `/swagger-ui` (default `true`).
    pub enable_swagger: bool,

    /// Probe for a headless browser at startup (default `true`).
    pub screenshots: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_owned(),
            log_level: "info".to_owned(),
            log_json: false,
            uploads_dir: std::env::temp_dir().join("promo-uploads"),
            public_url: None,
            watermark_text: RenderConfig::default().watermark_text,
            watermark_enabled: true,
            movie_retention: Duration::from_secs(60 * 60),
            schedule_retention: Duration::from_secs(30 * 60),
            sweep_interval: Duration::from_secs(60),
            request_timeout: Duration::from_secs(120),
            fetch_timeout: Duration::from_secs(15),
            jpeg_quality: 90,
            body_limit_bytes: 1024 * 1024,
            cors_allowed_origins: None,
            enable_swagger: true,
            screenshots: true,
        }
    }
}

impl Config {
    /// Build [`Config`] from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            bind_address: env_or("PROMO_BIND", &d.bind_address),
            log_level: env_or("PROMO_LOG", &d.log_level),
            log_json: bool_env("PROMO_LOG_JSON", d.log_json),
            uploads_dir: std::env::var("PROMO_UPLOADS_DIR").map(PathBuf::from).unwrap_or(d.uploads_dir),
            public_url: non_empty_env("PROMO_PUBLIC_URL"),
            watermark_text: env_or("PROMO_WATERMARK", &d.watermark_text),
            watermark_enabled: bool_env("PROMO_WATERMARK_ENABLED", d.watermark_enabled),
            movie_retention: secs_env("PROMO_MOVIE_RETENTION_SECS", d.movie_retention),
            schedule_retention: secs_env("PROMO_SCHEDULE_RETENTION_SECS", d.schedule_retention),
            sweep_interval: secs_env("PROMO_SWEEP_INTERVAL_SECS", d.sweep_interval),
            request_timeout: secs_env("PROMO_REQUEST_TIMEOUT_SECS", d.request_timeout),
            fetch_timeout: secs_env("PROMO_FETCH_TIMEOUT_SECS", d.fetch_timeout),
            jpeg_quality: parse_env("PROMO_JPEG_QUALITY", d.jpeg_quality).clamp(1, 100),
            body_limit_bytes: parse_env("PROMO_BODY_LIMIT_BYTES", d.body_limit_bytes),
            cors_allowed_origins: non_empty_env("PROMO_CORS_ORIGINS"),
            enable_swagger: bool_env("PROMO_ENABLE_SWAGGER", d.enable_swagger),
            screenshots: bool_env("PROMO_SCREENSHOT", d.screenshots),
        }
    }

    /// The immutable subset handed to the renderer.
    pub fn render_config(&self) -> RenderConfig {
        RenderConfig {
            watermark_text: self.watermark_text.clone(),
            watermark_enabled: self.watermark_enabled,
            jpeg_quality: self.jpeg_quality,
            fetch_timeout: self.fetch_timeout,
        }
    }
}

/// `"60 minutes"`, `"45 seconds"`; used for the `expiresIn` response field.
pub fn human_duration(d: Duration) -> String {
    let secs = d.as_secs();
    match secs {
        1 => "1 second".to_owned(),
        s if s < 60 || s % 60 != 0 => format!("{s} seconds"),
        60 => "1 minute".to_owned(),
        s => format!("{} minutes", s / 60),
    }
}

// ── private helpers ──────────────────────────────────────────────────────────

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_owned())
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().map(|v| v.trim().to_owned()).filter(|v| !v.is_empty())
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn secs_env(key: &str, default: Duration) -> Duration {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .map(Duration::from_secs)
        .unwrap_or(default)
}

fn bool_env(key: &str, default: bool) -> bool {
    std::env::var(key)
        .map(|v| parse_bool(&v).unwrap_or(default))
        .unwrap_or(default)
}

fn parse_bool(v: &str) -> Option<bool> {
    match v.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
