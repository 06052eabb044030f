//! promo-server – entry point.
//!
//! Startup order:
//! 1. Parse configuration from environment variables.
//! 2. Initialise structured tracing (JSON in production, pretty in dev).
//! 3. Load fonts and probe for a headless browser.
//! 4. Open the artifact directory and start the expiry sweeper.
//! 5. Build the Axum router and start the HTTP server with graceful shutdown.

mod config;
mod error;
mod extract;
mod links;
mod middleware;
mod routes;
mod schemas;
mod state;
mod storage;

use std::net::SocketAddr;
use std::sync::Arc;

use promo_core::compose::Compositor;
use promo_core::{HttpFetcher, Renderer, screenshot};
use tracing::{info, warn};

use crate::config::Config;
use crate::state::AppState;
use crate::storage::ArtifactStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Configuration ───────────────────────────────────────────────────────
    let cfg = Config::from_env();

    // ── 2. Tracing ─────────────────────────────────────────────────────────────
    init_tracing(&cfg);

    info!(version = env!("CARGO_PKG_VERSION"), "promo-server starting");

    // ── 3. Render pipeline ─────────────────────────────────────────────────────
    let render_config = cfg.render_config();
    let compositor = tokio::task::spawn_blocking(Compositor::with_system_fonts).await?;
    if compositor.font_faces() == 0 {
        warn!("no system fonts found; text will not be drawn");
    } else {
        info!(faces = compositor.font_faces(), "fonts loaded");
    }

    let screenshots_enabled = cfg.screenshots;
    let (capability, shooter) =
        tokio::task::spawn_blocking(move || screenshot::probe(screenshots_enabled)).await?;

    let fetcher = Arc::new(HttpFetcher::new(&render_config, compositor.clone()));
    let renderer = Renderer::new(render_config, fetcher, compositor).with_screenshots(capability, shooter);
    info!(
        screenshots = renderer.screenshot_capability().is_available(),
        "renderer ready"
    );

    // ── 4. Artifact storage ────────────────────────────────────────────────────
    let artifacts = Arc::new(ArtifactStore::open(cfg.uploads_dir.clone()).await?);
    let _sweeper = artifacts.spawn_sweeper(cfg.sweep_interval);
    info!(dir = %artifacts.dir().display(), interval = ?cfg.sweep_interval, "expiry sweeper started");

    let state = Arc::new(AppState {
        config: Arc::new(cfg.clone()),
        renderer,
        artifacts,
    });

    // ── 5. HTTP server with graceful shutdown ──────────────────────────────────
    let app = routes::build(Arc::clone(&state));
    let addr: SocketAddr = cfg.bind_address.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "HTTP server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("promo-server stopped");
    Ok(())
}

/// `RUST_LOG` wins over `PROMO_LOG`; an unparsable filter falls back to `info`.
fn init_tracing(cfg: &Config) {
    use tracing_subscriber::EnvFilter;

    let (filter, rejected) = match EnvFilter::try_from_default_env() {
        Ok(filter) => (filter, None),
        Err(_) => match EnvFilter::try_new(&cfg.log_level) {
            Ok(filter) => (filter, None),
            Err(e) => (EnvFilter::new("info"), Some(e)),
        },
    };

    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);
    if cfg.log_json {
        builder.json().init();
    } else {
        builder.init();
    }

    if let Some(e) = rejected {
        warn!(filter = %cfg.log_level, error = %e, "invalid PROMO_LOG filter; using 'info'");
    }
}

/// Resolves on Ctrl-C or, on unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to install CTRL+C signal handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut s) => {
                s.recv().await;
            }
            Err(e) => warn!(error = %e, "failed to install SIGTERM handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    info!("shutting down; draining in-flight requests");
}
