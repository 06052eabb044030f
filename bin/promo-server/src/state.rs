//! Shared application state injected into every Axum handler.

use std::sync::Arc;

use promo_core::Renderer;

use crate::config::Config;
use crate::storage::ArtifactStore;

/// State shared across all HTTP handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Server configuration (env-derived).
    pub config: Arc<Config>,
    /// Render pipeline with its fetcher, compositor and screenshot capability.
    pub renderer: Renderer,
    /// Expiring store behind `/download/{filename}`.
    pub artifacts: Arc<ArtifactStore>,
}

#[cfg(test)]
pub mod testing {
    use std::path::Path;

    use promo_core::compose::Compositor;
    use promo_core::OfflineFetcher;

    use super::*;

    /// State with an offline fetcher and an empty font database, so tests
    /// never touch the network or depend on installed fonts.
    pub async fn state(dir: &Path, config: Config) -> Arc<AppState> {
        let compositor = Compositor::without_fonts();
        let renderer = Renderer::new(
            config.render_config(),
            Arc::new(OfflineFetcher::new(compositor.clone())),
            compositor,
        );
        let artifacts = ArtifactStore::open(dir).await.expect("open artifact store");
        Arc::new(AppState { config: Arc::new(config), renderer, artifacts: Arc::new(artifacts) })
    }
}
