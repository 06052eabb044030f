//! What this instance can produce.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use promo_core::Resolution;
use promo_core::content::MAX_GAMES;
use serde::Serialize;
use utoipa::{OpenApi, ToSchema};

use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(paths(get_capabilities), components(schemas(Capabilities, ResolutionInfo)))]
pub struct CapabilitiesApi;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/capabilities", get(get_capabilities))
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ResolutionInfo {
    pub name: String,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Capabilities {
    /// Whether the HTML endpoint returns JPEG screenshots (`true`) or raw
    /// HTML documents (`false`).
    pub screenshots: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub screenshot_unavailable_reason: Option<String>,
    pub resolutions: Vec<ResolutionInfo>,
    pub max_games: usize,
    pub watermark: bool,
}

#[utoipa::path(
    get,
    path = "/capabilities",
    tag = "health",
    responses((status = 200, description = "Renderer capabilities", body = Capabilities))
)]
pub async fn get_capabilities(State(state): State<Arc<AppState>>) -> Json<Capabilities> {
    let capability = state.renderer.screenshot_capability();
    Json(Capabilities {
        screenshots: capability.is_available(),
        screenshot_unavailable_reason: capability.reason().map(str::to_owned),
        resolutions: Resolution::ALL
            .into_iter()
            .map(|r| {
                let (width, height) = r.size();
                ResolutionInfo { name: r.as_str().to_owned(), width, height }
            })
            .collect(),
        max_games: MAX_GAMES,
        watermark: state.renderer.config().watermark().is_some(),
    })
}
