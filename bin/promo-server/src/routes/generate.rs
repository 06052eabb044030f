//! Generation routes.
//!
//! Every endpoint renders all three resolutions in one pass, then hands the
//! [`RenderSet`] to [`deliver`], which encodes it inline, stores it for
//! download, or both.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::routing::post;
use axum::{Json, Router};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use promo_core::{Content, RenderSet, Resolution, ScheduleContent};
use tracing::{debug, info};
use utoipa::OpenApi;
use validator::Validate;

use crate::config::human_duration;
use crate::error::{ErrorBody, ServerError, ValidationIssue};
use crate::extract::ValidatedJson;
use crate::links::{download_url, public_base_url};
use crate::schemas::{
    ContactRequest, Delivery, DeliveryQuery, DownloadSet, GameRequest, GenerateResponse, ImageSet, MovieRequest,
    ScheduleRequest,
};
use crate::state::AppState;
use crate::storage::artifact_name;

#[derive(OpenApi)]
#[openapi(
    paths(generate_images, generate_football_schedule, generate_football_html),
    components(schemas(
        MovieRequest,
        ScheduleRequest,
        GameRequest,
        ContactRequest,
        GenerateResponse,
        ImageSet,
        DownloadSet,
        ErrorBody,
        ValidationIssue
    ))
)]
pub struct GenerateApi;

/// Register generation routes.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/generate-images", post(generate_images))
        .route("/generate-football-schedule", post(generate_football_schedule))
        .route("/generate-football-html", post(generate_football_html))
}

/// Movie promo (`POST /generate-images`).
#[utoipa::path(
    post,
    path = "/generate-images",
    tag = "generate",
    params(DeliveryQuery),
    request_body = MovieRequest,
    responses(
        (status = 200, description = "Rendered banners", body = GenerateResponse),
        (status = 400, description = "Invalid request", body = ErrorBody),
        (status = 500, description = "Rendering failed", body = ErrorBody),
    )
)]
pub async fn generate_images(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DeliveryQuery>,
    headers: HeaderMap,
    ValidatedJson(req): ValidatedJson<MovieRequest>,
) -> Result<Json<GenerateResponse>, ServerError> {
    debug!(title = %req.title, "movie promo request");
    let set = state.renderer.render(&Content::Movie(req.into())).await?;
    deliver(&state, &headers, &set, query.delivery(), state.config.movie_retention, false).await
}

/// Football schedule card (`POST /generate-football-schedule`).
#[utoipa::path(
    post,
    path = "/generate-football-schedule",
    tag = "generate",
    params(DeliveryQuery),
    request_body = ScheduleRequest,
    responses(
        (status = 200, description = "Rendered schedule cards", body = GenerateResponse),
        (status = 400, description = "Invalid request", body = ErrorBody),
        (status = 500, description = "Rendering failed", body = ErrorBody),
    )
)]
pub async fn generate_football_schedule(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DeliveryQuery>,
    headers: HeaderMap,
    ValidatedJson(req): ValidatedJson<ScheduleRequest>,
) -> Result<Json<GenerateResponse>, ServerError> {
    debug!(title = %req.title, games = req.games.len(), "schedule request");
    let set = state.renderer.render(&Content::FootballSchedule(req.into())).await?;
    deliver(&state, &headers, &set, query.delivery(), state.config.schedule_retention, false).await
}

/// Football schedule via HTML (`POST /generate-football-html`).
///
/// Returns JPEG screenshots when a headless browser is available and the raw
/// HTML documents otherwise; `format` in the response says which.
#[utoipa::path(
    post,
    path = "/generate-football-html",
    tag = "generate",
    params(DeliveryQuery),
    request_body = ScheduleRequest,
    responses(
        (status = 200, description = "Screenshots or HTML documents", body = GenerateResponse),
        (status = 400, description = "Invalid request", body = ErrorBody),
        (status = 500, description = "Rendering failed", body = ErrorBody),
    )
)]
pub async fn generate_football_html(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DeliveryQuery>,
    headers: HeaderMap,
    ValidatedJson(req): ValidatedJson<ScheduleRequest>,
) -> Result<Json<GenerateResponse>, ServerError> {
    debug!(title = %req.title, games = req.games.len(), "schedule html request");
    let schedule = ScheduleContent::from(req);
    let set = state.renderer.render_html(&schedule).await?;
    deliver(&state, &headers, &set, query.delivery(), state.config.schedule_retention, true).await
}

// ── Delivery ──────────────────────────────────────────────────────────────────

fn image_bytes(set: &RenderSet, resolution: Resolution) -> Result<&[u8], ServerError> {
    set.get(resolution)
        .map(|i| i.bytes.as_slice())
        .ok_or_else(|| ServerError::Internal(format!("render set is missing {resolution}")))
}

async fn store(
    state: &AppState,
    base: &str,
    set: &RenderSet,
    resolution: Resolution,
    ttl: Duration,
) -> Result<String, ServerError> {
    let format = set.format();
    let name = artifact_name(set.kind, resolution, format.extension());
    state.artifacts.save(&name, image_bytes(set, resolution)?, format.content_type(), ttl).await?;
    Ok(download_url(base, &name))
}

/// Turn a finished render into the response body.
///
/// `report_format` adds the `format` field used by the HTML endpoints.
pub(crate) async fn deliver(
    state: &AppState,
    headers: &HeaderMap,
    set: &RenderSet,
    delivery: Delivery,
    ttl: Duration,
    report_format: bool,
) -> Result<Json<GenerateResponse>, ServerError> {
    let images = if delivery.inline {
        let encode = |res| image_bytes(set, res).map(|b| STANDARD.encode(b));
        Some(ImageSet {
            landscape: encode(Resolution::Landscape)?,
            portrait: encode(Resolution::Portrait)?,
            square: encode(Resolution::Square)?,
        })
    } else {
        None
    };

    let downloads = if delivery.download {
        let base = public_base_url(headers, &state.config);
        Some(DownloadSet {
            landscape: store(state, &base, set, Resolution::Landscape, ttl).await?,
            portrait: store(state, &base, set, Resolution::Portrait, ttl).await?,
            square: store(state, &base, set, Resolution::Square, ttl).await?,
        })
    } else {
        None
    };

    let response = GenerateResponse {
        success: true,
        format: report_format.then(|| set.format().as_str().to_owned()),
        images,
        expires_in: downloads.as_ref().map(|_| human_duration(ttl)),
        downloads,
    };
    response.validate().map_err(|e| ServerError::Serialization(e.to_string()))?;

    info!(
        kind = %set.kind,
        format = set.format().as_str(),
        inline = delivery.inline,
        download = delivery.download,
        "generation done"
    );
    Ok(Json(response))
}
