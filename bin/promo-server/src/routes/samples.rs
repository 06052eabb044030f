//! Example payloads and one-click test renders.
//!
//! The `test-*` routes render randomised sample content so the service can be
//! exercised from a browser without crafting a request body.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::routing::get;
use axum::{Json, Router};
use promo_core::{Content, sample};
use utoipa::OpenApi;

use crate::error::{ErrorBody, ServerError};
use crate::routes::generate::deliver;
use crate::schemas::{DeliveryQuery, GenerateResponse, MovieRequest, ScheduleRequest};
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(paths(
    movie_example,
    football_example,
    test_generate_images,
    test_football_schedule,
    test_football_html
))]
pub struct SamplesApi;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/movie-example", get(movie_example))
        .route("/football-example", get(football_example))
        .route("/test-generate-images", get(test_generate_images).post(test_generate_images))
        .route("/test-football-schedule", get(test_football_schedule).post(test_football_schedule))
        .route("/test-football-html", get(test_football_html).post(test_football_html))
}

/// A valid body for `POST /generate-images`.
#[utoipa::path(
    get,
    path = "/movie-example",
    tag = "samples",
    responses((status = 200, description = "Example movie request", body = MovieRequest))
)]
pub async fn movie_example() -> Json<MovieRequest> {
    Json(sample::movie_example().into())
}

/// A valid body for the football endpoints.
#[utoipa::path(
    get,
    path = "/football-example",
    tag = "samples",
    responses((status = 200, description = "Example schedule request", body = ScheduleRequest))
)]
pub async fn football_example() -> Json<ScheduleRequest> {
    Json(sample::schedule_example().into())
}

#[utoipa::path(
    method(get, post),
    path = "/test-generate-images",
    tag = "samples",
    params(DeliveryQuery),
    responses(
        (status = 200, description = "Banners for a random movie", body = GenerateResponse),
        (status = 500, description = "Rendering failed", body = ErrorBody),
    )
)]
pub async fn test_generate_images(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DeliveryQuery>,
    headers: HeaderMap,
) -> Result<Json<GenerateResponse>, ServerError> {
    let set = state.renderer.render(&Content::Movie(sample::random_movie())).await?;
    deliver(&state, &headers, &set, query.delivery(), state.config.movie_retention, false).await
}

#[utoipa::path(
    method(get, post),
    path = "/test-football-schedule",
    tag = "samples",
    params(DeliveryQuery),
    responses(
        (status = 200, description = "Cards for a random schedule", body = GenerateResponse),
        (status = 500, description = "Rendering failed", body = ErrorBody),
    )
)]
pub async fn test_football_schedule(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DeliveryQuery>,
    headers: HeaderMap,
) -> Result<Json<GenerateResponse>, ServerError> {
    let set = state.renderer.render(&Content::FootballSchedule(sample::random_schedule())).await?;
    deliver(&state, &headers, &set, query.delivery(), state.config.schedule_retention, false).await
}

#[utoipa::path(
    method(get, post),
    path = "/test-football-html",
    tag = "samples",
    params(DeliveryQuery),
    responses(
        (status = 200, description = "HTML render of a random schedule", body = GenerateResponse),
        (status = 500, description = "Rendering failed", body = ErrorBody),
    )
)]
pub async fn test_football_html(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DeliveryQuery>,
    headers: HeaderMap,
) -> Result<Json<GenerateResponse>, ServerError> {
    let set = state.renderer.render_html(&sample::random_schedule()).await?;
    deliver(&state, &headers, &set, query.delivery(), state.config.schedule_retention, true).await
}
