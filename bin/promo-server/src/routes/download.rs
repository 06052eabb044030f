//! Stored artifact downloads.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use tracing::debug;
use utoipa::OpenApi;

use crate::error::{ErrorBody, ServerError};
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(paths(download))]
pub struct DownloadApi;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/download/{filename}", get(download))
}

/// Fetch a generated file (`GET /download/{filename}`).
///
/// Unknown, expired and malformed names all answer 404.
#[utoipa::path(
    get,
    path = "/download/{filename}",
    tag = "download",
    params(("filename" = String, Path, description = "Name from a `downloads` link")),
    responses(
        (status = 200, description = "JPEG or HTML attachment", body = [u8], content_type = "application/octet-stream"),
        (status = 404, description = "Unknown or expired file", body = ErrorBody),
    )
)]
pub async fn download(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
) -> Result<Response, ServerError> {
    let artifact = state.artifacts.retrieve(&filename).await?;
    debug!(name = %artifact.name, bytes = artifact.bytes.len(), "serving artifact");
    let disposition = format!("attachment; filename=\"{}\"", artifact.name);
    Ok((
        [
            (header::CONTENT_TYPE, artifact.content_type.to_owned()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        artifact.bytes,
    )
        .into_response())
}
