//! Per-request trace ID and access logging.

use std::sync::Arc;
use std::time::Instant;

use axum::Json;
use axum::body::{Body, Bytes};
use axum::extract::{Request, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tracing::{Instrument, info, info_span, warn};
use uuid::Uuid;

use crate::error::ErrorBody;
use crate::state::AppState;

pub static X_TRACE_ID: &str = "x-trace-id";

/// JSON request bodies up to this size are logged verbatim.
const LOGGED_BODY_LIMIT: usize = 1024;

pub async fn trace_middleware(State(state): State<Arc<AppState>>, req: Request<Body>, next: Next) -> Response {
    let start_time = Instant::now();

    // Reuse a well-formed incoming trace ID, otherwise mint one.
    let trace_id = req
        .headers()
        .get(X_TRACE_ID)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| Uuid::parse_str(s).ok())
        .unwrap_or_else(Uuid::new_v4);

    let span = info_span!(
        "http_request",
        trace_id = %trace_id,
        method = %req.method(),
        path = %req.uri().path(),
    );

    async move {
        info!("→ request started");
        let header_value = HeaderValue::from_str(&trace_id.to_string()).ok();

        let (parts, body) = req.into_parts();
        let mut response = match buffer_and_log(&parts.headers, body, state.config.body_limit_bytes).await {
            Some(bytes) => {
                let mut req = Request::from_parts(parts, Body::from(bytes));
                if let Some(v) = &header_value {
                    req.headers_mut().insert(X_TRACE_ID, v.clone());
                }
                next.run(req).await
            }
            None => (
                StatusCode::PAYLOAD_TOO_LARGE,
                Json(ErrorBody {
                    success: false,
                    message: "request body too large or unreadable".to_owned(),
                    issues: None,
                }),
            )
                .into_response(),
        };

        if let Some(v) = header_value {
            response.headers_mut().insert(X_TRACE_ID, v);
        }

        info!(
            status = response.status().as_u16(),
            latency_ms = start_time.elapsed().as_millis() as u64,
            "← response finished"
        );
        response
    }
    .instrument(span)
    .await
}

/// Buffer the request body up to `limit` bytes, logging it when it is small
/// JSON. Returns `None` when the body is too large or cannot be read.
async fn buffer_and_log(headers: &HeaderMap, body: Body, limit: usize) -> Option<Bytes> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    let bytes = match axum::body::to_bytes(body, limit).await {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!(error = %e, limit, "rejecting request body");
            return None;
        }
    };

    if content_type.contains("application/json") && bytes.len() <= LOGGED_BODY_LIMIT {
        if let Ok(text) = std::str::from_utf8(&bytes) {
            info!(body = %text, "request body");
        }
    } else if !bytes.is_empty() {
        info!(content_type, size = bytes.len(), "request body [skipped]");
    }
    Some(bytes)
}
