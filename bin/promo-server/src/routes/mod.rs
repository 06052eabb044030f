//! Axum router construction.
//!
//! [`build`] assembles the complete application router, including:
//! - Middleware layers (CORS, request timeout, per-request trace-ID injection)
//! - Optional Swagger UI / OpenAPI document endpoint (disable with `PROMO_ENABLE_SWAGGER=false`)
//! - Generation, download and sample routes
//! - Health and capability routes

mod capabilities;
pub mod doc;
mod download;
mod generate;
mod health;
mod samples;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::{Router, middleware};
use tower::ServiceBuilder;
use tower_http::timeout::TimeoutLayer;
use utoipa_swagger_ui::SwaggerUi;

use crate::middleware::{cors, trace};
use crate::state::AppState;

// ── Router builder ────────────────────────────────────────────────────────────

/// Build the complete Axum [`Router`] for the application.
pub fn build(state: Arc<AppState>) -> Router {
    let api_router = Router::new()
        .merge(health::router())
        .merge(capabilities::router())
        .merge(generate::router())
        .merge(download::router())
        .merge(samples::router());

    let mut app = Router::new().merge(api_router);

    if state.config.enable_swagger {
        app = app.merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", doc::get_docs()));
    }

    app.layer(DefaultBodyLimit::max(state.config.body_limit_bytes))
        // Outermost layers execute first on the way in.
        .layer(
            ServiceBuilder::new()
                .layer(cors::cors_layer(&state.config))
                .layer(TimeoutLayer::new(state.config.request_timeout)),
        )
        .layer(middleware::from_fn_with_state(state.clone(), trace::trace_middleware))
        .with_state(state)
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod test {
    use std::time::Duration;

    use axum::body::{Body, Bytes};
    use axum::http::{HeaderMap, Method, Request, StatusCode, header};
    use base64::Engine as _;
    use base64::engine::general_purpose::STANDARD;
    use http_body_util::BodyExt;
    use promo_core::sample;
    use serde_json::{Value, json};
    use tempfile::TempDir;
    use tower::ServiceExt;

    use super::*;
    use crate::config::Config;
    use crate::schemas::{MovieRequest, ScheduleRequest};
    use crate::state::testing;

    struct TestApp {
        _dir: TempDir,
        state: Arc<AppState>,
        router: Router,
    }

    impl TestApp {
        async fn new(config: Config) -> Self {
            let dir = tempfile::tempdir().expect("tempdir");
            let state = testing::state(dir.path(), config).await;
            let router = build(state.clone());
            Self { _dir: dir, state, router }
        }

        async fn send(&self, req: Request<Body>) -> (StatusCode, HeaderMap, Bytes) {
            let resp = self.router.clone().oneshot(req).await.expect("oneshot");
            let status = resp.status();
            let headers = resp.headers().clone();
            let body = resp.into_body().collect().await.expect("body").to_bytes();
            (status, headers, body)
        }

        async fn get(&self, uri: &str) -> (StatusCode, HeaderMap, Bytes) {
            self.send(Request::builder().uri(uri).body(Body::empty()).expect("request")).await
        }

        async fn post_json(&self, uri: &str, body: &Value) -> (StatusCode, Value) {
            let req = Request::builder()
                .method(Method::POST)
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .expect("request");
            let (status, _, bytes) = self.send(req).await;
            (status, serde_json::from_slice(&bytes).expect("json body"))
        }

        async fn download(&self, link: &Value) -> (StatusCode, HeaderMap, Bytes) {
            let link = link.as_str().expect("link string");
            let name = link.rsplit('/').next().expect("file name");
            self.get(&format!("/download/{name}")).await
        }
    }

    fn movie() -> Value {
        serde_json::to_value(MovieRequest::from(sample::movie_example())).expect("json")
    }

    fn schedule() -> Value {
        serde_json::to_value(ScheduleRequest::from(sample::schedule_example())).expect("json")
    }

    fn decode(value: &Value) -> Vec<u8> {
        STANDARD.decode(value.as_str().expect("base64 string")).expect("base64")
    }

    #[tokio::test]
    async fn health_is_ok() {
        let app = TestApp::new(Config::default()).await;
        let (status, headers, body) = app.get("/health").await;
        assert_eq!(status, StatusCode::OK);
        assert!(headers.contains_key(trace::X_TRACE_ID));
        let body: Value = serde_json::from_slice(&body).expect("json");
        assert_eq!(body["status"], "ok");
        assert_eq!(body["storedArtifacts"], 0);
        assert!(!body["version"].as_str().unwrap_or("").is_empty());
    }

    #[tokio::test]
    async fn inline_images_have_every_resolution() {
        let app = TestApp::new(Config::default()).await;
        let (status, body) = app.post_json("/generate-images?base64", &movie()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert!(body.get("downloads").is_none());
        assert!(body.get("format").is_none());
        for (key, size) in [("landscape", (1920, 1080)), ("portrait", (1080, 1920)), ("square", (1080, 1080))] {
            let img = image::load_from_memory(&decode(&body["images"][key])).expect("jpeg");
            assert_eq!((img.width(), img.height()), size, "{key}");
        }
        assert_eq!(app.state.artifacts.len(), 0);
    }

    #[tokio::test]
    async fn download_matches_inline_bytes() {
        let app = TestApp::new(Config::default()).await;
        let (_, inline) = app.post_json("/generate-images?base64", &movie()).await;
        let (status, stored) = app.post_json("/generate-images?file", &movie()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(stored["expiresIn"], "60 minutes");
        assert!(stored.get("images").is_none());

        let link = stored["downloads"]["portrait"].as_str().expect("link");
        assert!(link.starts_with("http://localhost:3000/download/movie-portrait-"));
        assert!(link.ends_with(".jpg"));

        let (status, headers, bytes) = app.download(&stored["downloads"]["portrait"]).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers[header::CONTENT_TYPE], "image/jpeg");
        assert!(headers[header::CONTENT_DISPOSITION].to_str().expect("ascii").starts_with("attachment;"));
        assert_eq!(bytes.as_ref(), decode(&inline["images"]["portrait"]).as_slice());
    }

    #[tokio::test]
    async fn no_flag_means_download_and_both_flags_mean_both() {
        let app = TestApp::new(Config::default()).await;
        let (_, plain) = app.post_json("/generate-images", &movie()).await;
        assert!(plain.get("images").is_none());
        assert!(plain["downloads"]["square"].is_string());

        let (_, both) = app.post_json("/generate-images?base64&file", &movie()).await;
        assert!(both["images"]["square"].is_string());
        assert!(both["downloads"]["square"].is_string());
        assert_eq!(app.state.artifacts.len(), 6);
    }

    #[tokio::test]
    async fn download_links_honour_forwarded_host() {
        let app = TestApp::new(Config::default()).await;
        let req = Request::builder()
            .method(Method::POST)
            .uri("/generate-football-schedule")
            .header(header::CONTENT_TYPE, "application/json")
            .header("x-forwarded-proto", "https")
            .header("x-forwarded-host", "promo.example.com")
            .body(Body::from(schedule().to_string()))
            .expect("request");
        let (status, _, body) = app.send(req).await;
        assert_eq!(status, StatusCode::OK);
        let body: Value = serde_json::from_slice(&body).expect("json");
        let link = body["downloads"]["landscape"].as_str().expect("link");
        assert!(link.starts_with("https://promo.example.com/download/football_schedule-landscape-"));
        assert_eq!(body["expiresIn"], "30 minutes");
    }

    #[tokio::test]
    async fn too_many_games_is_rejected_before_rendering() {
        let app = TestApp::new(Config::default()).await;
        let mut body = schedule();
        let game = body["games"][0].clone();
        body["games"] = Value::Array(vec![game; 6]);
        let (status, resp) = app.post_json("/generate-football-schedule?file", &body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(resp["success"], false);
        let fields: Vec<&str> = resp["issues"]
            .as_array()
            .expect("issues")
            .iter()
            .filter_map(|i| i["field"].as_str())
            .collect();
        assert!(fields.contains(&"games"));
        assert_eq!(app.state.artifacts.len(), 0);
    }

    #[tokio::test]
    async fn invalid_fields_are_reported_with_paths() {
        let app = TestApp::new(Config::default()).await;
        let mut body = schedule();
        body["games"][1]["homeLogoUrl"] = json!("not a url");
        body["backgroundColor"] = json!("red");
        let (status, resp) = app.post_json("/generate-football-schedule", &body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let fields: Vec<&str> = resp["issues"]
            .as_array()
            .expect("issues")
            .iter()
            .filter_map(|i| i["field"].as_str())
            .collect();
        assert_eq!(fields, vec!["backgroundColor", "games[1].homeLogoUrl"]);
    }

    #[tokio::test]
    async fn malformed_json_is_a_bad_request() {
        let app = TestApp::new(Config::default()).await;
        let req = Request::builder()
            .method(Method::POST)
            .uri("/generate-images")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{\"title\": "))
            .expect("request");
        let (status, _, body) = app.send(req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let body: Value = serde_json::from_slice(&body).expect("json");
        assert_eq!(body["issues"][0]["field"], "body");
        assert_eq!(body["issues"][0]["code"], "invalid_json");
    }

    #[tokio::test]
    async fn missing_required_field_is_a_bad_request() {
        let app = TestApp::new(Config::default()).await;
        let mut body = movie();
        body.as_object_mut().expect("object").remove("posterUrl");
        let (status, resp) = app.post_json("/generate-images", &body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(resp["issues"][0]["code"], "invalid_shape");
    }

    #[tokio::test]
    async fn unknown_and_malicious_downloads_are_not_found() {
        let app = TestApp::new(Config::default()).await;
        let (status, _, body) = app.get("/download/movie-square-00000000-0000-0000-0000-000000000000.jpg").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let body: Value = serde_json::from_slice(&body).expect("json");
        assert_eq!(body["success"], false);

        let (status, _, _) = app.get("/download/..%2F..%2Fetc%2Fpasswd").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn expired_downloads_are_gone() {
        let config = Config { movie_retention: Duration::ZERO, ..Config::default() };
        let app = TestApp::new(config).await;
        let (status, body) = app.post_json("/generate-images?file", &movie()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["expiresIn"], "0 seconds");
        let (status, _, _) = app.download(&body["downloads"]["landscape"]).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn html_endpoint_falls_back_to_documents() {
        let app = TestApp::new(Config::default()).await;
        let (status, body) = app.post_json("/generate-football-html?base64&file", &schedule()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["format"], "html");

        let html = String::from_utf8(decode(&body["images"]["square"])).expect("utf8");
        assert!(html.contains("width:1080px;height:1080px"));

        let link = body["downloads"]["square"].as_str().expect("link");
        assert!(link.ends_with(".html"));
        let (status, headers, bytes) = app.download(&body["downloads"]["square"]).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers[header::CONTENT_TYPE], "text/html; charset=utf-8");
        assert_eq!(bytes.as_ref(), html.as_bytes());
    }

    #[tokio::test]
    async fn examples_round_trip_through_generation() {
        let app = TestApp::new(Config::default()).await;
        let (status, _, body) = app.get("/football-example").await;
        assert_eq!(status, StatusCode::OK);
        let example: Value = serde_json::from_slice(&body).expect("json");
        let (status, resp) = app.post_json("/generate-football-schedule?base64", &example).await;
        assert_eq!(status, StatusCode::OK);
        assert!(resp["images"]["portrait"].is_string());

        let (status, _, body) = app.get("/movie-example").await;
        assert_eq!(status, StatusCode::OK);
        let example: Value = serde_json::from_slice(&body).expect("json");
        assert!(example["posterUrl"].is_string());
    }

    #[tokio::test]
    async fn test_routes_accept_get_and_post() {
        let app = TestApp::new(Config::default()).await;
        let (status, _, body) = app.get("/test-football-schedule?base64").await;
        assert_eq!(status, StatusCode::OK);
        let body: Value = serde_json::from_slice(&body).expect("json");
        assert!(body["images"]["landscape"].is_string());

        let (status, body) = app.post_json("/test-football-html?file", &json!({})).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["format"], "html");
    }

    #[tokio::test]
    async fn capabilities_report_missing_browser() {
        let app = TestApp::new(Config::default()).await;
        let (status, _, body) = app.get("/capabilities").await;
        assert_eq!(status, StatusCode::OK);
        let body: Value = serde_json::from_slice(&body).expect("json");
        assert_eq!(body["screenshots"], false);
        assert!(body["screenshotUnavailableReason"].is_string());
        assert_eq!(body["maxGames"], 5);
        assert_eq!(body["resolutions"].as_array().map(Vec::len), Some(3));
    }

    #[tokio::test]
    async fn openapi_document_lists_routes() {
        let app = TestApp::new(Config::default()).await;
        let (status, _, body) = app.get("/api-docs/openapi.json").await;
        assert_eq!(status, StatusCode::OK);
        let doc: Value = serde_json::from_slice(&body).expect("json");
        for path in ["/generate-images", "/generate-football-html", "/download/{filename}", "/health"] {
            assert!(doc["paths"].get(path).is_some(), "{path}");
        }
    }

    #[tokio::test]
    async fn swagger_can_be_disabled() {
        let app = TestApp::new(Config { enable_swagger: false, ..Config::default() }).await;
        let (status, _, _) = app.get("/api-docs/openapi.json").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn oversized_bodies_are_rejected() {
        let app = TestApp::new(Config { body_limit_bytes: 64, ..Config::default() }).await;
        let (status, body) = app.post_json("/generate-images", &movie()).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(body["success"], false);
    }
}
