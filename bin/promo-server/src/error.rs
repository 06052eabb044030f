//! Unified server error type.
//!
//! Every handler returns `Result<T, ServerError>`, which implements
//! [`axum::response::IntoResponse`] so errors are automatically converted
//! to a JSON body of the form `{"success": false, "message": ...}`.
//!
//! Internal errors (render, storage I/O, serialization) are logged with full
//! detail; callers only get a generic message.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use promo_core::RenderError;
use serde::Serialize;
use thiserror::Error;
use tracing::error;
use utoipa::ToSchema;
use validator::{ValidationErrors, ValidationErrorsKind};

use crate::storage::StorageError;

/// One field-level problem in a rejected request.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ValidationIssue {
    /// Dotted path to the offending field as spelled on the wire, e.g.
    /// `games[1].homeLogoUrl` or `contact.phone`.
    pub field: String,
    pub code: String,
    pub message: String,
}

/// Body of every error response.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issues: Option<Vec<ValidationIssue>>,
}

/// All errors that can occur in the promo-server request lifecycle.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The request body or query failed validation.
    #[error("validation failed ({} issues)", .0.len())]
    Validation(Vec<ValidationIssue>),

    /// The caller referenced a resource that does not exist (or has expired).
    #[error("not found: {0}")]
    NotFound(String),

    /// Rasterisation, encoding or screenshot capture failed.
    #[error("render error: {0}")]
    Render(#[from] RenderError),

    /// A response did not match its declared schema.
    #[error("response serialization error: {0}")]
    Serialization(String),

    /// An unclassified internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, message, issues) = match self {
            // Client-facing errors: expose the message directly.
            ServerError::Validation(issues) => {
                (StatusCode::BAD_REQUEST, "request validation failed".to_owned(), Some(issues))
            }
            ServerError::NotFound(m) => (StatusCode::NOT_FOUND, m, None),

            // Internal errors: log the full detail, return a generic message.
            ServerError::Render(e) => {
                error!(error = %e, "render failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "failed to generate images".to_owned(), None)
            }
            ServerError::Serialization(m) => {
                error!(message = %m, "response failed schema validation");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "response serialization failed".to_owned(),
                    None,
                )
            }
            ServerError::Internal(m) => {
                error!(message = %m, "internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error".to_owned(), None)
            }
        };
        (status, Json(ErrorBody { success: false, message, issues })).into_response()
    }
}

impl From<StorageError> for ServerError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::NotFound(name) => ServerError::NotFound(format!("file not found or expired: {name}")),
            StorageError::Io(e) => ServerError::Internal(format!("artifact storage: {e}")),
        }
    }
}

impl From<ValidationErrors> for ServerError {
    fn from(errors: ValidationErrors) -> Self {
        let mut issues = Vec::new();
        flatten(&errors, "", &mut issues);
        issues.sort_by(|a, b| a.field.cmp(&b.field));
        ServerError::Validation(issues)
    }
}

fn flatten(errors: &ValidationErrors, prefix: &str, out: &mut Vec<ValidationIssue>) {
    for (field, kind) in errors.errors() {
        let field = camel_case(field);
        let path = if prefix.is_empty() { field } else { format!("{prefix}.{field}") };
        match kind {
            ValidationErrorsKind::Field(list) => out.extend(list.iter().map(|e| ValidationIssue {
                field: path.clone(),
                code: e.code.to_string(),
                message: e.message.as_ref().map_or_else(|| default_message(&e.code), |m| m.to_string()),
            })),
            ValidationErrorsKind::Struct(inner) => flatten(inner, &path, out),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    flatten(inner, &format!("{path}[{index}]"), out);
                }
            }
        }
    }
}

/// Request bodies are camelCase on the wire while validator reports Rust field names.
fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        match c {
            '_' if !out.is_empty() => upper = true,
            c if upper => {
                out.extend(c.to_uppercase());
                upper = false;
            }
            c => out.push(c),
        }
    }
    out
}

fn default_message(code: &str) -> String {
    match code {
        "url" => "must be a valid URL".to_owned(),
        "length" => "has an invalid length".to_owned(),
        "range" => "is out of range".to_owned(),
        "hex_color" => "must be a #rgb or #rrggbb colour".to_owned(),
        other => format!("failed `{other}` check"),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use http_body_util::BodyExt;
    use validator::Validate;

    #[derive(Validate)]
    struct Inner {
        #[validate(url)]
        link: String,
    }

    #[derive(Validate)]
    struct Outer {
        #[validate(length(min = 1))]
        name: String,
        #[validate(nested)]
        items: Vec<Inner>,
    }

    #[derive(Validate)]
    struct Game {
        #[validate(url)]
        home_logo_url: String,
    }

    #[derive(Validate)]
    struct Schedule {
        #[validate(nested)]
        game_list: Vec<Game>,
    }

    async fn body_json(resp: Response) -> serde_json::Value {
        let bytes = resp.into_body().collect().await.expect("body").to_bytes();
        serde_json::from_slice(&bytes).expect("json")
    }

    #[test]
    fn nested_errors_are_flattened_with_paths() {
        let outer = Outer {
            name: String::new(),
            items: vec![Inner { link: "https://ok.example".into() }, Inner { link: "nope".into() }],
        };
        let ServerError::Validation(issues) = ServerError::from(outer.validate().unwrap_err()) else {
            panic!("validation error expected");
        };
        let fields: Vec<&str> = issues.iter().map(|i| i.field.as_str()).collect();
        assert_eq!(fields, vec!["items[1].link", "name"]);
        assert_eq!(issues[0].code, "url");
        assert_eq!(issues[0].message, "must be a valid URL");
    }

    #[test]
    fn issue_paths_use_wire_names() {
        let schedule = Schedule { game_list: vec![Game { home_logo_url: "nope".into() }] };
        let ServerError::Validation(issues) = ServerError::from(schedule.validate().unwrap_err()) else {
            panic!("validation error expected");
        };
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].field, "gameList[0].homeLogoUrl");
    }

    #[test]
    fn camel_case_conversion() {
        assert_eq!(camel_case("background_color"), "backgroundColor");
        assert_eq!(camel_case("title"), "title");
        assert_eq!(camel_case("_private"), "_private");
    }

    #[tokio::test]
    async fn validation_maps_to_400_with_issues() {
        let err = ServerError::Validation(vec![ValidationIssue {
            field: "games".into(),
            code: "length".into(),
            message: "at most 5 games".into(),
        }]);
        let resp = err.into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body = body_json(resp).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["issues"][0]["field"], "games");
    }

    #[tokio::test]
    async fn internal_details_are_not_leaked() {
        let resp = ServerError::Internal("/secret/path exploded".into()).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(resp).await;
        assert_eq!(body["message"], "internal server error");
        assert!(body.get("issues").is_none());
    }

    #[tokio::test]
    async fn serialization_has_distinct_message() {
        let resp = ServerError::Serialization("downloads.square: url".into()).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(resp).await;
        assert_eq!(body["message"], "response serialization failed");
    }

    #[test]
    fn storage_not_found_is_404() {
        let err = ServerError::from(StorageError::NotFound("x.jpg".into()));
        assert!(matches!(err, ServerError::NotFound(_)));
    }
}
