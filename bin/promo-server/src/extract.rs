//! Request extractors.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::error::{ServerError, ValidationIssue};

/// `Json<T>` followed by `T::validate()`.
///
/// Malformed JSON and failed validation both become HTTP 400 with an
/// `issues` list.
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await.map_err(json_issue)?;
        value.validate()?;
        Ok(Self(value))
    }
}

fn json_issue(rejection: JsonRejection) -> ServerError {
    let code = match &rejection {
        JsonRejection::JsonDataError(_) => "invalid_shape",
        JsonRejection::JsonSyntaxError(_) => "invalid_json",
        JsonRejection::MissingJsonContentType(_) => "content_type",
        _ => "unreadable_body",
    };
    ServerError::Validation(vec![ValidationIssue {
        field: "body".to_owned(),
        code: code.to_owned(),
        message: rejection.body_text(),
    }])
}
