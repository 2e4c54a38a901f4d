use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{ApiError, FieldErrors};

/// `Json<T>` whose rejections come back as `ApiError` 400s.
#[derive(Debug)]
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(ApiJson(value)),
            Err(rejection) => Err(rejection.into()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        debug!(rejection = %rejection.body_text(), "json body rejected");
        match rejection {
            JsonRejection::JsonDataError(e) => {
                let (field, message) = field_of(&e.body_text());
                let mut errors = FieldErrors::default();
                errors.add(&field, message);
                ApiError::Validation(errors)
            }
            JsonRejection::JsonSyntaxError(_) => ApiError::BadRequest("Malformed JSON body".into()),
            JsonRejection::MissingJsonContentType(_) => {
                ApiError::BadRequest("Expected request with `Content-Type: application/json`".into())
            }
            other => ApiError::BadRequest(other.body_text()),
        }
    }
}

/// Splits a deserialization failure into the offending field path and message.
/// Failures at the document root fall back to `body`.
fn field_of(text: &str) -> (String, String) {
    let detail = text
        .split_once("target type: ")
        .map(|(_, rest)| rest)
        .unwrap_or(text)
        .trim();

    if let Some((path, message)) = detail.split_once(": ") {
        if !path.is_empty() && !path.contains(char::is_whitespace) {
            return (path.to_string(), message.to_string());
        }
    }
    if let Some(rest) = detail.strip_prefix("missing field `") {
        if let Some((name, _)) = rest.split_once('`') {
            return (name.to_string(), "Missing data for required field.".to_string());
        }
    }
    ("body".to_string(), detail.to_string())
}
