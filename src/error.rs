//! Uniform error responses.
//!
//! Every failure leaves the service as `{"message": ..., "data": ...}` with
//! the status code of its kind.

use std::collections::BTreeMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::error;

use crate::auth::cipher::CipherError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Malformed or invalid input.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Field-level validation failures, keyed by field name.
    #[error("validation failed")]
    Validation(FieldErrors),

    #[error("login failed, invalid credentials")]
    InvalidCredentials,

    /// No valid session on a protected route.
    #[error("unauthorized")]
    Unauthorized,

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("already exists: {0}")]
    AlreadyExists(String),

    #[error(transparent)]
    Cipher(#[from] CipherError),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::InvalidCredentials | ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::AlreadyExists(_) => StatusCode::CONFLICT,
            ApiError::Cipher(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (message, data) = match self {
            ApiError::BadRequest(msg)
            | ApiError::Forbidden(msg)
            | ApiError::NotFound(msg)
            | ApiError::AlreadyExists(msg) => (msg, Value::Null),
            ApiError::Validation(fields) => ("Validation failed".to_string(), json!(fields)),
            ApiError::InvalidCredentials => {
                ("Login failed, invalid credentials".to_string(), Value::Null)
            }
            ApiError::Unauthorized => ("Unauthorized".to_string(), Value::Null),
            ApiError::Cipher(e) => {
                error!(error = %e, "cipher failure");
                ("An error occurred.".to_string(), Value::Null)
            }
            ApiError::Internal(e) => {
                error!(error = ?e, "internal error");
                ("An error occurred.".to_string(), Value::Null)
            }
        };

        (status, Json(json!({ "message": message, "data": data }))).into_response()
    }
}

/// Collects validation messages per field before failing the request.
#[derive(Debug, Default, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[cfg(test)]
    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn into_result(self) -> Result<(), ApiError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(ApiError::Validation(self))
        }
    }
}

/// Success body mirroring the error shape.
#[derive(Debug, Serialize)]
pub struct MessageBody<T = Value> {
    pub message: String,
    pub data: Option<T>,
}

impl MessageBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            data: None,
        }
    }
}

impl<T> MessageBody<T> {
    pub fn with_data(message: impl Into<String>, data: T) -> Self {
        Self {
            message: message.into(),
            data: Some(data),
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
