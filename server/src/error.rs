//! API errors and their JSON rendering.
//!
//! Every error response carries `{"error": "..."}`. Internal errors also
//! carry a `message`, which holds the fault detail only when the server
//! runs in the development environment.

use std::any::Any;

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use todo_core::{StoreError, ValidationError};

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Unusable todo text.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// The request body is not the JSON shape the endpoint expects.
    #[error("{0}")]
    BadRequest(String),

    #[error("Todo not found")]
    NotFound,

    #[error("API endpoint not found")]
    RouteNotFound,

    #[error("Method not allowed")]
    MethodNotAllowed,

    /// `detail` is only set when it may be shown to the caller.
    #[error("Internal server error")]
    Internal { detail: Option<String> },
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound | ApiError::RouteNotFound => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Build the error for a panic caught at the HTTP boundary.
    pub fn from_panic(payload: &(dyn Any + Send), expose_detail: bool) -> Self {
        let detail = if let Some(message) = payload.downcast_ref::<String>() {
            message.clone()
        } else if let Some(message) = payload.downcast_ref::<&str>() {
            message.to_string()
        } else {
            "unknown panic".to_string()
        };
        ApiError::Internal {
            detail: expose_detail.then_some(detail),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Validation(err) => ApiError::Validation(err),
            StoreError::NotFound { .. } => ApiError::NotFound,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl From<&ApiError> for ErrorResponse {
    fn from(err: &ApiError) -> Self {
        let message = match err {
            ApiError::Internal { detail } => Some(
                detail
                    .clone()
                    .unwrap_or_else(|| "Something went wrong".to_string()),
            ),
            _ => None,
        };
        Self {
            error: err.to_string(),
            message,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = ?self, "request failed");
        }
        (status, Json(ErrorResponse::from(&self))).into_response()
    }
}
