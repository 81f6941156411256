use std::any::Any;

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use quill_core::error::AppError;

use crate::dto::ErrorResponse;

/// Errors a handler can return. Renders as an [`ErrorResponse`].
#[derive(Debug)]
pub enum ApiError {
    /// Pipeline failure. Client-side causes map to 400, faults to 500.
    App(AppError),
    /// Request body had no usable `url`.
    MissingUrl,
    /// Request body was not the expected JSON.
    InvalidBody(String),
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self::App(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::InvalidBody(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::MissingUrl => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::new("Please provide a URL", "missing_url"),
            ),
            ApiError::InvalidBody(detail) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::new(format!("Invalid request body: {detail}"), "invalid_body"),
            ),
            ApiError::App(err) if err.is_client_error() => {
                tracing::warn!(kind = err.kind(), error = %err, "Article fetch failed");
                let body = ErrorResponse {
                    error: err.user_message(),
                    kind: err.kind().to_string(),
                    remediation: err.remediation().iter().map(|s| s.to_string()).collect(),
                };
                (StatusCode::BAD_REQUEST, body)
            }
            ApiError::App(err) => {
                tracing::error!(kind = err.kind(), error = %err, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new("Internal server error", err.kind()),
                )
            }
        };

        (status, axum::Json(body)).into_response()
    }
}

/// Response for a panicking handler, used with `CatchPanicLayer`.
pub fn panic_response(_panic: Box<dyn Any + Send + 'static>) -> Response {
    ApiError::from(AppError::Generic("handler panicked".into())).into_response()
}
