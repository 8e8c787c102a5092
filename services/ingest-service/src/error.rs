use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::any::Any;
use thiserror::Error;

use crate::models::ErrorResponse;

/// The two failure kinds callers can tell apart.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Body missing, over the size ceiling, or not valid JSON.
    #[error("malformed request body: {0}")]
    MalformedInput(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl IngestError {
    pub fn status(&self) -> StatusCode {
        match self {
            IngestError::MalformedInput(_) => StatusCode::BAD_REQUEST,
            IngestError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn public_message(&self) -> &'static str {
        match self {
            IngestError::MalformedInput(_) => "Invalid JSON",
            IngestError::Internal(_) => "Internal Server Error",
        }
    }
}

impl IntoResponse for IngestError {
    fn into_response(self) -> Response {
        match &self {
            IngestError::MalformedInput(detail) => {
                tracing::error!(error = %detail, "JSON parse error")
            }
            IngestError::Internal(detail) => tracing::error!(error = %detail, "unhandled error"),
        }

        (
            self.status(),
            Json(ErrorResponse {
                ok: false,
                error: self.public_message(),
            }),
        )
            .into_response()
    }
}

/// Response for a handler that panicked; plugged into `CatchPanicLayer`.
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else {
        "handler panicked".to_string()
    };
    IngestError::Internal(detail).into_response()
}
