//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server errors to Sentry
//! before responding to the client. All route handlers return
//! `Result<T, AppError>`. Error responses are JSON `{message}` bodies;
//! validation failures additionally carry a per-field `errors` array.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::db::StoreError;
use crate::validation::FieldViolation;

/// Application-level error type for the REST API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Store operation failed (persistence or business rule).
    #[error("{0}")]
    Store(#[from] StoreError),

    /// Payload violated its declarative field rules.
    #[error("Validation failed")]
    Validation(Vec<FieldViolation>),

    /// Malformed request body (bad JSON shape, unknown field, bad enum value).
    #[error("{0}")]
    BadRequest(String),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Store(err) => match err {
                StoreError::Database(_) | StoreError::DataCorruption(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
                StoreError::ProductNotFound
                | StoreError::OrderNotFound
                | StoreError::UnknownProduct(_) => StatusCode::NOT_FOUND,
                StoreError::InsufficientStock(_)
                | StoreError::InvalidQuantity(_)
                | StoreError::NotCancellable => StatusCode::BAD_REQUEST,
            },
            Self::Validation(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if matches!(
            self,
            Self::Store(StoreError::Database(_) | StoreError::DataCorruption(_))
        ) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = self.status();
        let body = match &self {
            Self::Validation(violations) => json!({
                "message": self.to_string(),
                "errors": violations,
            }),
            // The underlying store message is forwarded as-is, matching the
            // original API (a known information-leakage tradeoff).
            _ => json!({ "message": self.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
