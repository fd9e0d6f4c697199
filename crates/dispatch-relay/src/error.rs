//! Error types for the relay HTTP layer.
//!
//! [`RelayError`] unifies request-level failures into a single enum that
//! converts into an Axum HTTP response via its
//! [`IntoResponse`](axum::response::IntoResponse) implementation.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Errors that can occur in the relay.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    /// The inbound webhook body could not be parsed as JSON.
    #[error("malformed payload: {message}")]
    MalformedPayload {
        /// Status code chosen by the extractor (400, 415 or 422).
        status: StatusCode,
        /// Human-readable parse failure.
        message: String,
    },

    /// Configuration is invalid.
    #[error("config error: {0}")]
    Config(String),
}

impl From<JsonRejection> for RelayError {
    fn from(rejection: JsonRejection) -> Self {
        Self::MalformedPayload {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::MalformedPayload { status, message } => (*status, message.clone()),
            Self::Config(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };

        let body = serde_json::json!({
            "error": message,
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}
