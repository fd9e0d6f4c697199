//! Webhook ingress for external event producers.
//!
//! `POST /api/webhook` accepts one JSON envelope, normalizes it and
//! publishes it. The producer is acknowledged immediately and never
//! learns whether any dashboard received the event.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use dispatch_types::Envelope;
use serde_json::Value;
use tracing::{info, warn};

use crate::error::RelayError;
use crate::state::AppState;

/// Turn a raw producer payload into the envelope that is relayed.
///
/// Field types are coerced to the documented schema; no field is
/// validated beyond that.
pub fn normalize(payload: Value) -> Envelope {
    Envelope::from_value(payload)
}

/// Accept a producer event and broadcast it.
///
/// # Route
///
/// `POST /api/webhook`
pub async fn webhook(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, RelayError> {
    let Json(payload) = payload.map_err(|rejection| {
        warn!(error = %rejection.body_text(), "rejected malformed webhook payload");
        RelayError::from(rejection)
    })?;

    let envelope = normalize(payload);
    let delivered = state.broadcaster.publish(&envelope);
    info!(kind = envelope.tag(), delivered, "event relayed");

    Ok((StatusCode::OK, "OK"))
}
