//! Operator status endpoint.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use chrono::{DateTime, Utc};

use crate::state::AppState;

/// Response body for `GET /api/status`.
#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct RelayStatus {
    /// Always `"ok"` while the relay is serving.
    pub status: String,
    /// Open streaming subscriptions.
    pub subscribers: usize,
    /// Envelopes accepted since startup.
    pub events_relayed: u64,
    /// When the relay started.
    pub started_at: DateTime<Utc>,
    /// Seconds since startup.
    pub uptime_seconds: i64,
}

/// Report relay liveness and fan-out counters.
///
/// # Route
///
/// `GET /api/status`
pub async fn status(State(state): State<Arc<AppState>>) -> Json<RelayStatus> {
    Json(RelayStatus {
        status: "ok".to_owned(),
        subscribers: state.broadcaster.subscriber_count(),
        events_relayed: state.broadcaster.published_count(),
        started_at: state.started_at,
        uptime_seconds: Utc::now()
            .signed_duration_since(state.started_at)
            .num_seconds(),
    })
}
