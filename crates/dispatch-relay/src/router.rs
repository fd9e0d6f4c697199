//! Axum router construction for the relay.
//!
//! Assembles the ingress, streaming and status routes into a single
//! [`Router`] with permissive CORS so browser dashboards on any origin
//! can open the event stream.

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use crate::{ingress, status, stream};

/// Build the complete Axum router for the relay.
///
/// The router includes:
/// - `POST /api/webhook` -- producer ingress
/// - `GET /events` -- server-sent event stream
/// - `GET /api/status` -- relay counters
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/webhook", post(ingress::webhook))
        .route("/events", get(stream::events))
        .route("/api/status", get(status::status))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
