//! Event relay for the live dispatch map.
//!
//! This crate provides an Axum HTTP server that exposes:
//!
//! - **Webhook ingress** (`POST /api/webhook`) where external producers
//!   submit dispatch envelopes
//! - **Server-sent event stream** (`GET /events`) that fans every accepted
//!   envelope out to all connected dashboards
//! - **Status endpoint** (`GET /api/status`) with subscriber and
//!   throughput counters
//!
//! # Architecture
//!
//! A single [`Broadcaster`] is constructed at startup and injected into
//! the router state. Ingress publishes into it synchronously; each
//! streaming connection owns one subscription whose lifetime is bound to
//! the response stream. Nothing is persisted: a dashboard that connects
//! late sees only events published after it connected.
//!
//! [`Broadcaster`]: broadcast::Broadcaster

pub mod broadcast;
pub mod config;
pub mod error;
pub mod ingress;
pub mod router;
pub mod server;
pub mod state;
pub mod status;
pub mod stream;

// Re-export primary types for convenience.
pub use broadcast::{Broadcaster, DeliveryError, Subscriber, SubscriptionGuard, SubscriptionHandle};
pub use config::{LogFormat, RelayConfig};
pub use error::RelayError;
pub use router::build_router;
pub use server::{serve_until, start_server, ServerConfig, ServerError};
pub use state::AppState;
