//! Shared application state for the relay server.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::broadcast::Broadcaster;
use crate::config::DEFAULT_STREAM_BUFFER;

/// Shared state for the Axum application.
///
/// Wrapped in [`Arc`] and injected via Axum's `State` extractor. The
/// broadcaster is constructed by the caller so its lifetime is owned by
/// the process, not by the router.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The fan-out hub shared by ingress and streaming endpoints.
    pub broadcaster: Arc<Broadcaster>,
    /// Per-connection queue depth for streaming clients.
    pub stream_buffer: usize,
    /// Wall-clock time the relay started.
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// Create application state around an existing broadcaster.
    pub fn new(broadcaster: Arc<Broadcaster>, stream_buffer: usize) -> Self {
        Self {
            broadcaster,
            stream_buffer: stream_buffer.max(1),
            started_at: Utc::now(),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Arc::new(Broadcaster::new()), DEFAULT_STREAM_BUFFER)
    }
}
