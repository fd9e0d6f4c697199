//! Error types for the dashboard client.
//!
//! Runtime failures (malformed events, failed route fetches, dropped
//! streams) are handled where they occur and never reach these types;
//! only startup failures propagate to `main`.

use crate::route::RouteError;

/// Errors that can occur while starting the dashboard.
#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    /// Configuration is invalid.
    #[error("config error: {0}")]
    Config(String),

    /// The relay stream client could not be built.
    #[error("stream error: {0}")]
    Stream(#[from] StreamError),

    /// The route backend could not be built.
    #[error("route error: {0}")]
    Route(#[from] RouteError),
}

/// Errors from a single connection to the relay event stream.
#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    /// Connecting or reading failed at the HTTP layer.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The relay answered with something other than an event stream.
    #[error("unexpected content type: {0}")]
    NotAnEventStream(String),

    /// The consumer of decoded events has gone away.
    #[error("event receiver closed")]
    ReceiverClosed,
}
