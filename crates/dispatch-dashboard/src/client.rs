//! Relay stream client.
//!
//! Holds a long-lived `GET /events` request open, decodes the body as it
//! arrives and forwards each event payload to the session. When the
//! stream ends or fails, it waits and reconnects, the way a browser
//! `EventSource` does.

use std::time::Duration;

use futures::StreamExt;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::config::DashboardConfig;
use crate::error::StreamError;
use crate::sse::{SseDecoder, SseFrame};

/// Media type of a server-sent event stream.
const EVENT_STREAM: &str = "text/event-stream";

/// Reconnecting reader of the relay event stream.
#[derive(Debug, Clone)]
pub struct EventStreamClient {
    http: reqwest::Client,
    url: String,
    reconnect_delay: Duration,
}

impl EventStreamClient {
    /// Create a client for the configured relay.
    ///
    /// # Errors
    ///
    /// Returns [`StreamError::Http`] if the HTTP client cannot be built.
    pub fn new(config: &DashboardConfig) -> Result<Self, StreamError> {
        let http = reqwest::Client::builder().build()?;
        Ok(Self {
            http,
            url: config.events_url.clone(),
            reconnect_delay: config.reconnect_delay,
        })
    }

    /// The stream URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Forward event payloads to `events` until the receiver is dropped.
    pub async fn run(&self, events: mpsc::Sender<String>) {
        loop {
            match self.stream_once(&events).await {
                Ok(()) => info!(url = %self.url, "relay stream ended"),
                Err(StreamError::ReceiverClosed) => return,
                Err(e) => warn!(url = %self.url, error = %e, "relay stream failed"),
            }
            if events.is_closed() {
                return;
            }
            debug!(delay = ?self.reconnect_delay, "reconnecting");
            tokio::time::sleep(self.reconnect_delay).await;
        }
    }

    /// Read one connection to completion.
    ///
    /// # Errors
    ///
    /// Returns [`StreamError`] if the connection fails, the response is
    /// not an event stream, or `events` is closed.
    pub async fn stream_once(&self, events: &mpsc::Sender<String>) -> Result<(), StreamError> {
        let response = self
            .http
            .get(&self.url)
            .header(ACCEPT, EVENT_STREAM)
            .send()
            .await?
            .error_for_status()?;

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_owned();
        if !content_type.starts_with(EVENT_STREAM) {
            return Err(StreamError::NotAnEventStream(content_type));
        }
        info!(url = %self.url, "connected to relay");

        let mut decoder = SseDecoder::new();
        let mut body = response.bytes_stream();
        while let Some(chunk) = body.next().await {
            for frame in decoder.feed(&chunk?) {
                match frame {
                    SseFrame::Message(payload) => {
                        if events.send(payload).await.is_err() {
                            return Err(StreamError::ReceiverClosed);
                        }
                    }
                    SseFrame::Comment(comment) => debug!(%comment, "relay comment"),
                }
            }
        }
        Ok(())
    }
}
