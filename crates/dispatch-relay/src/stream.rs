//! Server-sent event stream for live dashboards.
//!
//! Clients connect to `GET /events`. Each connection registers its own
//! subscriber with the [`Broadcaster`](crate::broadcast::Broadcaster)
//! and receives every envelope published while it is connected, framed
//! as `data: <json>\n\n`. A `: connected` comment is sent first so the
//! client can confirm the channel is open before any event arrives.
//!
//! Each connection buffers at most `stream_buffer` envelopes. A client
//! that falls further behind is dropped and its stream ends; clients are
//! expected to reconnect. Backpressure is not otherwise propagated.

use std::convert::Infallible;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use dispatch_types::Envelope;
use futures::stream::{self, Stream, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::broadcast::{DeliveryError, Subscriber, SubscriptionGuard};
use crate::state::AppState;

/// Comment sent as the first frame of every stream.
pub const CONNECTED_COMMENT: &str = "connected";

/// Subscriber that queues envelopes for one streaming connection.
#[derive(Debug)]
pub struct ChannelSubscriber {
    tx: mpsc::Sender<Envelope>,
}

impl ChannelSubscriber {
    /// Wrap the sending half of a connection queue.
    pub const fn new(tx: mpsc::Sender<Envelope>) -> Self {
        Self { tx }
    }
}

impl Subscriber for ChannelSubscriber {
    fn deliver(&self, envelope: &Envelope) -> Result<(), DeliveryError> {
        self.tx.try_send(envelope.clone()).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => DeliveryError::Lagged {
                capacity: self.tx.max_capacity(),
            },
            mpsc::error::TrySendError::Closed(_) => DeliveryError::Closed,
        })
    }
}

/// Envelopes queued for one connection.
///
/// Owns the subscription: dropping the stream (which the transport does
/// when the client disconnects) unsubscribes before the queue is
/// released.
#[derive(Debug)]
pub struct SubscriberStream {
    // Declared first so it drops first.
    guard: SubscriptionGuard,
    rx: mpsc::Receiver<Envelope>,
}

impl SubscriberStream {
    /// Pair a subscription guard with its queue.
    pub const fn new(guard: SubscriptionGuard, rx: mpsc::Receiver<Envelope>) -> Self {
        Self { guard, rx }
    }
}

impl Stream for SubscriberStream {
    type Item = Envelope;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Envelope>> {
        self.rx.poll_recv(cx)
    }
}

impl Drop for SubscriberStream {
    fn drop(&mut self) {
        debug!(subscriber = %self.guard.id(), "stream client disconnected");
    }
}

/// Open a server-sent event stream of relayed envelopes.
///
/// # Route
///
/// `GET /events`
pub async fn events(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let (tx, rx) = mpsc::channel(state.stream_buffer);
    let guard = state
        .broadcaster
        .subscribe_scoped(ChannelSubscriber::new(tx));
    debug!(subscriber = %guard.id(), "stream client connected");

    let connected = stream::once(async {
        Ok::<Event, Infallible>(Event::default().comment(CONNECTED_COMMENT))
    });
    let updates = SubscriberStream::new(guard, rx).filter_map(|envelope| async move {
        match serde_json::to_string(&envelope) {
            Ok(json) => Some(Ok::<Event, Infallible>(Event::default().data(json))),
            Err(e) => {
                warn!("Failed to serialize envelope for stream: {e}");
                None
            }
        }
    });

    Sse::new(connected.chain(updates)).keep_alive(KeepAlive::default())
}
