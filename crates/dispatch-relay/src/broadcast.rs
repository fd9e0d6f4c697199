//! In-process publish/subscribe hub.
//!
//! The [`Broadcaster`] keeps no history. [`Broadcaster::publish`] hands
//! the envelope synchronously to every subscriber registered at the
//! moment of the call and returns once all of them have been tried.
//! Each subscriber sees envelopes in publish order.
//!
//! # Failure isolation
//!
//! Delivery happens against a snapshot of the registry taken without
//! holding the lock, so a callback may freely subscribe or unsubscribe
//! (itself or others). A subscriber whose delivery fails is skipped for
//! the rest of the call and removed from the registry afterwards; the
//! remaining subscribers are unaffected.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use dispatch_types::Envelope;
use tracing::debug;

/// Opaque identity of one registered subscriber.
///
/// Identities are allocated in registration order and never reused by
/// the same [`Broadcaster`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriberId(u64);

impl core::fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Why a delivery to a single subscriber failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeliveryError {
    /// The subscriber's connection is gone.
    #[error("subscriber channel closed")]
    Closed,

    /// The subscriber is not keeping up and its buffer is full.
    #[error("subscriber lagged behind (buffer of {capacity} full)")]
    Lagged {
        /// Buffer capacity that was exhausted.
        capacity: usize,
    },
}

/// A registered delivery callback.
///
/// Implemented for every `Fn(&Envelope) -> Result<(), DeliveryError>`
/// closure, so plain closures can be subscribed directly.
pub trait Subscriber: Send + Sync {
    /// Deliver one envelope. Must not block.
    fn deliver(&self, envelope: &Envelope) -> Result<(), DeliveryError>;
}

impl<F> Subscriber for F
where
    F: Fn(&Envelope) -> Result<(), DeliveryError> + Send + Sync,
{
    fn deliver(&self, envelope: &Envelope) -> Result<(), DeliveryError> {
        self(envelope)
    }
}

/// Handle returned by [`Broadcaster::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionHandle {
    id: SubscriberId,
}

impl SubscriptionHandle {
    /// The subscriber identity behind this handle.
    pub const fn id(&self) -> SubscriberId {
        self.id
    }
}

type Registry = BTreeMap<SubscriberId, Arc<dyn Subscriber>>;

/// Process-wide fan-out hub for dispatch envelopes.
///
/// Subscribers are held in registration order. Constructed once at
/// startup and shared through [`Arc`] with the ingress and streaming
/// endpoints.
#[derive(Default)]
pub struct Broadcaster {
    subscribers: RwLock<Registry>,
    next_id: AtomicU64,
    published: AtomicU64,
}

impl Broadcaster {
    /// Create an empty broadcaster.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a subscriber and return the handle used to remove it.
    pub fn subscribe<S>(&self, subscriber: S) -> SubscriptionHandle
    where
        S: Subscriber + 'static,
    {
        let id = SubscriberId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.write().insert(id, Arc::new(subscriber));
        debug!(subscriber = %id, "subscriber registered");
        SubscriptionHandle { id }
    }

    /// Register a subscriber whose lifetime is bound to the returned guard.
    pub fn subscribe_scoped<S>(self: &Arc<Self>, subscriber: S) -> SubscriptionGuard
    where
        S: Subscriber + 'static,
    {
        let handle = self.subscribe(subscriber);
        SubscriptionGuard {
            broadcaster: Arc::clone(self),
            handle,
        }
    }

    /// Remove a subscriber.
    ///
    /// Returns `false` if it was already removed, either explicitly or
    /// after a failed delivery.
    pub fn unsubscribe(&self, handle: &SubscriptionHandle) -> bool {
        let removed = self.write().remove(&handle.id).is_some();
        if removed {
            debug!(subscriber = %handle.id, "subscriber removed");
        }
        removed
    }

    /// Deliver `envelope` to every currently registered subscriber.
    ///
    /// Returns the number of successful deliveries. Zero subscribers is
    /// not an error.
    pub fn publish(&self, envelope: &Envelope) -> usize {
        self.published.fetch_add(1, Ordering::Relaxed);

        let snapshot: Vec<(SubscriberId, Arc<dyn Subscriber>)> = self
            .read()
            .iter()
            .map(|(id, subscriber)| (*id, Arc::clone(subscriber)))
            .collect();

        let mut delivered: usize = 0;
        let mut failed = Vec::new();
        for (id, subscriber) in snapshot {
            // Removed by an earlier callback in this same call.
            if !self.read().contains_key(&id) {
                continue;
            }
            match subscriber.deliver(envelope) {
                Ok(()) => delivered = delivered.saturating_add(1),
                Err(e) => {
                    debug!(subscriber = %id, error = %e, "delivery failed, dropping subscriber");
                    failed.push(id);
                }
            }
        }

        if !failed.is_empty() {
            let mut registry = self.write();
            for id in &failed {
                registry.remove(id);
            }
        }

        delivered
    }

    /// Drop every subscriber.
    ///
    /// Used at shutdown so open streams observe their channel closing
    /// and finish.
    pub fn close_all(&self) -> usize {
        let mut registry = self.write();
        let count = registry.len();
        registry.clear();
        count
    }

    /// Number of currently registered subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.read().len()
    }

    /// Total number of envelopes published since construction.
    pub fn published_count(&self) -> u64 {
        self.published.load(Ordering::Relaxed)
    }

    fn read(&self) -> RwLockReadGuard<'_, Registry> {
        self.subscribers.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Registry> {
        self.subscribers.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl core::fmt::Debug for Broadcaster {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Broadcaster")
            .field("subscribers", &self.subscriber_count())
            .field("published", &self.published_count())
            .finish()
    }
}

/// Unsubscribes its subscriber when dropped.
#[derive(Debug)]
pub struct SubscriptionGuard {
    broadcaster: Arc<Broadcaster>,
    handle: SubscriptionHandle,
}

impl SubscriptionGuard {
    /// The subscriber identity held by this guard.
    pub const fn id(&self) -> SubscriberId {
        self.handle.id
    }
}

impl Drop for SubscriptionGuard {
    fn drop(&mut self) {
        self.broadcaster.unsubscribe(&self.handle);
    }
}
