//! One-shot subscriptions keyed by (object identity, property name).
//!
//! A subscriber registers interest in the next write of one property. The
//! first stored write removes the whole entry and delivers the value to every
//! subscriber registered at that time, so later writes are plain writes.
//! Dropping a [`Subscription`] before it fires unregisters it.

use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::oneshot;
use tracing::trace;

use super::HostValue;
use super::ObjectId;

type SubscriptionKey = (ObjectId, String);

#[derive(Debug)]
struct Subscriber {
    id: u64,
    sender: oneshot::Sender<HostValue>,
}

#[derive(Debug, Default)]
pub struct SubscriptionTable {
    subscribers: DashMap<SubscriptionKey, Vec<Subscriber>>,
    next_id: AtomicU64,
}

impl SubscriptionTable {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Register interest in the next stored write of `key` on `object`
    pub fn subscribe(
        self: &Arc<Self>,
        object: ObjectId,
        key: &str,
    ) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (sender, receiver) = oneshot::channel();
        let entry_key = (object, key.to_string());

        self.subscribers
            .entry(entry_key.clone())
            .or_default()
            .push(Subscriber { id, sender });

        trace!(subscription_id = id, ?object, key, "property subscription registered");

        Subscription {
            id,
            key: entry_key,
            table: Arc::clone(self),
            receiver: Some(receiver),
        }
    }

    /// Deliver `value` to every subscriber of (object, key) and forget them
    pub(crate) fn fire(
        &self,
        object: ObjectId,
        key: &str,
        value: &HostValue,
    ) -> usize {
        let Some((_, subscribers)) = self.subscribers.remove(&(object, key.to_string())) else {
            return 0;
        };

        let count = subscribers.len();
        for subscriber in subscribers {
            // receiver may already be gone if the waiter was dropped mid-flight
            let _ = subscriber.sender.send(value.clone());
        }

        trace!(?object, key, subscribers = count, "property subscriptions fired");
        count
    }

    /// Number of pending subscriptions for one property
    pub fn pending(
        &self,
        object: ObjectId,
        key: &str,
    ) -> usize {
        self.subscribers
            .get(&(object, key.to_string()))
            .map(|s| s.len())
            .unwrap_or(0)
    }

    /// Number of properties with at least one pending subscription
    pub fn watched_property_count(&self) -> usize {
        self.subscribers.len()
    }

    fn unregister(
        &self,
        key: &SubscriptionKey,
        id: u64,
    ) {
        self.subscribers.remove_if_mut(key, |_key, subscribers| {
            subscribers.retain(|s| s.id != id);
            subscribers.is_empty()
        });
    }
}

/// Pending one-shot subscription; unregisters itself when dropped
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    key: SubscriptionKey,
    table: Arc<SubscriptionTable>,
    receiver: Option<oneshot::Receiver<HostValue>>,
}

impl Subscription {
    /// Waits for the first stored write. `None` if the table was torn down.
    pub async fn recv(mut self) -> Option<HostValue> {
        let receiver = self.receiver.take()?;
        receiver.await.ok()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.table.unregister(&self.key, self.id);
    }
}
