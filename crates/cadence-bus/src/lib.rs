// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed publish/subscribe for document change notification.
//!
//! Delivery is synchronous: `emit` calls every handler currently subscribed to
//! the topic, in subscription order, before it returns. Handlers receive the
//! raw stored value and re-derive state from it, so duplicate delivery is
//! harmless.
//!
//! Two independent buses carry the same [`StorageEvent`] payload:
//! the same-handle channel, emitted right after a local write, and the
//! storage channel, fed by a watcher that observes writes made by other
//! handles. Persistence handles subscribe to both through [`Channels`].

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use cadence_core::{StorageKey, Topic};
use tracing::trace;

/// Notification that the document under `key` was written or removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageEvent {
    /// Key that changed.
    pub key: StorageKey,
    /// Raw stored text after the change; `None` when the key was removed.
    pub new_value: Option<String>,
    /// Origin id of the handle that performed the write.
    pub origin: String,
}

type Handler = Arc<dyn Fn(&StorageEvent) + Send + Sync>;

struct Registration {
    id: u64,
    topic: Topic,
    handler: Handler,
}

struct BusInner {
    name: &'static str,
    next_id: AtomicU64,
    registrations: Mutex<Vec<Registration>>,
}

impl BusInner {
    fn lock(&self) -> MutexGuard<'_, Vec<Registration>> {
        // Handlers never run under this lock, so a poisoned guard still holds
        // a consistent list.
        self.registrations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn remove(&self, id: u64) -> bool {
        let mut regs = self.lock();
        let before = regs.len();
        regs.retain(|r| r.id != id);
        regs.len() != before
    }

    fn is_registered(&self, id: u64) -> bool {
        self.lock().iter().any(|r| r.id == id)
    }
}

/// A synchronous, in-process event bus keyed by [`Topic`].
///
/// Cloning yields another handle to the same bus.
#[derive(Clone)]
pub struct EventBus {
    inner: Arc<BusInner>,
}

impl EventBus {
    /// Creates an empty bus. `name` only appears in logs.
    pub fn new(name: &'static str) -> Self {
        Self {
            inner: Arc::new(BusInner {
                name,
                next_id: AtomicU64::new(1),
                registrations: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Subscribes `handler` to `topic`.
    ///
    /// The handler stays registered until the returned [`Subscription`] is
    /// dropped or explicitly unsubscribed.
    pub fn on<F>(&self, topic: Topic, handler: F) -> Subscription
    where
        F: Fn(&StorageEvent) + Send + Sync + 'static,
    {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        self.inner.lock().push(Registration {
            id,
            topic,
            handler: Arc::new(handler),
        });
        trace!(bus = self.inner.name, %topic, id, "subscribed");
        Subscription {
            id,
            topic,
            bus: Arc::downgrade(&self.inner),
        }
    }

    /// Delivers `event` to every handler subscribed to `topic`.
    ///
    /// Handlers run on the calling thread in subscription order. A handler
    /// may subscribe, unsubscribe, or emit re-entrantly: handlers added
    /// during delivery are not called for this event, and handlers removed
    /// during delivery are skipped if they have not run yet.
    ///
    /// Returns the number of handlers called.
    pub fn emit(&self, topic: Topic, event: &StorageEvent) -> usize {
        let snapshot: Vec<(u64, Handler)> = self
            .inner
            .lock()
            .iter()
            .filter(|r| r.topic == topic)
            .map(|r| (r.id, Arc::clone(&r.handler)))
            .collect();

        let mut delivered = 0;
        for (id, handler) in snapshot {
            if !self.inner.is_registered(id) {
                continue;
            }
            handler(event);
            delivered += 1;
        }
        trace!(bus = self.inner.name, %topic, delivered, "emitted");
        delivered
    }

    /// Number of handlers currently subscribed to `topic`.
    pub fn subscriber_count(&self, topic: Topic) -> usize {
        self.inner.lock().iter().filter(|r| r.topic == topic).count()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("name", &self.inner.name)
            .field("subscriptions", &self.inner.lock().len())
            .finish()
    }
}

/// Registration guard returned by [`EventBus::on`]. Dropping it unsubscribes.
#[must_use = "dropping a Subscription unsubscribes the handler"]
pub struct Subscription {
    id: u64,
    topic: Topic,
    bus: Weak<BusInner>,
}

impl Subscription {
    /// Topic this subscription listens to.
    pub fn topic(&self) -> Topic {
        self.topic
    }

    /// Removes the handler now.
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let Some(bus) = self.bus.upgrade() else {
            return;
        };
        if bus.remove(self.id) {
            trace!(bus = bus.name, topic = %self.topic, id = self.id, "unsubscribed");
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("topic", &self.topic)
            .finish()
    }
}

/// The two notification channels a persistence handle listens on.
#[derive(Clone, Debug)]
pub struct Channels {
    /// Writes made through this process' own handles.
    pub local: EventBus,
    /// Writes made by other handles, as observed by a storage watcher.
    pub storage: EventBus,
}

impl Channels {
    pub fn new() -> Self {
        Self {
            local: EventBus::new("local"),
            storage: EventBus::new("storage"),
        }
    }

    /// Subscribes the same handler to `topic` on both channels.
    pub fn subscribe_both<F>(&self, topic: Topic, handler: F) -> [Subscription; 2]
    where
        F: Fn(&StorageEvent) + Send + Sync + 'static,
    {
        let handler = Arc::new(handler);
        let on_storage = Arc::clone(&handler);
        [
            self.local.on(topic, move |event| handler(event)),
            self.storage.on(topic, move |event| on_storage(event)),
        ]
    }
}

impl Default for Channels {
    fn default() -> Self {
        Self::new()
    }
}
