// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Observes writes made by other handles and re-publishes them.
//!
//! A watcher remembers the newest change log sequence it has seen. Each poll
//! reads newer entries, keeps the newest entry per key, drops keys whose
//! newest entry was written by its own handle (those were already announced
//! on the local channel), and emits a [`StorageEvent`] on the storage channel
//! for the rest.
//!
//! The change log is pruned. A watcher that fell behind the oldest retained
//! entry cannot tell which keys it missed, so it resyncs: every key in the
//! namespace is announced with its current value, and every shared key that
//! is not stored is announced as removed.

use std::time::Duration;

use cadence_bus::{EventBus, StorageEvent};
use cadence_core::{CadenceError, StorageKey};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use crate::accessor::Storage;

/// Origin reported on events emitted by a resync.
pub const RESYNC_ORIGIN: &str = "resync";

/// Shortest poll period [`spawn_watcher`] will run at.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Polls a backend's change log on behalf of one handle.
pub struct StorageWatcher {
    storage: Storage,
    channel: EventBus,
    last_seq: i64,
}

impl StorageWatcher {
    /// Starts watching from the current end of the change log.
    pub fn new(storage: Storage, channel: EventBus) -> Result<Self, CadenceError> {
        let last_seq = storage.backend().latest_change()?;
        Ok(Self {
            storage,
            channel,
            last_seq,
        })
    }

    /// Sequence number of the newest change already processed.
    pub fn last_seq(&self) -> i64 {
        self.last_seq
    }

    /// Emits events for foreign changes since the last poll.
    ///
    /// Returns the number of events emitted.
    pub fn poll(&mut self) -> Result<usize, CadenceError> {
        let changes = self.storage.backend().changes_since(self.last_seq)?;
        let (Some(oldest), Some(newest)) = (changes.first(), changes.last()) else {
            return Ok(0);
        };
        let (oldest, newest) = (oldest.seq, newest.seq);
        let behind = self.last_seq;
        self.last_seq = newest;

        if oldest > behind + 1 {
            warn!(last_seq = behind, oldest, "change log pruned past this watcher, resyncing");
            return self.resync();
        }

        let mut events: Vec<StorageEvent> = Vec::new();
        for change in changes {
            let Some(key) = self.storage.parse_full_key(&change.key) else {
                trace!(key = %change.key, "ignoring change outside this namespace");
                continue;
            };
            events.retain(|e| e.key != key);
            events.push(StorageEvent {
                key,
                new_value: change.value,
                origin: change.origin,
            });
        }
        // A key last written by this handle is already current here.
        events.retain(|e| e.origin != self.storage.origin());

        for event in &events {
            debug!(key = %event.key, origin = %event.origin, "external change");
            self.channel.emit(event.key.topic(), event);
        }
        Ok(events.len())
    }

    /// Announces the current value of every key, regardless of the log.
    ///
    /// Returns the number of events emitted.
    pub fn resync(&mut self) -> Result<usize, CadenceError> {
        let prefix = format!("{}:", self.storage.namespace());
        let mut events: Vec<StorageEvent> = Vec::new();
        for (full, value) in self.storage.backend().entries(&prefix)? {
            let Some(key) = self.storage.parse_full_key(&full) else {
                continue;
            };
            events.push(StorageEvent {
                key,
                new_value: Some(value),
                origin: RESYNC_ORIGIN.to_string(),
            });
        }
        for key in StorageKey::fixed() {
            if !events.iter().any(|e| e.key == key) {
                events.push(StorageEvent {
                    key,
                    new_value: None,
                    origin: RESYNC_ORIGIN.to_string(),
                });
            }
        }

        for event in &events {
            self.channel.emit(event.key.topic(), event);
        }
        debug!(events = events.len(), "resync complete");
        Ok(events.len())
    }
}

/// Runs `watcher` every `interval` until `cancel` fires.
///
/// Poll errors are logged and the loop keeps going. Intervals shorter than
/// [`MIN_POLL_INTERVAL`] are raised to it.
pub fn spawn_watcher(
    mut watcher: StorageWatcher,
    interval: Duration,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval.max(MIN_POLL_INTERVAL));
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("storage watcher stopped");
                    break;
                }
                _ = ticker.tick() => {
                    if let Err(e) = watcher.poll() {
                        warn!(error = %e, "storage watcher poll failed");
                    }
                }
            }
        }
    })
}
