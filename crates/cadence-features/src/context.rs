// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Explicitly constructed dependencies shared by every feature handle.

use std::time::Duration;

use cadence_bus::Channels;
use cadence_config::CadenceConfig;
use cadence_core::CadenceError;
use cadence_storage::{spawn_watcher, Storage, StorageWatcher};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Storage handle plus notification channels for one "tab".
///
/// Feature handles mounted from the same context see each other's saves
/// through the local channel. A context made with [`AppContext::share`]
/// behaves like another tab: same backend, separate local channel, and
/// updates arrive only through a storage watcher.
#[derive(Clone, Debug)]
pub struct AppContext {
    pub storage: Storage,
    pub channels: Channels,
}

impl AppContext {
    pub fn new(storage: Storage) -> Self {
        Self {
            storage,
            channels: Channels::new(),
        }
    }

    /// Opens the configured database.
    pub fn open(config: &CadenceConfig) -> Result<Self, CadenceError> {
        Ok(Self::new(Storage::open(&config.storage)?))
    }

    /// A context over a fresh in-memory backend.
    pub fn in_memory() -> Self {
        Self::new(Storage::in_memory("cadence"))
    }

    /// Another tab on the same backend.
    pub fn share(&self) -> Self {
        Self::new(self.storage.share())
    }

    /// A watcher feeding this context's storage channel.
    pub fn watcher(&self) -> Result<StorageWatcher, CadenceError> {
        StorageWatcher::new(self.storage.clone(), self.channels.storage.clone())
    }

    /// Starts a background watcher polling every `interval`.
    pub fn start_watcher(
        &self,
        interval: Duration,
        cancel: CancellationToken,
    ) -> Result<JoinHandle<()>, CadenceError> {
        Ok(spawn_watcher(self.watcher()?, interval, cancel))
    }
}

/// Fresh record id.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
