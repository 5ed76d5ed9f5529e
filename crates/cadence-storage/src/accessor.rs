// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed, namespaced access to a [`KeyValueBackend`].

use std::sync::Arc;

use cadence_config::model::StorageConfig;
use cadence_core::{CadenceError, KeyValueBackend, StorageKey};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::database::SqliteBackend;
use crate::memory::MemoryBackend;

/// A handle onto the document store.
///
/// Keys are drawn from [`StorageKey`] and stored as `<namespace>:<name>`.
/// Every handle carries an origin id that tags its writes in the backend's
/// change log; clones share the origin, [`Storage::share`] mints a new one.
///
/// Reads never fail: backend errors and corrupt JSON are logged and read as
/// absent, so a damaged document degrades to default state instead of
/// breaking the caller. Writes do propagate errors.
#[derive(Clone)]
pub struct Storage {
    backend: Arc<dyn KeyValueBackend>,
    namespace: String,
    origin: String,
}

impl Storage {
    /// Wraps `backend` with a fresh origin id.
    pub fn new(backend: Arc<dyn KeyValueBackend>, namespace: impl Into<String>) -> Self {
        Self {
            backend,
            namespace: namespace.into(),
            origin: Uuid::new_v4().to_string(),
        }
    }

    /// Opens the SQLite database named in `config`.
    pub fn open(config: &StorageConfig) -> Result<Self, CadenceError> {
        let backend = SqliteBackend::open(&config.database_path, config.wal_mode)?;
        Ok(Self::new(Arc::new(backend), config.namespace.clone()))
    }

    /// A store backed by a process-local map.
    pub fn in_memory(namespace: impl Into<String>) -> Self {
        Self::new(Arc::new(MemoryBackend::new()), namespace)
    }

    /// Another handle on the same backend with its own origin id.
    ///
    /// Writes from the new handle show up in this handle's change watcher,
    /// the way writes from another browser tab do.
    pub fn share(&self) -> Self {
        Self::new(Arc::clone(&self.backend), self.namespace.clone())
    }

    /// Origin id tagging this handle's writes.
    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn backend(&self) -> &Arc<dyn KeyValueBackend> {
        &self.backend
    }

    /// Fully qualified backend key for `key`.
    pub fn full_key(&self, key: &StorageKey) -> String {
        format!("{}:{}", self.namespace, key.name())
    }

    /// Inverse of [`Storage::full_key`]. `None` for foreign namespaces and unknown names.
    pub fn parse_full_key(&self, full: &str) -> Option<StorageKey> {
        let name = full
            .strip_prefix(self.namespace.as_str())?
            .strip_prefix(':')?;
        StorageKey::from_name(name)
    }

    /// Raw stored text, or `None` when absent or unreadable.
    pub fn get(&self, key: &StorageKey) -> Option<String> {
        let full = self.full_key(key);
        match self.backend.read(&full) {
            Ok(value) => value,
            Err(e) => {
                warn!(key = %full, error = %e, "storage read failed, treating as absent");
                None
            }
        }
    }

    /// Stores raw text under `key`. Durable once this returns.
    pub fn set(&self, key: &StorageKey, value: &str) -> Result<(), CadenceError> {
        let full = self.full_key(key);
        self.backend.write(&full, value, &self.origin)?;
        debug!(key = %full, bytes = value.len(), "stored");
        Ok(())
    }

    /// Parses the stored JSON under `key`.
    ///
    /// Returns `None` when the key is absent or the stored text does not
    /// parse as `T`; the latter is logged.
    pub fn get_json<T: DeserializeOwned>(&self, key: &StorageKey) -> Option<T> {
        let raw = self.get(key)?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(key = %key, error = %e, "corrupt JSON in storage, treating as absent");
                None
            }
        }
    }

    /// Serializes `value` as JSON and stores it. Returns the stored text.
    pub fn set_json<T: Serialize + ?Sized>(
        &self,
        key: &StorageKey,
        value: &T,
    ) -> Result<String, CadenceError> {
        let raw = serde_json::to_string(value).map_err(|source| CadenceError::Serialization {
            key: key.name().into_owned(),
            source,
        })?;
        self.set(key, &raw)?;
        Ok(raw)
    }

    /// Deletes `key`. Removing an absent key is not an error.
    pub fn remove(&self, key: &StorageKey) -> Result<(), CadenceError> {
        let full = self.full_key(key);
        self.backend.delete(&full, &self.origin)?;
        debug!(key = %full, "removed");
        Ok(())
    }
}

impl std::fmt::Debug for Storage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storage")
            .field("backend", &self.backend.name())
            .field("namespace", &self.namespace)
            .field("origin", &self.origin)
            .finish()
    }
}
