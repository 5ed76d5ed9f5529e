// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Key/value backend trait for durable document storage.

use crate::error::CadenceError;
use crate::types::ChangeRecord;

/// A durable string key/value store with an ordered change log.
///
/// Every successful `write` or `delete` appends one entry to the change log,
/// tagged with the origin of the handle that performed it. Watchers use the
/// log to learn about writes made by other handles sharing the same backend.
///
/// All calls are synchronous: a write has completed durably when it returns.
pub trait KeyValueBackend: Send + Sync + 'static {
    /// Returns the human-readable name of this backend.
    fn name(&self) -> &str;

    /// Reads the raw value stored under `key`.
    fn read(&self, key: &str) -> Result<Option<String>, CadenceError>;

    /// Stores `value` under `key`, replacing any previous value.
    fn write(&self, key: &str, value: &str, origin: &str) -> Result<(), CadenceError>;

    /// Removes `key`. Removing an absent key is not an error.
    fn delete(&self, key: &str, origin: &str) -> Result<(), CadenceError>;

    /// Returns the sequence number of the newest change log entry, or 0.
    fn latest_change(&self) -> Result<i64, CadenceError>;

    /// Returns change log entries with a sequence number greater than `after`,
    /// oldest first, joined with the value currently stored under each key.
    fn changes_since(&self, after: i64) -> Result<Vec<ChangeRecord>, CadenceError>;

    /// Returns every stored `(key, value)` whose key starts with `prefix`,
    /// ordered by key.
    fn entries(&self, prefix: &str) -> Result<Vec<(String, String)>, CadenceError>;
}
