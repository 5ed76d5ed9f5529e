// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Versioned documents and payload migrations.
//!
//! Every document is stored as an envelope `{"version": N, "data": ...}`.
//! Values written before envelopes existed (any JSON that is not an object
//! holding exactly `version` and `data`) are read as version 1.
//!
//! Upgrades go through a [`MigrationTable`] keyed by `(from, to)`. Loading a
//! document walks the table up to [`Document::VERSION`] and writes the
//! upgraded envelope back, so each migration runs once per stored value.

use std::collections::BTreeMap;

use cadence_core::{CadenceError, StorageKey};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, warn};

use crate::accessor::Storage;

/// Version assigned to values stored without an envelope.
pub const LEGACY_VERSION: u32 = 1;

/// A persisted, whole-value document.
pub trait Document: Serialize + DeserializeOwned + Default + Clone + Send + Sync + 'static {
    /// Current payload schema version.
    const VERSION: u32 = 1;

    /// Upgrades from older payload versions.
    fn migrations() -> MigrationTable {
        MigrationTable::new()
    }
}

impl<T> Document for Vec<T> where T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {}

/// A payload upgrade step.
pub type MigrationFn = fn(Value) -> Result<Value, String>;

/// Payload upgrade steps keyed by `(from_version, to_version)`.
#[derive(Default, Clone)]
pub struct MigrationTable {
    steps: BTreeMap<(u32, u32), MigrationFn>,
}

impl MigrationTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the step upgrading `from` to `to`. `to` must be greater than `from`.
    pub fn register(mut self, from: u32, to: u32, step: MigrationFn) -> Self {
        debug_assert!(to > from, "migrations only move forward");
        self.steps.insert((from, to), step);
        self
    }

    /// Upgrades `value` from version `from` to version `to`.
    ///
    /// At each version the step with the furthest target not beyond `to` is
    /// taken, so a direct `(1, 3)` step wins over `(1, 2)` then `(2, 3)`.
    pub fn migrate(&self, from: u32, to: u32, mut value: Value) -> Result<Value, DocumentError> {
        let mut current = from;
        while current < to {
            let (&(_, next), step) = self
                .steps
                .range((current, current + 1)..=(current, to))
                .next_back()
                .ok_or(DocumentError::MissingMigration { from: current, to })?;
            value = step(value).map_err(|message| DocumentError::Migration {
                from: current,
                to: next,
                message,
            })?;
            current = next;
        }
        Ok(value)
    }
}

/// Why a stored value could not be decoded.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("stored value is not valid JSON: {0}")]
    Parse(#[source] serde_json::Error),

    #[error("payload does not match the document shape: {0}")]
    Shape(#[source] serde_json::Error),

    #[error("stored version {found} is newer than supported version {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },

    #[error("no migration registered from version {from} towards {to}")]
    MissingMigration { from: u32, to: u32 },

    #[error("migration {from} -> {to} failed: {message}")]
    Migration { from: u32, to: u32, message: String },
}

/// A decoded document plus whether it had to be upgraded.
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded<D> {
    pub document: D,
    pub migrated_from: Option<u32>,
}

/// Splits stored JSON into `(version, payload)`.
fn split_envelope(value: Value) -> (u32, Value) {
    match value {
        Value::Object(mut map) if is_envelope(&map) => {
            let version = map
                .get("version")
                .and_then(Value::as_u64)
                .and_then(|v| u32::try_from(v).ok())
                .unwrap_or(LEGACY_VERSION);
            let data = map.remove("data").unwrap_or(Value::Null);
            (version, data)
        }
        other => (LEGACY_VERSION, other),
    }
}

fn is_envelope(map: &Map<String, Value>) -> bool {
    map.len() == 2 && map.get("version").is_some_and(Value::is_u64) && map.contains_key("data")
}

/// Decodes raw stored text into `D`, applying migrations as needed.
pub fn decode<D: Document>(raw: &str) -> Result<Decoded<D>, DocumentError> {
    let value: Value = serde_json::from_str(raw).map_err(DocumentError::Parse)?;
    let (version, payload) = split_envelope(value);

    if version > D::VERSION {
        return Err(DocumentError::UnsupportedVersion {
            found: version,
            supported: D::VERSION,
        });
    }

    let (payload, migrated_from) = if version < D::VERSION {
        (D::migrations().migrate(version, D::VERSION, payload)?, Some(version))
    } else {
        (payload, None)
    };

    let document = serde_json::from_value(payload).map_err(DocumentError::Shape)?;
    Ok(Decoded {
        document,
        migrated_from,
    })
}

/// Encodes `document` in a current-version envelope.
pub fn encode<D: Document>(document: &D) -> Result<String, serde_json::Error> {
    #[derive(Serialize)]
    struct Envelope<'a, T> {
        version: u32,
        data: &'a T,
    }

    serde_json::to_string(&Envelope {
        version: D::VERSION,
        data: document,
    })
}

impl Storage {
    /// Reads the document under `key`, falling back to `D::default()`.
    ///
    /// Absent, corrupt, or too-new values yield the default (logged). A value
    /// that needed migration is written back in its upgraded form.
    pub fn load_document<D: Document>(&self, key: &StorageKey) -> D {
        let Some(raw) = self.get(key) else {
            return D::default();
        };
        match decode::<D>(&raw) {
            Ok(Decoded {
                document,
                migrated_from: Some(from),
            }) => {
                debug!(key = %key, from, to = D::VERSION, "document migrated");
                if let Err(e) = self.save_document(key, &document) {
                    warn!(key = %key, error = %e, "failed to persist migrated document");
                }
                document
            }
            Ok(decoded) => decoded.document,
            Err(e) => {
                warn!(key = %key, error = %e, "unreadable document, using default");
                D::default()
            }
        }
    }

    /// Writes `document` in a current-version envelope. Returns the stored text.
    pub fn save_document<D: Document>(
        &self,
        key: &StorageKey,
        document: &D,
    ) -> Result<String, CadenceError> {
        let raw = encode(document).map_err(|source| CadenceError::Serialization {
            key: key.name().into_owned(),
            source,
        })?;
        self.set(key, &raw)?;
        Ok(raw)
    }
}
