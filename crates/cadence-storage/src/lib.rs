// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Local document store for Cadence.
//!
//! Provides a SQLite key/value backend (WAL mode, embedded schema migrations,
//! change log), an in-memory backend with the same semantics, the typed
//! [`Storage`] accessor, versioned documents with payload migrations, and a
//! watcher that republishes writes made by other handles.

pub mod accessor;
pub mod database;
pub mod document;
pub mod memory;
pub mod migrations;
pub mod watcher;

pub use accessor::Storage;
pub use database::SqliteBackend;
pub use document::{decode, encode, Decoded, Document, DocumentError, MigrationTable};
pub use memory::MemoryBackend;
pub use watcher::{spawn_watcher, StorageWatcher};
