// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for Cadence.

use thiserror::Error;

/// The primary error type used across storage, sync, and feature operations.
#[derive(Debug, Error)]
pub enum CadenceError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure, migration).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A document could not be encoded for writing.
    #[error("failed to serialize `{key}`: {source}")]
    Serialization {
        key: String,
        source: serde_json::Error,
    },

    /// Input rejected before any write happened.
    #[error("validation error: {0}")]
    Validation(String),

    /// A record addressed by id does not exist in the current document.
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    /// Attempt to delete a built-in collab table column.
    #[error("column `{0}` is protected and cannot be deleted")]
    ProtectedColumn(String),

    /// The companion API answered with a non-2xx status.
    #[error("api error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Transport-level HTTP failure (connect, body read, decode).
    #[error("http error: {message}")]
    Http {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl CadenceError {
    /// Wrap any backend error as a storage error.
    pub fn storage<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        CadenceError::Storage {
            source: Box::new(err),
        }
    }

    /// Text suitable for a user-facing toast.
    pub fn user_message(&self) -> String {
        match self {
            CadenceError::Api { message, .. } => message.clone(),
            CadenceError::Validation(message) => message.clone(),
            CadenceError::ProtectedColumn(key) => format!("The `{key}` column can't be removed"),
            other => other.to_string(),
        }
    }
}
