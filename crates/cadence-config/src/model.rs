// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for Cadence.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup.

use serde::{Deserialize, Serialize};

/// Top-level Cadence configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CadenceConfig {
    /// Local document store settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Cross-handle change watching.
    #[serde(default)]
    pub sync: SyncConfig,

    /// Companion HTTP API (billing and calendar proxy).
    #[serde(default)]
    pub companion: CompanionConfig,

    /// Logging settings.
    #[serde(default)]
    pub log: LogConfig,
}

/// Local document store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,

    /// Prefix prepended to every document key (`<namespace>:<key>`).
    #[serde(default = "default_namespace")]
    pub namespace: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
            namespace: default_namespace(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("cadence").join("cadence.db"))
        .and_then(|p| p.to_str().map(String::from))
        .unwrap_or_else(|| "cadence.db".to_string())
}

fn default_wal_mode() -> bool {
    true
}

fn default_namespace() -> String {
    "cadence".to_string()
}

/// Change watcher configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SyncConfig {
    /// How often the watcher polls the change log, in milliseconds.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

fn default_poll_interval_ms() -> u64 {
    500
}

/// Companion API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CompanionConfig {
    /// Base URL of the companion server, without a trailing slash.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Seconds between email-verification status checks.
    #[serde(default = "default_verification_poll_secs")]
    pub verification_poll_secs: u64,

    /// Upper bound on verification status checks before giving up.
    #[serde(default = "default_verification_max_attempts")]
    pub verification_max_attempts: u32,
}

impl Default for CompanionConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            verification_poll_secs: default_verification_poll_secs(),
            verification_max_attempts: default_verification_max_attempts(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:3001".to_string()
}

fn default_verification_poll_secs() -> u64 {
    5
}

fn default_verification_max_attempts() -> u32 {
    60
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LogConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
