// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for Cadence, the creator dashboard data layer.
//!
//! This crate provides the error type, the closed set of storage keys and
//! event topics, and the key/value backend trait that the storage crate
//! implements. Everything else in the workspace builds on these.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::CadenceError;
pub use traits::KeyValueBackend;
pub use types::{ChangeRecord, StorageKey, Topic, UserId};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cadence_error_has_all_variants() {
        let _config = CadenceError::Config("test".into());
        let _storage = CadenceError::Storage {
            source: Box::new(std::io::Error::other("test")),
        };
        let _serde = CadenceError::Serialization {
            key: "plannerData".into(),
            source: serde_json::from_str::<u8>("x").unwrap_err(),
        };
        let _validation = CadenceError::Validation("test".into());
        let _not_found = CadenceError::NotFound {
            kind: "brand",
            id: "b-1".into(),
        };
        let _protected = CadenceError::ProtectedColumn("brandName".into());
        let _api = CadenceError::Api {
            status: 400,
            message: "bad".into(),
        };
        let _http = CadenceError::Http {
            message: "refused".into(),
            source: None,
        };
        let _timeout = CadenceError::Timeout {
            duration: std::time::Duration::from_secs(5),
        };
        let _internal = CadenceError::Internal("test".into());
    }

    #[test]
    fn backend_trait_is_object_safe() {
        fn _assert_dyn(_: &dyn KeyValueBackend) {}
    }
}
