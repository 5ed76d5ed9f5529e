// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait definitions implemented by the storage crate.

pub mod backend;

pub use backend::KeyValueBackend;
