// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Cadence integration tests.
//!
//! # Components
//!
//! - [`TestHarness`] - two tabs over a temp SQLite database with explicit sync
//! - [`MockCompanion`] - companion server with canned JSON answers

pub mod harness;
pub mod mock_companion;

pub use harness::TestHarness;
pub use mock_companion::MockCompanion;
