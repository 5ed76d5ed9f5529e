// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Embedded schema migrations using refinery.
//!
//! SQL files under `migrations/` are compiled into the binary and applied on
//! open. These cover the database schema only; document payload versions are
//! handled by [`crate::document::MigrationTable`].

use cadence_core::CadenceError;

mod embedded {
    use refinery::embed_migrations;
    embed_migrations!("migrations");
}

/// Run all pending schema migrations against the given connection.
pub fn run_migrations(conn: &mut rusqlite::Connection) -> Result<(), CadenceError> {
    embedded::migrations::runner()
        .run(conn)
        .map_err(CadenceError::storage)?;
    Ok(())
}
