// SPDX-FileCopyrightText: 2026 Vaultkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence layer for the Vaultkeep secrets vault.
//!
//! WAL-mode SQLite with embedded migrations and a single background
//! connection via `tokio-rusqlite`. [`SqliteStorage`] implements the
//! `VaultStore` contract from `vaultkeep-core`.

pub mod adapter;
pub mod database;
pub mod migrations;
pub mod queries;

pub use adapter::SqliteStorage;
pub use database::Database;
