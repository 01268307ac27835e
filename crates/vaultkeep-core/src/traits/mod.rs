// SPDX-FileCopyrightText: 2026 Vaultkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Contracts the mediators require from collaborators.

pub mod storage;

pub use storage::{AccountStore, ItemStore, VaultStore};
