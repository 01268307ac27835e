// SPDX-FileCopyrightText: 2026 Vaultkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query modules for accounts and owner-scoped vault items.

pub mod accounts;
pub mod items;
