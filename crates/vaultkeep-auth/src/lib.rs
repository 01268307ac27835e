// SPDX-FileCopyrightText: 2026 Vaultkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Credential hashing and session tokens for Vaultkeep.

pub mod password;
pub mod session;

pub use password::CredentialHasher;
pub use session::{Claims, SessionService};
