// SPDX-FileCopyrightText: 2026 Vaultkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! AES-256-GCM payload cipher and envelope key custody for Vaultkeep.
//!
//! Every account owns a random 256-bit key. That key encrypts the account's
//! vault payloads and is itself stored only after being sealed under the
//! operator master key, which lives in memory for the life of the process.

pub mod cipher;
pub mod custody;

pub use cipher::{generate_key, open, seal, KEY_LEN, NONCE_LEN, TAG_LEN};
pub use custody::{AccountKey, KeyCustodian, MasterKey};
