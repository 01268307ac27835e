// SPDX-FileCopyrightText: 2026 Vaultkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Client for the Vaultkeep secrets vault.
//!
//! Wraps the RPC surface, keeps the session token in a [`TokenCache`], and
//! offers typed helpers for the four item kinds.

pub mod client;
pub mod error;
pub mod models;
pub mod token;

pub use client::VaultClient;
pub use error::ClientError;
pub use models::{BankCardData, BankCardMeta, FileMeta, Item, PasswordMeta, RawItem, TextMeta};
pub use token::TokenCache;
