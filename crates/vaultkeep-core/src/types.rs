// SPDX-FileCopyrightText: 2026 Vaultkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Data model shared by the storage contract, the mediators, and the client.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// Closed set of vault item kinds.
///
/// The wire and storage spelling is SCREAMING_SNAKE_CASE (`BANK_CARD`).
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    AsRefStr,
    EnumIter,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DataType {
    Password,
    Text,
    BankCard,
    File,
}

/// A registered account.
///
/// `wrapped_key` is the hex encoding of the account's secret key sealed under
/// the operator master key. It is written once at registration.
#[derive(Clone, PartialEq, Eq)]
pub struct Account {
    pub id: String,
    /// Lower-cased login.
    pub login: String,
    /// PHC-formatted password digest.
    pub password_hash: String,
    pub wrapped_key: String,
    pub created_at: String,
}

impl std::fmt::Debug for Account {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Account")
            .field("id", &self.id)
            .field("login", &self.login)
            .field("password_hash", &"[REDACTED]")
            .field("wrapped_key", &"[REDACTED]")
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// Input for account creation. The store assigns id and timestamp.
#[derive(Clone)]
pub struct NewAccount {
    pub login: String,
    pub password_hash: String,
    pub wrapped_key: String,
}

impl std::fmt::Debug for NewAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewAccount")
            .field("login", &self.login)
            .finish_non_exhaustive()
    }
}

/// A stored vault item.
///
/// `payload` is `nonce || ciphertext || tag`; `meta` is cleartext JSON.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaultItem {
    pub id: String,
    pub account_id: String,
    pub data_type: DataType,
    pub payload: Vec<u8>,
    pub meta: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Input for item creation. The store assigns id and timestamps.
#[derive(Debug, Clone)]
pub struct NewVaultItem {
    pub data_type: DataType,
    pub payload: Vec<u8>,
    pub meta: String,
}

/// Replacement payload and metadata for an existing item.
#[derive(Debug, Clone)]
pub struct ItemUpdate {
    pub payload: Vec<u8>,
    pub meta: String,
}

/// Listing row: id and cleartext metadata only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemSummary {
    pub id: String,
    pub meta: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn data_type_wire_names() {
        assert_eq!(DataType::Password.to_string(), "PASSWORD");
        assert_eq!(DataType::BankCard.as_ref(), "BANK_CARD");
        assert_eq!(DataType::from_str("FILE").unwrap(), DataType::File);
    }

    #[test]
    fn data_type_rejects_unknown_tag() {
        assert!(DataType::from_str("CRYPTO_WALLET").is_err());
        assert!(DataType::from_str("password").is_err());
    }

    #[test]
    fn data_type_set_is_closed() {
        assert_eq!(DataType::iter().count(), 4);
    }

    #[test]
    fn data_type_serde_matches_display() {
        for dt in DataType::iter() {
            let json = serde_json::to_string(&dt).unwrap();
            assert_eq!(json, format!("\"{dt}\""));
        }
    }

    #[test]
    fn account_debug_redacts_secrets() {
        let account = Account {
            id: "a1".into(),
            login: "alice".into(),
            password_hash: "$argon2id$v=19$secret".into(),
            wrapped_key: "deadbeef".into(),
            created_at: "2026-01-01T00:00:00Z".into(),
        };
        let debug = format!("{account:?}");
        assert!(!debug.contains("argon2id"));
        assert!(!debug.contains("deadbeef"));
        assert!(debug.contains("alice"));
    }
}
