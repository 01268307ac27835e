// SPDX-FileCopyrightText: 2026 Vaultkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Vaultkeep secrets vault.
//!
//! Holds the error taxonomy, the data model, and the storage contract that
//! the gateway mediators are written against.

pub mod error;
pub mod rpc;
pub mod traits;
pub mod types;

pub use error::VaultkeepError;
pub use rpc::RpcCode;
pub use traits::{AccountStore, ItemStore, VaultStore};
pub use types::{Account, DataType, ItemSummary, ItemUpdate, NewAccount, NewVaultItem, VaultItem};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn internal_classification() {
        assert!(VaultkeepError::Crypto("rng".into()).is_internal());
        assert!(VaultkeepError::Authentication.is_internal());
        assert!(VaultkeepError::storage(std::io::Error::other("disk")).is_internal());
        assert!(VaultkeepError::Internal("x".into()).is_internal());

        assert!(!VaultkeepError::InvalidSession.is_internal());
        assert!(!VaultkeepError::NotFound("item".into()).is_internal());
        assert!(!VaultkeepError::AlreadyExists("login".into()).is_internal());
        assert!(!VaultkeepError::InvalidArgument("id".into()).is_internal());
        assert!(!VaultkeepError::Unauthenticated("pw".into()).is_internal());
    }

    #[test]
    fn invalid_session_display_names_no_reason() {
        assert_eq!(VaultkeepError::InvalidSession.to_string(), "invalid session");
    }

    #[test]
    fn all_store_traits_are_exported() {
        fn _assert_vault_store<T: VaultStore>() {}
        fn _assert_account_store<T: AccountStore>() {}
        fn _assert_item_store<T: ItemStore>() {}
    }
}
