// SPDX-FileCopyrightText: 2026 Vaultkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage contract for accounts and owner-scoped vault items.
//!
//! Implementations must report a duplicate login as
//! [`VaultkeepError::AlreadyExists`] and a missing row as
//! [`VaultkeepError::NotFound`]. Every item operation takes the owning
//! account id and must filter on it in the same statement as the item id.

use async_trait::async_trait;

use crate::error::VaultkeepError;
use crate::types::{Account, DataType, ItemSummary, ItemUpdate, NewAccount, NewVaultItem, VaultItem};

/// Account persistence.
#[async_trait]
pub trait AccountStore: Send + Sync + 'static {
    /// Insert a new account and return its id.
    async fn create_account(&self, account: &NewAccount) -> Result<String, VaultkeepError>;

    /// Fetch an account by its lower-cased login.
    async fn get_account_by_login(&self, login: &str) -> Result<Account, VaultkeepError>;

    /// Fetch an account by id.
    async fn get_account_by_id(&self, id: &str) -> Result<Account, VaultkeepError>;
}

/// Vault item persistence, always scoped by owner.
#[async_trait]
pub trait ItemStore: Send + Sync + 'static {
    /// Insert an item owned by `owner_id` and return its id.
    async fn create_item(&self, owner_id: &str, item: &NewVaultItem) -> Result<String, VaultkeepError>;

    /// Fetch one item by `(id, owner_id)`.
    async fn get_item(&self, id: &str, owner_id: &str) -> Result<VaultItem, VaultkeepError>;

    /// List `(id, meta)` for every item of `data_type` owned by `owner_id`.
    async fn list_items_by_type(
        &self,
        owner_id: &str,
        data_type: DataType,
    ) -> Result<Vec<ItemSummary>, VaultkeepError>;

    /// Replace payload and metadata of `(id, owner_id)`. Exactly one row or NotFound.
    async fn update_item(
        &self,
        id: &str,
        owner_id: &str,
        update: &ItemUpdate,
    ) -> Result<(), VaultkeepError>;

    /// Delete `(id, owner_id)`. Exactly one row or NotFound.
    async fn delete_item(&self, id: &str, owner_id: &str) -> Result<(), VaultkeepError>;
}

/// Full storage contract plus lifecycle.
#[async_trait]
pub trait VaultStore: AccountStore + ItemStore {
    /// Cheap liveness probe.
    async fn health_check(&self) -> Result<(), VaultkeepError>;

    /// Flush pending writes and release connections.
    async fn close(&self) -> Result<(), VaultkeepError>;
}
