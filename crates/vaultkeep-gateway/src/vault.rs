// SPDX-FileCopyrightText: 2026 Vaultkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Owner-scoped vault item operations.
//!
//! Every method takes the caller's [`Identity`]; its account id is the only
//! owner id ever passed to the store, and its key the only key used.

use std::str::FromStr;
use std::sync::Arc;

use tracing::debug;
use vaultkeep_core::{DataType, ItemSummary, ItemUpdate, NewVaultItem, VaultStore, VaultkeepError};

use crate::pipeline::Identity;

/// A decrypted item as returned to its owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenedItem {
    pub data_type: DataType,
    pub payload: Vec<u8>,
    pub meta: String,
}

/// Create, read, list, update, and delete for the caller's own items.
#[derive(Clone)]
pub struct VaultService {
    store: Arc<dyn VaultStore>,
}

impl VaultService {
    pub fn new(store: Arc<dyn VaultStore>) -> Self {
        Self { store }
    }

    /// Encrypt and store a new item. Returns its id.
    pub async fn add(
        &self,
        identity: &Identity,
        data_type: &str,
        payload: &[u8],
        meta: &str,
    ) -> Result<String, VaultkeepError> {
        let data_type = parse_data_type(data_type)?;
        let meta = normalize_meta(meta)?;
        let sealed = identity.key.seal(payload)?;

        let id = self
            .store
            .create_item(
                &identity.account_id,
                &NewVaultItem {
                    data_type,
                    payload: sealed,
                    meta,
                },
            )
            .await?;
        debug!(account_id = %identity.account_id, item_id = %id, %data_type, "item created");
        Ok(id)
    }

    /// Fetch and decrypt one of the caller's items.
    pub async fn get(&self, identity: &Identity, id: &str) -> Result<OpenedItem, VaultkeepError> {
        require_id(id)?;
        let item = self.store.get_item(id, &identity.account_id).await?;
        let payload = identity.key.open(&item.payload)?;
        Ok(OpenedItem {
            data_type: item.data_type,
            payload,
            meta: item.meta,
        })
    }

    /// List id and metadata of the caller's items of one type.
    pub async fn list_by_type(
        &self,
        identity: &Identity,
        data_type: &str,
    ) -> Result<Vec<ItemSummary>, VaultkeepError> {
        let data_type = parse_data_type(data_type)?;
        self.store
            .list_items_by_type(&identity.account_id, data_type)
            .await
    }

    /// Re-encrypt and replace one of the caller's items.
    pub async fn update(
        &self,
        identity: &Identity,
        id: &str,
        payload: &[u8],
        meta: &str,
    ) -> Result<(), VaultkeepError> {
        require_id(id)?;
        let meta = normalize_meta(meta)?;
        let sealed = identity.key.seal(payload)?;
        self.store
            .update_item(
                id,
                &identity.account_id,
                &ItemUpdate {
                    payload: sealed,
                    meta,
                },
            )
            .await?;
        debug!(account_id = %identity.account_id, item_id = %id, "item updated");
        Ok(())
    }

    /// Delete one of the caller's items.
    pub async fn delete(&self, identity: &Identity, id: &str) -> Result<(), VaultkeepError> {
        require_id(id)?;
        self.store.delete_item(id, &identity.account_id).await?;
        debug!(account_id = %identity.account_id, item_id = %id, "item deleted");
        Ok(())
    }
}

fn parse_data_type(tag: &str) -> Result<DataType, VaultkeepError> {
    DataType::from_str(tag)
        .map_err(|_| VaultkeepError::InvalidArgument(format!("unknown data type `{tag}`")))
}

fn require_id(id: &str) -> Result<(), VaultkeepError> {
    if id.trim().is_empty() {
        return Err(VaultkeepError::InvalidArgument("item id must not be empty".to_string()));
    }
    Ok(())
}

/// Metadata must be a JSON document. Empty metadata is stored as `{}`.
fn normalize_meta(meta: &str) -> Result<String, VaultkeepError> {
    if meta.trim().is_empty() {
        return Ok("{}".to_string());
    }
    serde_json::from_str::<serde_json::Value>(meta)
        .map_err(|e| VaultkeepError::InvalidArgument(format!("meta is not valid JSON: {e}")))?;
    Ok(meta.to_string())
}
