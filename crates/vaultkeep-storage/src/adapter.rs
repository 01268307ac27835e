// SPDX-FileCopyrightText: 2026 Vaultkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the `VaultStore` contract.

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::debug;

use vaultkeep_config::model::StorageConfig;
use vaultkeep_core::{
    Account, AccountStore, DataType, ItemStore, ItemSummary, ItemUpdate, NewAccount, NewVaultItem,
    VaultItem, VaultStore, VaultkeepError,
};

use crate::database::{map_tr_err, Database};
use crate::queries;

/// SQLite-backed vault store.
///
/// The database is opened by [`SqliteStorage::initialize`]; every other call
/// before that fails with a storage error.
pub struct SqliteStorage {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStorage {
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    /// Open the database and apply migrations.
    pub async fn initialize(&self) -> Result<(), VaultkeepError> {
        let db = Database::open(&self.config.database_path, self.config.wal_mode).await?;
        self.db.set(db).map_err(|_| VaultkeepError::Storage {
            source: "storage already initialized".into(),
        })?;
        debug!(path = %self.config.database_path, "SQLite storage initialized");
        Ok(())
    }

    fn db(&self) -> Result<&Database, VaultkeepError> {
        self.db.get().ok_or_else(|| VaultkeepError::Storage {
            source: "storage not initialized -- call initialize() first".into(),
        })
    }
}

#[async_trait]
impl AccountStore for SqliteStorage {
    async fn create_account(&self, account: &NewAccount) -> Result<String, VaultkeepError> {
        queries::accounts::create_account(self.db()?, account).await
    }

    async fn get_account_by_login(&self, login: &str) -> Result<Account, VaultkeepError> {
        queries::accounts::get_account_by_login(self.db()?, login).await
    }

    async fn get_account_by_id(&self, id: &str) -> Result<Account, VaultkeepError> {
        queries::accounts::get_account_by_id(self.db()?, id).await
    }
}

#[async_trait]
impl ItemStore for SqliteStorage {
    async fn create_item(&self, owner_id: &str, item: &NewVaultItem) -> Result<String, VaultkeepError> {
        queries::items::create_item(self.db()?, owner_id, item).await
    }

    async fn get_item(&self, id: &str, owner_id: &str) -> Result<VaultItem, VaultkeepError> {
        queries::items::get_item(self.db()?, id, owner_id).await
    }

    async fn list_items_by_type(
        &self,
        owner_id: &str,
        data_type: DataType,
    ) -> Result<Vec<ItemSummary>, VaultkeepError> {
        queries::items::list_items_by_type(self.db()?, owner_id, data_type).await
    }

    async fn update_item(
        &self,
        id: &str,
        owner_id: &str,
        update: &ItemUpdate,
    ) -> Result<(), VaultkeepError> {
        queries::items::update_item(self.db()?, id, owner_id, update).await
    }

    async fn delete_item(&self, id: &str, owner_id: &str) -> Result<(), VaultkeepError> {
        queries::items::delete_item(self.db()?, id, owner_id).await
    }
}

#[async_trait]
impl VaultStore for SqliteStorage {
    async fn health_check(&self) -> Result<(), VaultkeepError> {
        self.db()?
            .connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)
    }

    async fn close(&self) -> Result<(), VaultkeepError> {
        let Some(db) = self.db.get() else {
            return Ok(());
        };
        db.connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        debug!("WAL checkpoint complete");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn storage() -> (SqliteStorage, TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let config = StorageConfig {
            database_path: dir.path().join("vault.db").to_string_lossy().into_owned(),
            wal_mode: true,
        };
        let storage = SqliteStorage::new(config);
        storage.initialize().await.unwrap();
        (storage, dir)
    }

    fn new_account(login: &str) -> NewAccount {
        NewAccount {
            login: login.to_string(),
            password_hash: "$argon2id$v=19$m=8,t=1,p=1$c2FsdA$aGFzaA".to_string(),
            wrapped_key: "ab".repeat(60),
        }
    }

    fn new_item(data_type: DataType, payload: &[u8], meta: &str) -> NewVaultItem {
        NewVaultItem {
            data_type,
            payload: payload.to_vec(),
            meta: meta.to_string(),
        }
    }

    #[tokio::test]
    async fn uninitialized_storage_errors() {
        let storage = SqliteStorage::new(StorageConfig::default());
        assert!(matches!(
            storage.get_account_by_id("x").await,
            Err(VaultkeepError::Storage { .. })
        ));
        assert!(storage.close().await.is_ok());
    }

    #[tokio::test]
    async fn double_initialize_fails() {
        let (storage, _dir) = storage().await;
        assert!(storage.initialize().await.is_err());
    }

    #[tokio::test]
    async fn account_roundtrip_by_login_and_id() {
        let (storage, _dir) = storage().await;
        let id = storage.create_account(&new_account("alice")).await.unwrap();

        let by_login = storage.get_account_by_login("alice").await.unwrap();
        assert_eq!(by_login.id, id);
        assert_eq!(by_login.wrapped_key, "ab".repeat(60));

        let by_id = storage.get_account_by_id(&id).await.unwrap();
        assert_eq!(by_id, by_login);
    }

    #[tokio::test]
    async fn duplicate_login_is_already_exists() {
        let (storage, _dir) = storage().await;
        storage.create_account(&new_account("alice")).await.unwrap();
        let err = storage.create_account(&new_account("alice")).await.unwrap_err();
        assert!(matches!(err, VaultkeepError::AlreadyExists(_)));
    }

    #[tokio::test]
    async fn missing_account_is_not_found() {
        let (storage, _dir) = storage().await;
        assert!(matches!(
            storage.get_account_by_login("nobody").await,
            Err(VaultkeepError::NotFound(_))
        ));
        assert!(matches!(
            storage.get_account_by_id("nope").await,
            Err(VaultkeepError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn item_crud_for_owner() {
        let (storage, _dir) = storage().await;
        let owner = storage.create_account(&new_account("alice")).await.unwrap();

        let id = storage
            .create_item(&owner, &new_item(DataType::Password, b"\x01\x02", r#"{"resource":"email"}"#))
            .await
            .unwrap();

        let item = storage.get_item(&id, &owner).await.unwrap();
        assert_eq!(item.data_type, DataType::Password);
        assert_eq!(item.payload, b"\x01\x02");
        assert_eq!(item.meta, r#"{"resource":"email"}"#);
        assert_eq!(item.created_at, item.updated_at);

        let update = ItemUpdate {
            payload: b"\x03".to_vec(),
            meta: "{}".to_string(),
        };
        storage.update_item(&id, &owner, &update).await.unwrap();
        let item = storage.get_item(&id, &owner).await.unwrap();
        assert_eq!(item.payload, b"\x03");
        assert_eq!(item.meta, "{}");

        storage.delete_item(&id, &owner).await.unwrap();
        assert!(matches!(
            storage.get_item(&id, &owner).await,
            Err(VaultkeepError::NotFound(_))
        ));
        assert!(matches!(
            storage.delete_item(&id, &owner).await,
            Err(VaultkeepError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn other_owner_sees_not_found() {
        let (storage, _dir) = storage().await;
        let alice = storage.create_account(&new_account("alice")).await.unwrap();
        let bob = storage.create_account(&new_account("bob")).await.unwrap();

        let id = storage
            .create_item(&alice, &new_item(DataType::Text, b"note", "{}"))
            .await
            .unwrap();

        assert!(matches!(storage.get_item(&id, &bob).await, Err(VaultkeepError::NotFound(_))));
        let update = ItemUpdate {
            payload: b"pwned".to_vec(),
            meta: "{}".to_string(),
        };
        assert!(matches!(
            storage.update_item(&id, &bob, &update).await,
            Err(VaultkeepError::NotFound(_))
        ));
        assert!(matches!(
            storage.delete_item(&id, &bob).await,
            Err(VaultkeepError::NotFound(_))
        ));
        assert!(storage.list_items_by_type(&bob, DataType::Text).await.unwrap().is_empty());

        // Alice's row is untouched.
        assert_eq!(storage.get_item(&id, &alice).await.unwrap().payload, b"note");
    }

    #[tokio::test]
    async fn list_filters_by_type_in_creation_order() {
        let (storage, _dir) = storage().await;
        let owner = storage.create_account(&new_account("alice")).await.unwrap();

        let first = storage
            .create_item(&owner, &new_item(DataType::File, b"a", r#"{"name":"a"}"#))
            .await
            .unwrap();
        storage
            .create_item(&owner, &new_item(DataType::Text, b"b", "{}"))
            .await
            .unwrap();
        let second = storage
            .create_item(&owner, &new_item(DataType::File, b"c", r#"{"name":"c"}"#))
            .await
            .unwrap();

        let files = storage.list_items_by_type(&owner, DataType::File).await.unwrap();
        let ids: Vec<&str> = files.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec![first.as_str(), second.as_str()]);
        assert_eq!(files[0].meta, r#"{"name":"a"}"#);
        assert!(storage
            .list_items_by_type(&owner, DataType::BankCard)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn items_require_existing_owner() {
        let (storage, _dir) = storage().await;
        let err = storage
            .create_item("ghost", &new_item(DataType::Text, b"x", "{}"))
            .await
            .unwrap_err();
        assert!(matches!(err, VaultkeepError::Storage { .. }));
    }

    #[tokio::test]
    async fn health_check_and_close() {
        let (storage, _dir) = storage().await;
        storage.health_check().await.unwrap();
        storage.close().await.unwrap();
    }
}
