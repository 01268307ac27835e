// SPDX-FileCopyrightText: 2026 Vaultkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Vault item operations.
//!
//! Every statement that touches an existing row filters on both `id` and
//! `account_id`, so another owner's row is indistinguishable from no row.
//! Mutations go through [`Database::write`] and are dropped with the request.

use std::str::FromStr;

use rusqlite::params;
use vaultkeep_core::{DataType, ItemSummary, ItemUpdate, NewVaultItem, VaultItem, VaultkeepError};

use crate::database::{map_tr_err, now_timestamp, Database};

fn not_found() -> VaultkeepError {
    VaultkeepError::NotFound("item".to_string())
}

/// Insert an item for `owner_id`.
pub async fn create_item(
    db: &Database,
    owner_id: &str,
    item: &NewVaultItem,
) -> Result<String, VaultkeepError> {
    let id = uuid::Uuid::new_v4().to_string();
    let row_id = id.clone();
    let owner_id = owner_id.to_string();
    let data_type = item.data_type.to_string();
    let payload = item.payload.clone();
    let meta = item.meta.clone();
    let now = now_timestamp();

    db.write(move |tx| {
        tx.execute(
            "INSERT INTO vault_items (id, account_id, data_type, payload, meta, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
            params![row_id, owner_id, data_type, payload, meta, now],
        )?;
        Ok(())
    })
    .await?;

    Ok(id)
}

/// Fetch `(id, owner_id)`.
pub async fn get_item(db: &Database, id: &str, owner_id: &str) -> Result<VaultItem, VaultkeepError> {
    let id = id.to_string();
    let owner_id = owner_id.to_string();
    let found = db
        .connection()
        .call(move |conn| {
            let result = conn.query_row(
                "SELECT id, account_id, data_type, payload, meta, created_at, updated_at
                 FROM vault_items WHERE id = ?1 AND account_id = ?2",
                params![id, owner_id],
                |row| {
                    let tag: String = row.get(2)?;
                    let data_type = DataType::from_str(&tag).map_err(|e| {
                        rusqlite::Error::FromSqlConversionFailure(
                            2,
                            rusqlite::types::Type::Text,
                            Box::new(e),
                        )
                    })?;
                    Ok(VaultItem {
                        id: row.get(0)?,
                        account_id: row.get(1)?,
                        data_type,
                        payload: row.get(3)?,
                        meta: row.get(4)?,
                        created_at: row.get(5)?,
                        updated_at: row.get(6)?,
                    })
                },
            );
            match result {
                Ok(item) => Ok(Some(item)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(map_tr_err)?;

    found.ok_or_else(not_found)
}

/// List `(id, meta)` of `owner_id`'s items of one type, oldest first.
pub async fn list_items_by_type(
    db: &Database,
    owner_id: &str,
    data_type: DataType,
) -> Result<Vec<ItemSummary>, VaultkeepError> {
    let owner_id = owner_id.to_string();
    let data_type = data_type.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, meta FROM vault_items
                 WHERE account_id = ?1 AND data_type = ?2
                 ORDER BY created_at, rowid",
            )?;
            let rows = stmt.query_map(params![owner_id, data_type], |row| {
                Ok(ItemSummary {
                    id: row.get(0)?,
                    meta: row.get(1)?,
                })
            })?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(map_tr_err)
}

/// Replace payload and meta of `(id, owner_id)`.
pub async fn update_item(
    db: &Database,
    id: &str,
    owner_id: &str,
    update: &ItemUpdate,
) -> Result<(), VaultkeepError> {
    let id = id.to_string();
    let owner_id = owner_id.to_string();
    let payload = update.payload.clone();
    let meta = update.meta.clone();
    let now = now_timestamp();

    let affected = db
        .write(move |tx| {
            tx.execute(
                "UPDATE vault_items SET payload = ?1, meta = ?2, updated_at = ?3
                 WHERE id = ?4 AND account_id = ?5",
                params![payload, meta, now, id, owner_id],
            )
        })
        .await?;

    if affected == 1 { Ok(()) } else { Err(not_found()) }
}

/// Delete `(id, owner_id)`.
pub async fn delete_item(db: &Database, id: &str, owner_id: &str) -> Result<(), VaultkeepError> {
    let id = id.to_string();
    let owner_id = owner_id.to_string();
    let affected = db
        .write(move |tx| {
            tx.execute(
                "DELETE FROM vault_items WHERE id = ?1 AND account_id = ?2",
                params![id, owner_id],
            )
        })
        .await?;

    if affected == 1 { Ok(()) } else { Err(not_found()) }
}
