// SPDX-FileCopyrightText: 2026 Vaultkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Account CRUD operations.

use rusqlite::params;
use vaultkeep_core::{Account, NewAccount, VaultkeepError};

use crate::database::{map_tr_err, now_timestamp, Database};

/// Insert an account. A taken login is `AlreadyExists`.
pub async fn create_account(db: &Database, account: &NewAccount) -> Result<String, VaultkeepError> {
    let id = uuid::Uuid::new_v4().to_string();
    let account = account.clone();
    let row_id = id.clone();
    let created_at = now_timestamp();

    let inserted = db
        .write(move |tx| {
            let result = tx.execute(
                "INSERT INTO accounts (id, login, password_hash, wrapped_key, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    row_id,
                    account.login,
                    account.password_hash,
                    account.wrapped_key,
                    created_at,
                ],
            );
            match result {
                Ok(_) => Ok(true),
                Err(e) if is_unique_violation(&e) => Ok(false),
                Err(e) => Err(e),
            }
        })
        .await?;

    if inserted {
        Ok(id)
    } else {
        Err(VaultkeepError::AlreadyExists("login is already taken".to_string()))
    }
}

/// Only the UNIQUE index on `login` means "taken". NOT NULL and primary
/// key failures stay storage errors.
fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

/// Fetch an account by normalized login.
pub async fn get_account_by_login(db: &Database, login: &str) -> Result<Account, VaultkeepError> {
    let login = login.to_string();
    select_account(db, "login", login).await
}

/// Fetch an account by id.
pub async fn get_account_by_id(db: &Database, id: &str) -> Result<Account, VaultkeepError> {
    let id = id.to_string();
    select_account(db, "id", id).await
}

async fn select_account(
    db: &Database,
    column: &'static str,
    value: String,
) -> Result<Account, VaultkeepError> {
    let found = db
        .connection()
        .call(move |conn| {
            let sql = format!(
                "SELECT id, login, password_hash, wrapped_key, created_at
                 FROM accounts WHERE {column} = ?1"
            );
            let result = conn.query_row(&sql, params![value], |row| {
                Ok(Account {
                    id: row.get(0)?,
                    login: row.get(1)?,
                    password_hash: row.get(2)?,
                    wrapped_key: row.get(3)?,
                    created_at: row.get(4)?,
                })
            });
            match result {
                Ok(account) => Ok(Some(account)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(map_tr_err)?;

    found.ok_or_else(|| VaultkeepError::NotFound("account".to_string()))
}
