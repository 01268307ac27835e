// SPDX-FileCopyrightText: 2026 Vaultkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Registration and login.

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use tracing::info;
use vaultkeep_auth::{CredentialHasher, SessionService};
use vaultkeep_core::{NewAccount, VaultStore, VaultkeepError};
use vaultkeep_crypto::KeyCustodian;

/// Lower-case a login the way it is stored.
pub fn normalize_login(login: &str) -> String {
    login.to_lowercase()
}

/// Account creation and authentication.
#[derive(Clone)]
pub struct AccountService {
    store: Arc<dyn VaultStore>,
    hasher: CredentialHasher,
    custodian: Arc<KeyCustodian>,
    sessions: Arc<SessionService>,
}

impl AccountService {
    pub fn new(
        store: Arc<dyn VaultStore>,
        hasher: CredentialHasher,
        custodian: Arc<KeyCustodian>,
        sessions: Arc<SessionService>,
    ) -> Self {
        Self {
            store,
            hasher,
            custodian,
            sessions,
        }
    }

    /// Create an account and return a session token for it.
    pub async fn register(&self, login: &str, password: &SecretString) -> Result<String, VaultkeepError> {
        require_credentials(login, password)?;
        let login = normalize_login(login);

        let password_hash = self.hash_password(owned(password)).await?;
        let account_key = self.custodian.generate_account_key()?;
        let wrapped_key = self.custodian.wrap(&account_key)?;

        let account_id = self
            .store
            .create_account(&NewAccount {
                login: login.clone(),
                password_hash,
                wrapped_key,
            })
            .await?;

        info!(account_id = %account_id, "account registered");
        self.sessions.issue(&account_id, &login)
    }

    /// Check credentials and return a fresh session token.
    pub async fn login(&self, login: &str, password: &SecretString) -> Result<String, VaultkeepError> {
        require_credentials(login, password)?;
        let login = normalize_login(login);

        let account = self.store.get_account_by_login(&login).await?;
        let verified = self
            .verify_password(owned(password), account.password_hash.clone())
            .await?;
        if !verified {
            return Err(VaultkeepError::Unauthenticated(
                "wrong login or password".to_string(),
            ));
        }

        info!(account_id = %account.id, "login succeeded");
        self.sessions.issue(&account.id, &account.login)
    }

    async fn hash_password(&self, password: SecretString) -> Result<String, VaultkeepError> {
        let hasher = self.hasher.clone();
        tokio::task::spawn_blocking(move || hasher.hash(password.expose_secret()))
            .await
            .map_err(|e| VaultkeepError::Internal(format!("hashing task failed: {e}")))?
    }

    async fn verify_password(&self, password: SecretString, digest: String) -> Result<bool, VaultkeepError> {
        let hasher = self.hasher.clone();
        tokio::task::spawn_blocking(move || hasher.verify(password.expose_secret(), &digest))
            .await
            .map_err(|e| VaultkeepError::Internal(format!("verification task failed: {e}")))?
    }
}

/// Copy a secret for a blocking task without exposing it in between.
fn owned(secret: &SecretString) -> SecretString {
    SecretString::from(secret.expose_secret().to_owned())
}

fn require_credentials(login: &str, password: &SecretString) -> Result<(), VaultkeepError> {
    if login.is_empty() {
        return Err(VaultkeepError::InvalidArgument("login must not be empty".to_string()));
    }
    if password.expose_secret().is_empty() {
        return Err(VaultkeepError::InvalidArgument("password must not be empty".to_string()));
    }
    Ok(())
}
