// SPDX-FileCopyrightText: 2026 Vaultkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end integration testing.
//!
//! `TestHarness` assembles the whole server stack on a temp SQLite database,
//! binds it to an ephemeral localhost port, and hands out clients.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use vaultkeep_auth::{CredentialHasher, SessionService};
use vaultkeep_client::{ClientError, TokenCache, VaultClient};
use vaultkeep_config::model::StorageConfig;
use vaultkeep_core::VaultkeepError;
use vaultkeep_crypto::{KeyCustodian, MasterKey};
use vaultkeep_gateway::{bind, Gateway, GatewayDeps, GatewayOptions};
use vaultkeep_storage::SqliteStorage;

/// Signing secret used by every harness server.
pub const TEST_SIGNING_KEY: &str = "harness-signing-key-0123456789abcdef0123";

/// Master key used by every harness server.
pub const TEST_MASTER_KEY: [u8; 32] = [0x42; 32];

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    session_lifetime: Duration,
    default_deadline: Duration,
    shutdown_grace: Duration,
    session_header: String,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            session_lifetime: Duration::from_secs(600),
            default_deadline: Duration::from_secs(30),
            shutdown_grace: Duration::from_secs(2),
            session_header: "authorization".to_string(),
        }
    }

    /// Set the lifetime of issued session tokens.
    pub fn with_session_lifetime(mut self, lifetime: Duration) -> Self {
        self.session_lifetime = lifetime;
        self
    }

    /// Set the deadline for calls that send none.
    pub fn with_default_deadline(mut self, deadline: Duration) -> Self {
        self.default_deadline = deadline;
        self
    }

    pub fn with_shutdown_grace(mut self, grace: Duration) -> Self {
        self.shutdown_grace = grace;
        self
    }

    pub fn with_session_header(mut self, header: &str) -> Self {
        self.session_header = header.to_string();
        self
    }

    /// Build the stack and start serving.
    pub async fn build(self) -> Result<TestHarness, VaultkeepError> {
        let temp_dir = tempfile::TempDir::new().map_err(VaultkeepError::storage)?;
        let db_path = temp_dir.path().join("vault.db");

        let storage = SqliteStorage::new(StorageConfig {
            database_path: db_path.to_string_lossy().into_owned(),
            wal_mode: true,
        });
        storage.initialize().await?;

        let gateway = Gateway::new(
            GatewayDeps {
                store: Arc::new(storage),
                custodian: Arc::new(KeyCustodian::new(MasterKey::from_bytes(TEST_MASTER_KEY))),
                sessions: Arc::new(SessionService::new(TEST_SIGNING_KEY, self.session_lifetime)?),
                // Lowest cost Argon2id accepts.
                hasher: CredentialHasher::new(8, 1, 1)?,
            },
            GatewayOptions {
                session_header: self.session_header.clone(),
                default_deadline: self.default_deadline,
                shutdown_grace: self.shutdown_grace,
            },
        )?;

        let listener = bind("127.0.0.1:0").await?;
        let addr = listener
            .local_addr()
            .map_err(|e| VaultkeepError::Internal(format!("listener address: {e}")))?;

        let shutdown = CancellationToken::new();
        let server = tokio::spawn(gateway.serve(listener, shutdown.clone()));
        tracing::debug!(%addr, "test harness serving");

        Ok(TestHarness {
            addr,
            session_header: self.session_header,
            shutdown,
            server,
            _temp_dir: temp_dir,
        })
    }
}

/// A running server on a temp database.
pub struct TestHarness {
    addr: SocketAddr,
    session_header: String,
    shutdown: CancellationToken,
    server: JoinHandle<Result<(), VaultkeepError>>,
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Harness with default settings.
    pub async fn start() -> Result<Self, VaultkeepError> {
        Self::builder().build().await
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn server_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// A fresh client with its own in-memory token cache.
    pub fn client(&self) -> Result<VaultClient, ClientError> {
        self.client_with(TokenCache::in_memory())
    }

    /// A client backed by the given token cache.
    pub fn client_with(&self, tokens: TokenCache) -> Result<VaultClient, ClientError> {
        VaultClient::new(self.server_url(), tokens)?.with_session_header(&self.session_header)
    }

    /// A session service sharing the server's signing key, for minting tokens.
    pub fn sessions(&self, lifetime: Duration) -> Result<SessionService, VaultkeepError> {
        SessionService::new(TEST_SIGNING_KEY, lifetime)
    }

    /// Cancel the server and wait for it to drain and close storage.
    pub async fn shutdown(self) -> Result<(), VaultkeepError> {
        self.shutdown.cancel();
        self.server
            .await
            .map_err(|e| VaultkeepError::Internal(format!("server task failed: {e}")))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::SecretString;

    #[tokio::test]
    async fn harness_serves_and_shuts_down() {
        let harness = TestHarness::start().await.unwrap();
        let client = harness.client().unwrap();
        client
            .register("harness", &SecretString::from("pw".to_owned()))
            .await
            .unwrap();
        assert!(client.is_logged_in());
        harness.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn custom_session_header_is_honored() {
        let harness = TestHarness::builder()
            .with_session_header("x-vault-session")
            .build()
            .await
            .unwrap();
        let client = harness.client().unwrap();
        client
            .register("bob", &SecretString::from("pw".to_owned()))
            .await
            .unwrap();
        assert!(client.get_all_by_type(vaultkeep_core::DataType::Text).await.unwrap().is_empty());
        harness.shutdown().await.unwrap();
    }
}
