// SPDX-FileCopyrightText: 2026 Vaultkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Vaultkeep server and client.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Vaultkeep configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct VaultkeepConfig {
    /// RPC listener settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Operator key material.
    #[serde(default)]
    pub keys: KeyConfig,

    /// Session token settings.
    #[serde(default)]
    pub session: SessionConfig,

    /// Argon2id password hashing cost.
    #[serde(default)]
    pub password: PasswordConfig,

    /// Log output settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Client-side settings used by the CLI subcommands.
    #[serde(default)]
    pub client: ClientConfig,
}

/// RPC listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Address to bind the server to.
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Port to bind.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Deadline applied to calls that do not send their own.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// How long in-flight calls may run after shutdown begins.
    #[serde(default = "default_shutdown_grace_secs")]
    pub shutdown_grace_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
            request_timeout_secs: default_request_timeout_secs(),
            shutdown_grace_secs: default_shutdown_grace_secs(),
        }
    }
}

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_shutdown_grace_secs() -> u64 {
    10
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("vaultkeep").join("vaultkeep.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("vaultkeep.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

/// Operator key material.
///
/// Debug output omits the key.
#[derive(Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct KeyConfig {
    /// Hex-encoded 32-byte master key that wraps every account key.
    #[serde(default)]
    pub master_key: Option<String>,
}

impl std::fmt::Debug for KeyConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyConfig")
            .field("master_key", &self.master_key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Session token configuration.
#[derive(Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SessionConfig {
    /// HMAC secret used to sign session tokens (at least 32 characters).
    #[serde(default)]
    pub signing_key: Option<String>,

    /// Token lifetime in minutes.
    #[serde(default = "default_lifetime_minutes")]
    pub lifetime_minutes: u64,

    /// Request header carrying the bearer token.
    #[serde(default = "default_session_header")]
    pub header: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            signing_key: None,
            lifetime_minutes: default_lifetime_minutes(),
            header: default_session_header(),
        }
    }
}

impl std::fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionConfig")
            .field("signing_key", &self.signing_key.as_ref().map(|_| "[REDACTED]"))
            .field("lifetime_minutes", &self.lifetime_minutes)
            .field("header", &self.header)
            .finish()
    }
}

fn default_lifetime_minutes() -> u64 {
    60
}

fn default_session_header() -> String {
    "authorization".to_string()
}

/// Argon2id password hashing configuration.
///
/// Defaults follow the OWASP minimum for Argon2id (19 MiB, 2 passes, 1 lane).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PasswordConfig {
    /// Memory cost in KiB.
    #[serde(default = "default_memory_cost")]
    pub memory_cost: u32,

    /// Iteration count.
    #[serde(default = "default_iterations")]
    pub iterations: u32,

    /// Parallelism lanes.
    #[serde(default = "default_parallelism")]
    pub parallelism: u32,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            memory_cost: default_memory_cost(),
            iterations: default_iterations(),
            parallelism: default_parallelism(),
        }
    }
}

fn default_memory_cost() -> u32 {
    19456
}

fn default_iterations() -> u32 {
    2
}

fn default_parallelism() -> u32 {
    1
}

/// Log output configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Client-side configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    /// Base URL of the Vaultkeep server.
    #[serde(default = "default_server_url")]
    pub server_url: String,

    /// File where the current session token is cached.
    #[serde(default = "default_token_path")]
    pub token_path: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            token_path: default_token_path(),
        }
    }
}

fn default_server_url() -> String {
    "http://127.0.0.1:8080".to_string()
}

fn default_token_path() -> String {
    dirs::config_dir()
        .map(|p| p.join("vaultkeep").join("session.token"))
        .unwrap_or_else(|| std::path::PathBuf::from("session.token"))
        .to_string_lossy()
        .into_owned()
}
