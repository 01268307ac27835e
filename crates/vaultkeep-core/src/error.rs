// SPDX-FileCopyrightText: 2026 Vaultkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Vaultkeep secrets vault.

use thiserror::Error;

/// The primary error type used across all Vaultkeep crates.
///
/// Variants line up with the outcome categories a caller can observe. The
/// gateway decides which of them reach the caller verbatim and which are
/// collapsed into an opaque internal error.
#[derive(Debug, Error)]
pub enum VaultkeepError {
    /// Configuration errors (invalid TOML, missing keys, malformed key material).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (connection failure, query failure, migration failure).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Cryptographic primitive failures (RNG, key setup, malformed envelope, hashing).
    #[error("crypto error: {0}")]
    Crypto(String),

    /// AEAD authentication failed: wrong key or tampered ciphertext.
    #[error("ciphertext authentication failed")]
    Authentication,

    /// A session token failed validation. The reason is never exposed.
    #[error("invalid session")]
    InvalidSession,

    /// Malformed or missing required input.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Wrong credentials or missing identity for a protected operation.
    #[error("unauthenticated: {0}")]
    Unauthenticated(String),

    /// An account or vault item does not exist for the caller.
    #[error("not found: {0}")]
    NotFound(String),

    /// A uniqueness constraint was violated (duplicate login).
    #[error("already exists: {0}")]
    AlreadyExists(String),

    /// Operation exceeded its deadline.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl VaultkeepError {
    /// Wrap any error as a storage failure.
    pub fn storage(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Storage {
            source: Box::new(err),
        }
    }

    /// True for outcomes whose detail must stay server-side.
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            Self::Config(_)
                | Self::Storage { .. }
                | Self::Crypto(_)
                | Self::Authentication
                | Self::Internal(_)
        )
    }
}
