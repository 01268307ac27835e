// SPDX-FileCopyrightText: 2026 Vaultkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Client-side error type.

use thiserror::Error;
use vaultkeep_core::RpcCode;

/// Failure of a client call.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The server answered with a non-OK outcome.
    #[error("{code}: {message}")]
    Rpc { code: RpcCode, message: String },

    /// A vault call was attempted without a cached session token.
    #[error("not logged in")]
    NotLoggedIn,

    /// The request could not be delivered or the reply could not be read.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server replied with a body the client cannot interpret.
    #[error("malformed response: {0}")]
    Decode(String),

    /// Local input could not be encoded for the wire.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The token cache file could not be read or written.
    #[error("token cache error: {0}")]
    TokenCache(#[from] std::io::Error),
}

impl ClientError {
    /// Outcome code when the failure came from the server.
    pub fn code(&self) -> Option<RpcCode> {
        match self {
            Self::Rpc { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// True when the caller has to log in again.
    pub fn needs_login(&self) -> bool {
        matches!(self, Self::NotLoggedIn) || self.code() == Some(RpcCode::Unauthenticated)
    }
}
