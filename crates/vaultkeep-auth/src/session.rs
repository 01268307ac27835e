// SPDX-FileCopyrightText: 2026 Vaultkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Signed, expiring session tokens.
//!
//! Tokens are HS256 JWTs over [`Claims`]. Validation accepts HS256 only, with
//! zero clock leeway, and collapses every failure into
//! [`VaultkeepError::InvalidSession`].

use std::time::Duration;

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use vaultkeep_core::VaultkeepError;

/// Shortest signing secret the service accepts.
pub const MIN_SECRET_LEN: usize = 32;

/// Identity carried inside a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Account id.
    pub sub: String,
    /// Normalized login.
    pub login: String,
    /// Issued at (Unix seconds).
    pub iat: u64,
    /// Expiry (Unix seconds).
    pub exp: u64,
}

/// Issues and validates session tokens with one server-held secret.
#[derive(Clone)]
pub struct SessionService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    lifetime: Duration,
}

impl std::fmt::Debug for SessionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionService")
            .field("secret", &"[REDACTED]")
            .field("lifetime", &self.lifetime)
            .finish()
    }
}

impl SessionService {
    pub fn new(secret: &str, lifetime: Duration) -> Result<Self, VaultkeepError> {
        if secret.len() < MIN_SECRET_LEN {
            return Err(VaultkeepError::Config(format!(
                "session signing key must be at least {MIN_SECRET_LEN} characters"
            )));
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Ok(Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            lifetime,
        })
    }

    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    /// Mint a token for an account. Empty identity input is rejected.
    pub fn issue(&self, account_id: &str, login: &str) -> Result<String, VaultkeepError> {
        self.issue_at(account_id, login, jsonwebtoken::get_current_timestamp())
    }

    fn issue_at(&self, account_id: &str, login: &str, now: u64) -> Result<String, VaultkeepError> {
        if account_id.is_empty() || login.is_empty() {
            return Err(VaultkeepError::InvalidArgument(
                "session identity requires an account id and login".to_string(),
            ));
        }

        let claims = Claims {
            sub: account_id.to_string(),
            login: login.to_string(),
            iat: now,
            exp: now.saturating_add(self.lifetime.as_secs()),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| VaultkeepError::Internal(format!("failed to sign session token: {e}")))
    }

    /// Verify signature, algorithm, and expiry and return the claims.
    pub fn validate(&self, token: &str) -> Result<Claims, VaultkeepError> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation).map_err(|e| {
            tracing::debug!(reason = ?e.kind(), "session token rejected");
            VaultkeepError::InvalidSession
        })?;

        let claims = data.claims;
        if claims.sub.is_empty() || claims.login.is_empty() {
            return Err(VaultkeepError::InvalidSession);
        }
        Ok(claims)
    }
}
