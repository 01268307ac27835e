// SPDX-FileCopyrightText: 2026 Vaultkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Argon2id password hashing.
//!
//! Digests are PHC strings, so the salt and cost parameters travel with the
//! hash and older digests keep verifying after the configured cost changes.

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use ring::rand::{SecureRandom, SystemRandom};
use vaultkeep_core::VaultkeepError;

const SALT_LEN: usize = 16;

/// Slow salted one-way hasher for account passwords.
///
/// Both operations are CPU bound. Async callers should run them on a
/// blocking thread.
#[derive(Debug, Clone)]
pub struct CredentialHasher {
    params: Params,
}

impl CredentialHasher {
    /// Build a hasher with explicit Argon2id cost parameters.
    pub fn new(memory_cost: u32, iterations: u32, parallelism: u32) -> Result<Self, VaultkeepError> {
        let params = Params::new(memory_cost, iterations, parallelism, None)
            .map_err(|e| VaultkeepError::Config(format!("invalid Argon2id parameters: {e}")))?;
        Ok(Self { params })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Hash a password into a PHC string.
    pub fn hash(&self, password: &str) -> Result<String, VaultkeepError> {
        let mut salt = [0u8; SALT_LEN];
        SystemRandom::new()
            .fill(&mut salt)
            .map_err(|_| VaultkeepError::Crypto("failed to generate random salt".to_string()))?;
        let salt = SaltString::encode_b64(&salt)
            .map_err(|e| VaultkeepError::Crypto(format!("failed to encode salt: {e}")))?;

        self.argon2()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| VaultkeepError::Crypto(format!("failed to hash password: {e}")))
    }

    /// Check a password against a stored digest.
    ///
    /// A mismatch is `Ok(false)`; only an unparseable digest is an error.
    pub fn verify(&self, password: &str, digest: &str) -> Result<bool, VaultkeepError> {
        let parsed = PasswordHash::new(digest)
            .map_err(|e| VaultkeepError::Crypto(format!("invalid password hash format: {e}")))?;
        Ok(self
            .argon2()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Minimum legal cost keeps the tests fast.
    fn hasher() -> CredentialHasher {
        CredentialHasher::new(8, 1, 1).unwrap()
    }

    #[test]
    fn hash_and_verify() {
        let hasher = hasher();
        let digest = hasher.hash("correct-horse-battery-staple").unwrap();
        assert!(digest.starts_with("$argon2id$"));
        assert!(hasher.verify("correct-horse-battery-staple", &digest).unwrap());
        assert!(!hasher.verify("wrong-password", &digest).unwrap());
    }

    #[test]
    fn digest_never_contains_password() {
        let digest = hasher().hash("hunter2").unwrap();
        assert!(!digest.contains("hunter2"));
    }

    #[test]
    fn salts_differ_per_hash() {
        let hasher = hasher();
        let a = hasher.hash("same-password").unwrap();
        let b = hasher.hash("same-password").unwrap();
        assert_ne!(a, b);
        assert!(hasher.verify("same-password", &a).unwrap());
        assert!(hasher.verify("same-password", &b).unwrap());
    }

    #[test]
    fn digests_verify_across_cost_changes() {
        let digest = hasher().hash("pw").unwrap();
        let stronger = CredentialHasher::new(64, 2, 1).unwrap();
        assert!(stronger.verify("pw", &digest).unwrap());
    }

    #[test]
    fn malformed_digest_is_error() {
        assert!(hasher().verify("password", "not-a-valid-hash").is_err());
    }

    #[test]
    fn invalid_params_rejected() {
        assert!(matches!(
            CredentialHasher::new(1, 1, 1),
            Err(VaultkeepError::Config(_))
        ));
    }
}
