// SPDX-FileCopyrightText: 2026 Vaultkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Envelope key custody.
//!
//! [`KeyCustodian`] owns the master key and is the only component that can
//! turn a stored wrapped key back into a usable [`AccountKey`]. Wrapping is a
//! plain [`seal`](crate::cipher::seal) of the raw key bytes.

use std::fmt;

use vaultkeep_core::VaultkeepError;
use zeroize::Zeroizing;

use crate::cipher::{self, KEY_LEN};

/// The operator-held root key. Zeroed on drop, redacted in `Debug`.
pub struct MasterKey(Zeroizing<[u8; KEY_LEN]>);

impl MasterKey {
    pub fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self(Zeroizing::new(bytes))
    }

    /// Parse a hex-encoded 32-byte key, as carried in `keys.master_key`.
    pub fn from_hex(encoded: &str) -> Result<Self, VaultkeepError> {
        let decoded = Zeroizing::new(
            hex::decode(encoded.trim())
                .map_err(|e| VaultkeepError::Config(format!("master key is not valid hex: {e}")))?,
        );
        let bytes: [u8; KEY_LEN] = decoded.as_slice().try_into().map_err(|_| {
            VaultkeepError::Config(format!(
                "master key must be {KEY_LEN} bytes, got {}",
                decoded.len()
            ))
        })?;
        Ok(Self::from_bytes(bytes))
    }
}

impl fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("MasterKey([REDACTED])")
    }
}

/// A per-account data key in its unwrapped form.
#[derive(Clone)]
pub struct AccountKey(Zeroizing<[u8; KEY_LEN]>);

impl AccountKey {
    pub fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self(Zeroizing::new(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }

    /// Encrypt a vault payload under this key.
    pub fn seal(&self, plaintext: &[u8]) -> Result<Vec<u8>, VaultkeepError> {
        cipher::seal(&self.0, plaintext)
    }

    /// Decrypt a vault payload sealed under this key.
    pub fn open(&self, blob: &[u8]) -> Result<Vec<u8>, VaultkeepError> {
        cipher::open(&self.0, blob)
    }
}

impl fmt::Debug for AccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccountKey([REDACTED])")
    }
}

/// Generates, wraps, and unwraps account keys under the master key.
#[derive(Debug)]
pub struct KeyCustodian {
    master: MasterKey,
}

impl KeyCustodian {
    pub fn new(master: MasterKey) -> Self {
        Self { master }
    }

    /// Draw a fresh random account key.
    pub fn generate_account_key(&self) -> Result<AccountKey, VaultkeepError> {
        cipher::generate_key().map(AccountKey::from_bytes)
    }

    /// Seal an account key under the master key and hex-encode it for storage.
    pub fn wrap(&self, key: &AccountKey) -> Result<String, VaultkeepError> {
        let blob = cipher::seal(&self.master.0, key.as_bytes())?;
        Ok(hex::encode(blob))
    }

    /// Recover an account key from its stored hex form.
    ///
    /// Fails with [`VaultkeepError::Authentication`] when the wrapped key was
    /// sealed under a different master key or has been altered.
    pub fn unwrap(&self, wrapped: &str) -> Result<AccountKey, VaultkeepError> {
        let blob = hex::decode(wrapped)
            .map_err(|e| VaultkeepError::Crypto(format!("wrapped key is not valid hex: {e}")))?;
        let raw = Zeroizing::new(cipher::open(&self.master.0, &blob)?);
        let bytes: [u8; KEY_LEN] = raw.as_slice().try_into().map_err(|_| {
            VaultkeepError::Crypto(format!(
                "unwrapped key is {} bytes, expected {KEY_LEN}",
                raw.len()
            ))
        })?;
        Ok(AccountKey::from_bytes(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn custodian() -> KeyCustodian {
        KeyCustodian::new(MasterKey::from_bytes(cipher::generate_key().unwrap()))
    }

    #[test]
    fn master_key_parses_hex() {
        let hex_key = "ab".repeat(KEY_LEN);
        assert!(MasterKey::from_hex(&hex_key).is_ok());
        assert!(MasterKey::from_hex(&format!("  {hex_key}\n")).is_ok());
    }

    #[test]
    fn master_key_rejects_wrong_length_and_bad_hex() {
        assert!(matches!(
            MasterKey::from_hex(&"ab".repeat(16)),
            Err(VaultkeepError::Config(_))
        ));
        assert!(matches!(
            MasterKey::from_hex("not hex at all"),
            Err(VaultkeepError::Config(_))
        ));
    }

    #[test]
    fn debug_output_is_redacted() {
        let custodian = custodian();
        let key = AccountKey::from_bytes([0x42; KEY_LEN]);
        assert_eq!(format!("{key:?}"), "AccountKey([REDACTED])");
        assert!(format!("{custodian:?}").contains("[REDACTED]"));
    }

    #[test]
    fn wrapped_key_is_hex_of_sealed_blob() {
        let custodian = custodian();
        let key = custodian.generate_account_key().unwrap();
        let wrapped = custodian.wrap(&key).unwrap();
        let blob = hex::decode(&wrapped).unwrap();
        assert_eq!(blob.len(), cipher::NONCE_LEN + KEY_LEN + cipher::TAG_LEN);
        assert!(!wrapped.contains(&hex::encode(key.as_bytes())));
    }

    #[test]
    fn unwrap_under_other_master_fails() {
        let a = custodian();
        let b = custodian();
        let wrapped = a.wrap(&a.generate_account_key().unwrap()).unwrap();
        assert!(matches!(b.unwrap(&wrapped), Err(VaultkeepError::Authentication)));
    }

    #[test]
    fn unwrap_rejects_garbage() {
        assert!(matches!(custodian().unwrap("zz"), Err(VaultkeepError::Crypto(_))));
    }

    #[test]
    fn account_key_payload_roundtrip() {
        let key = custodian().generate_account_key().unwrap();
        let blob = key.seal(b"hunter2").unwrap();
        assert_eq!(key.open(&blob).unwrap(), b"hunter2");
    }

    proptest! {
        #[test]
        fn unwrap_inverts_wrap(
            master in any::<[u8; KEY_LEN]>(),
            account in any::<[u8; KEY_LEN]>(),
        ) {
            let custodian = KeyCustodian::new(MasterKey::from_bytes(master));
            let key = AccountKey::from_bytes(account);
            let wrapped = custodian.wrap(&key).unwrap();
            let recovered = custodian.unwrap(&wrapped).unwrap();
            prop_assert_eq!(recovered.as_bytes(), key.as_bytes());
        }
    }
}
