// SPDX-FileCopyrightText: 2026 Vaultkeep Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! AES-256-GCM seal/open over self-describing blobs.
//!
//! A sealed blob is `nonce (12) || ciphertext || tag (16)`. Every call to
//! [`seal`] draws a fresh 96-bit nonce from the system CSPRNG.

use ring::aead::{Aad, LessSafeKey, Nonce, UnboundKey, AES_256_GCM, NONCE_LEN as RING_NONCE_LEN};
use ring::rand::{SecureRandom, SystemRandom};
use vaultkeep_core::VaultkeepError;

/// Key size in bytes.
pub const KEY_LEN: usize = 32;

/// Nonce size in bytes, prepended to every blob.
pub const NONCE_LEN: usize = RING_NONCE_LEN;

/// Authentication tag size in bytes, appended to every blob.
pub const TAG_LEN: usize = 16;

fn aead_key(key: &[u8; KEY_LEN]) -> Result<LessSafeKey, VaultkeepError> {
    let unbound = UnboundKey::new(&AES_256_GCM, key)
        .map_err(|_| VaultkeepError::Crypto("failed to create AES-256-GCM key".to_string()))?;
    Ok(LessSafeKey::new(unbound))
}

/// Encrypt `plaintext` under `key`, returning `nonce || ciphertext || tag`.
pub fn seal(key: &[u8; KEY_LEN], plaintext: &[u8]) -> Result<Vec<u8>, VaultkeepError> {
    let sealing_key = aead_key(key)?;

    let mut nonce_bytes = [0u8; NONCE_LEN];
    SystemRandom::new()
        .fill(&mut nonce_bytes)
        .map_err(|_| VaultkeepError::Crypto("failed to generate random nonce".to_string()))?;
    let nonce = Nonce::assume_unique_for_key(nonce_bytes);

    let mut in_out = plaintext.to_vec();
    sealing_key
        .seal_in_place_append_tag(nonce, Aad::empty(), &mut in_out)
        .map_err(|_| VaultkeepError::Crypto("AES-256-GCM encryption failed".to_string()))?;

    let mut blob = Vec::with_capacity(NONCE_LEN + in_out.len());
    blob.extend_from_slice(&nonce_bytes);
    blob.extend_from_slice(&in_out);
    Ok(blob)
}

/// Decrypt a blob produced by [`seal`].
///
/// A blob too short to hold a nonce and tag is a [`VaultkeepError::Crypto`]
/// error. A wrong key or any modified byte yields
/// [`VaultkeepError::Authentication`] and no plaintext.
pub fn open(key: &[u8; KEY_LEN], blob: &[u8]) -> Result<Vec<u8>, VaultkeepError> {
    if blob.len() < NONCE_LEN + TAG_LEN {
        return Err(VaultkeepError::Crypto(format!(
            "sealed blob is {} bytes, shorter than nonce and tag",
            blob.len()
        )));
    }
    let opening_key = aead_key(key)?;

    let (nonce_bytes, ciphertext) = blob.split_at(NONCE_LEN);
    let nonce = Nonce::try_assume_unique_for_key(nonce_bytes)
        .map_err(|_| VaultkeepError::Crypto("malformed nonce".to_string()))?;

    let mut in_out = ciphertext.to_vec();
    let plaintext = opening_key
        .open_in_place(nonce, Aad::empty(), &mut in_out)
        .map_err(|_| VaultkeepError::Authentication)?;

    Ok(plaintext.to_vec())
}

/// Generate a random key suitable for AES-256-GCM.
pub fn generate_key() -> Result<[u8; KEY_LEN], VaultkeepError> {
    let mut key = [0u8; KEY_LEN];
    SystemRandom::new()
        .fill(&mut key)
        .map_err(|_| VaultkeepError::Crypto("failed to generate random key".to_string()))?;
    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn blob_layout_is_nonce_ciphertext_tag() {
        let key = generate_key().unwrap();
        let blob = seal(&key, b"hello").unwrap();
        assert_eq!(blob.len(), NONCE_LEN + 5 + TAG_LEN);
    }

    #[test]
    fn same_plaintext_seals_differently() {
        let key = generate_key().unwrap();
        let a = seal(&key, b"same input twice").unwrap();
        let b = seal(&key, b"same input twice").unwrap();
        assert_ne!(a[..NONCE_LEN], b[..NONCE_LEN]);
        assert_ne!(a, b);
    }

    #[test]
    fn empty_plaintext_roundtrips() {
        let key = generate_key().unwrap();
        let blob = seal(&key, b"").unwrap();
        assert_eq!(blob.len(), NONCE_LEN + TAG_LEN);
        assert!(open(&key, &blob).unwrap().is_empty());
    }

    #[test]
    fn wrong_key_is_authentication_error() {
        let blob = seal(&generate_key().unwrap(), b"secret").unwrap();
        let err = open(&generate_key().unwrap(), &blob).unwrap_err();
        assert!(matches!(err, VaultkeepError::Authentication));
    }

    #[test]
    fn short_blob_is_rejected_before_decryption() {
        let key = generate_key().unwrap();
        let err = open(&key, &[0u8; NONCE_LEN + TAG_LEN - 1]).unwrap_err();
        assert!(matches!(err, VaultkeepError::Crypto(_)));
    }

    #[test]
    fn generated_keys_differ() {
        assert_ne!(generate_key().unwrap(), generate_key().unwrap());
    }

    proptest! {
        #[test]
        fn open_inverts_seal(
            key in any::<[u8; KEY_LEN]>(),
            plaintext in proptest::collection::vec(any::<u8>(), 0..512),
        ) {
            let blob = seal(&key, &plaintext).unwrap();
            prop_assert_eq!(open(&key, &blob).unwrap(), plaintext);
        }

        #[test]
        fn any_flipped_bit_fails_closed(
            key in any::<[u8; KEY_LEN]>(),
            plaintext in proptest::collection::vec(any::<u8>(), 0..128),
            position in any::<proptest::sample::Index>(),
            bit in 0u8..8,
        ) {
            let mut blob = seal(&key, &plaintext).unwrap();
            let i = position.index(blob.len());
            blob[i] ^= 1 << bit;
            prop_assert!(matches!(open(&key, &blob), Err(VaultkeepError::Authentication)));
        }
    }
}
