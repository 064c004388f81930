//! AES-256-GCM authenticated encryption.
//!
//! Each call to `seal` generates a fresh random 12-byte nonce.  The nonce
//! is returned next to the ciphertext rather than prepended, because the
//! envelope format carries the two as separate fields.
//!
//! The ciphertext always ends in the 16-byte authentication tag, so any
//! flipped or missing byte makes `open` fail.

use aes_gcm::aead::{Aead, KeyInit, OsRng};
use aes_gcm::{AeadCore, Aes256Gcm, Nonce};

use super::key::SymmetricKey;
use crate::errors::{HseVaultError, Result};

/// Size of the AES-256-GCM nonce in bytes (96 bits).
pub const NONCE_LEN: usize = 12;

/// Size of the GCM authentication tag in bytes.
pub const TAG_LEN: usize = 16;

/// Encrypt `plaintext` under `key`.
///
/// Returns `(nonce, ciphertext || tag)`.
pub fn seal(key: &SymmetricKey, plaintext: &[u8]) -> Result<([u8; NONCE_LEN], Vec<u8>)> {
    let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|e| HseVaultError::EncryptionFailed(format!("invalid key length: {e}")))?;

    let nonce = Aes256Gcm::generate_nonce(&mut OsRng);

    let ciphertext = cipher
        .encrypt(&nonce, plaintext)
        .map_err(|e| HseVaultError::EncryptionFailed(format!("encryption error: {e}")))?;

    let mut nonce_bytes = [0u8; NONCE_LEN];
    nonce_bytes.copy_from_slice(nonce.as_slice());
    Ok((nonce_bytes, ciphertext))
}

/// Decrypt a ciphertext produced by `seal` and verify its tag.
pub fn open(key: &SymmetricKey, nonce: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>> {
    if nonce.len() != NONCE_LEN {
        return Err(HseVaultError::DecryptionFailed(format!(
            "nonce must be {NONCE_LEN} bytes, got {}",
            nonce.len()
        )));
    }
    if ciphertext.len() < TAG_LEN {
        return Err(HseVaultError::DecryptionFailed(
            "ciphertext shorter than the authentication tag".into(),
        ));
    }

    let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|e| HseVaultError::DecryptionFailed(format!("invalid key length: {e}")))?;

    cipher
        .decrypt(Nonce::from_slice(nonce), ciphertext)
        .map_err(|_| {
            HseVaultError::DecryptionFailed(
                "authentication failed — wrong key or tampered data".into(),
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(byte: u8) -> SymmetricKey {
        SymmetricKey::from_bytes([byte; 32])
    }

    #[test]
    fn seal_open_roundtrip() {
        let k = key(0xAB);
        let (nonce, ct) = seal(&k, b"permit-to-work #42").unwrap();
        assert_eq!(ct.len(), b"permit-to-work #42".len() + TAG_LEN);
        assert_eq!(open(&k, &nonce, &ct).unwrap(), b"permit-to-work #42");
    }

    #[test]
    fn nonces_are_fresh() {
        let k = key(0xCD);
        let (n1, _) = seal(&k, b"same").unwrap();
        let (n2, _) = seal(&k, b"same").unwrap();
        assert_ne!(n1, n2);
    }

    #[test]
    fn wrong_key_fails() {
        let (nonce, ct) = seal(&key(0x11), b"secret").unwrap();
        assert!(open(&key(0x22), &nonce, &ct).is_err());
    }

    #[test]
    fn bad_nonce_length_fails() {
        let k = key(0x33);
        let (_, ct) = seal(&k, b"x").unwrap();
        assert!(open(&k, &[0u8; 8], &ct).is_err());
    }

    #[test]
    fn short_ciphertext_fails() {
        let k = key(0x44);
        assert!(open(&k, &[0u8; NONCE_LEN], &[0u8; 5]).is_err());
    }
}
