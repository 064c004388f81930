//! The single symmetric key that protects every stored record.
//!
//! `SymmetricKey` wraps 32 raw bytes for AES-256-GCM and zeroes its
//! memory on drop.  It deliberately has no `Debug` impl so the bytes
//! cannot end up in logs.

use aes_gcm::aead::{KeyInit, OsRng};
use aes_gcm::Aes256Gcm;
use sha2::{Digest, Sha256};
use zeroize::Zeroize;

/// Length of the key in bytes (256 bits).
pub const KEY_LEN: usize = 32;

/// A 256-bit AEAD key, zeroized when dropped.
#[derive(Clone, Zeroize)]
#[zeroize(drop)]
pub struct SymmetricKey {
    bytes: [u8; KEY_LEN],
}

impl SymmetricKey {
    /// Create a key from raw bytes.
    pub fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self { bytes }
    }

    /// Generate a fresh key from the operating system RNG.
    pub fn generate() -> Self {
        let mut generated = Aes256Gcm::generate_key(&mut OsRng);
        let mut bytes = [0u8; KEY_LEN];
        bytes.copy_from_slice(generated.as_slice());
        generated.as_mut_slice().zeroize();
        Self { bytes }
    }

    /// Access the raw key bytes (e.g. to build a cipher or export).
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.bytes
    }

    /// Short, non-secret identifier for display: the first 8 bytes of
    /// SHA-256 over the key, hex encoded.
    pub fn fingerprint(&self) -> String {
        let digest = Sha256::digest(self.bytes);
        digest[..8].iter().map(|b| format!("{b:02x}")).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_keys_differ() {
        let a = SymmetricKey::generate();
        let b = SymmetricKey::generate();
        assert_ne!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn fingerprint_is_deterministic_and_short() {
        let key = SymmetricKey::from_bytes([0x42u8; KEY_LEN]);
        assert_eq!(key.fingerprint(), key.fingerprint());
        assert_eq!(key.fingerprint().len(), 16);
    }

    #[test]
    fn fingerprint_differs_between_keys() {
        let a = SymmetricKey::from_bytes([0x01u8; KEY_LEN]);
        let b = SymmetricKey::from_bytes([0x02u8; KEY_LEN]);
        assert_ne!(a.fingerprint(), b.fingerprint());
    }
}
