//! CryptoEnvelope — authenticated encryption of structured values.
//!
//! A value is serialized with `serde_json`, sealed with the vault key
//! under a fresh random nonce, and rendered as a single storage-safe
//! token:
//!
//! ```text
//! {"nonce":[12 numbers],"ciphertext":[numbers]}
//! ```
//!
//! Byte arrays are carried as plain JSON number arrays, not base64.
//!
//! Random 96-bit nonces stay safe only while the number of encryptions
//! under one key stays below 2^32 (NIST SP 800-38D).  `MAX_ENCRYPTIONS`
//! caps a single envelope instance at that figure.  The count lives in
//! memory and restarts with every instance, so it is a guard against a
//! runaway long-lived process, not a lifetime bound on the key.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use super::encryption::{open, seal, NONCE_LEN};
use super::vault::KeyVault;
use crate::errors::{HseVaultError, Result};

/// Upper bound on encryptions performed by one envelope instance.  Not
/// persisted: other instances over the same key keep their own count.
pub const MAX_ENCRYPTIONS: u64 = 1 << 32;

/// One encryption result: nonce plus ciphertext (with trailing tag).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    pub nonce: Vec<u8>,
    pub ciphertext: Vec<u8>,
}

impl Envelope {
    /// Render as the storage token.
    pub fn to_token(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(|e| HseVaultError::EncryptionFailed(format!("envelope encoding: {e}")))
    }

    /// Parse a storage token.
    pub fn from_token(token: &str) -> Result<Self> {
        let envelope: Self = serde_json::from_str(token)
            .map_err(|e| HseVaultError::DecryptionFailed(format!("malformed envelope: {e}")))?;
        if envelope.nonce.len() != NONCE_LEN {
            return Err(HseVaultError::DecryptionFailed(format!(
                "nonce must be {NONCE_LEN} bytes, got {}",
                envelope.nonce.len()
            )));
        }
        Ok(envelope)
    }
}

/// Encrypts and decrypts values with the key supplied by a `KeyVault`.
pub struct CryptoEnvelope {
    vault: Arc<KeyVault>,
    encryptions: AtomicU64,
}

impl CryptoEnvelope {
    pub fn new(vault: Arc<KeyVault>) -> Self {
        Self {
            vault,
            encryptions: AtomicU64::new(0),
        }
    }

    /// The vault this envelope draws its key from.
    pub fn vault(&self) -> &KeyVault {
        &self.vault
    }

    /// Serialize, encrypt and render `value` as a storage token.
    ///
    /// Never idempotent: every call draws a new nonce, so encrypting the
    /// same value twice yields two different tokens.
    pub fn encrypt<T: Serialize + ?Sized>(&self, value: &T) -> Result<String> {
        let plaintext = Zeroizing::new(
            serde_json::to_vec(value)
                .map_err(|e| HseVaultError::EncryptionFailed(format!("serialization: {e}")))?,
        );

        let count = self.encryptions.fetch_add(1, Ordering::Relaxed);
        if count >= MAX_ENCRYPTIONS {
            return Err(HseVaultError::EncryptionFailed(
                "nonce budget for this key exhausted".into(),
            ));
        }

        let key = self.vault.get_or_create_key()?;
        let (nonce, ciphertext) = seal(&key, &plaintext)?;

        Envelope {
            nonce: nonce.to_vec(),
            ciphertext,
        }
        .to_token()
    }

    /// Parse, authenticate and deserialize a storage token.
    ///
    /// Tampering, truncation, a different key, or a plaintext that does
    /// not fit `T` all produce `DecryptionFailed`.  Key import problems
    /// surface as `KeyImportFailure`.
    pub fn decrypt<T: DeserializeOwned>(&self, token: &str) -> Result<T> {
        let envelope = Envelope::from_token(token)?;
        let key = self.vault.get_or_create_key()?;
        let plaintext = Zeroizing::new(open(&key, &envelope.nonce, &envelope.ciphertext)?);

        serde_json::from_slice(&plaintext)
            .map_err(|e| HseVaultError::DecryptionFailed(format!("unexpected value shape: {e}")))
    }

    /// Number of encryptions performed so far.
    pub fn encryption_count(&self) -> u64 {
        self.encryptions.load(Ordering::Relaxed)
    }
}
