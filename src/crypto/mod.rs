//! Cryptographic primitives for HseVault.
//!
//! This module provides:
//! - The zeroizing `SymmetricKey` (`key`)
//! - AES-256-GCM sealing and opening (`encryption`)
//! - JWK export/import of the key (`jwk`)
//! - `KeyVault`, which persists the single profile key (`vault`)
//! - `CryptoEnvelope`, which encrypts structured values (`envelope`)

pub mod encryption;
pub mod envelope;
pub mod jwk;
pub mod key;
pub mod vault;

// Re-export the most commonly used items so callers can write:
//   use crate::crypto::{CryptoEnvelope, KeyVault, ...};
pub use envelope::{CryptoEnvelope, Envelope};
pub use jwk::{export_key, import_key};
pub use key::SymmetricKey;
pub use vault::{KeyVault, DEFAULT_KEY_SLOT};
