//! KeyVault — owns the one symmetric key for a profile.
//!
//! The first `get_or_create_key` call in a profile's lifetime generates a
//! key, exports it as a JWK and persists it under a fixed slot name.
//! Later calls (including from a freshly constructed vault after a
//! reload) import the persisted JWK back.
//!
//! Creation is guarded twice: an in-process mutex serializes callers of
//! the same vault, and the backend's `write_if_absent` makes the slot a
//! compare-and-swap, so two vaults racing on one backend converge on a
//! single key instead of orphaning one set of ciphertexts.
//!
//! A slot that exists but cannot be imported is fatal.  The vault never
//! regenerates over it, because that would make every record written
//! under the old key permanently unreadable.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info};

use super::jwk;
use super::key::SymmetricKey;
use crate::errors::{HseVaultError, Result};
use crate::store::backend::{validate_key_name, Backend};

/// Default backend name of the key slot.
pub const DEFAULT_KEY_SLOT: &str = "hse_encryption_key";

/// Generates, persists and reloads the profile's symmetric key.
pub struct KeyVault {
    backend: Arc<dyn Backend>,
    slot: String,
    /// Imported key, cached after the first successful lookup.
    cached: Mutex<Option<Arc<SymmetricKey>>>,
}

impl KeyVault {
    /// Build a vault whose key lives under `slot` in `backend`.
    pub fn new(backend: Arc<dyn Backend>, slot: &str) -> Result<Self> {
        validate_key_name(slot)?;
        Ok(Self {
            backend,
            slot: slot.to_string(),
            cached: Mutex::new(None),
        })
    }

    /// Build a vault using the default slot name.
    pub fn with_default_slot(backend: Arc<dyn Backend>) -> Self {
        Self {
            backend,
            slot: DEFAULT_KEY_SLOT.to_string(),
            cached: Mutex::new(None),
        }
    }

    /// The backend name the key is stored under.
    pub fn slot(&self) -> &str {
        &self.slot
    }

    /// Return the profile key, creating and persisting it on first use.
    pub fn get_or_create_key(&self) -> Result<Arc<SymmetricKey>> {
        let mut cached = self.cached.lock();
        if let Some(key) = cached.as_ref() {
            return Ok(Arc::clone(key));
        }

        let key = match self.backend.read(&self.slot)? {
            Some(raw) => {
                debug!(slot = %self.slot, "importing persisted key");
                jwk::import_key(&raw)?
            }
            None => self.create_key()?,
        };

        let key = Arc::new(key);
        *cached = Some(Arc::clone(&key));
        Ok(key)
    }

    /// Whether key material has been persisted yet.
    pub fn has_key(&self) -> Result<bool> {
        Ok(self.backend.read(&self.slot)?.is_some())
    }

    /// Fingerprint of the persisted key, without creating one.
    pub fn fingerprint(&self) -> Result<Option<String>> {
        if self.cached.lock().is_none() && !self.has_key()? {
            return Ok(None);
        }
        Ok(Some(self.get_or_create_key()?.fingerprint()))
    }

    /// Generate a key and try to claim the slot with it.  If another
    /// writer got there first, adopt theirs.
    fn create_key(&self) -> Result<SymmetricKey> {
        let fresh = SymmetricKey::generate();
        let exported = jwk::export_key(&fresh)?;

        if self.backend.write_if_absent(&self.slot, &exported)? {
            info!(slot = %self.slot, fingerprint = %fresh.fingerprint(), "created new profile key");
            return Ok(fresh);
        }

        debug!(slot = %self.slot, "key slot claimed concurrently, adopting existing key");
        let winner = self.backend.read(&self.slot)?.ok_or_else(|| {
            HseVaultError::KeyImportFailure("key slot vanished during creation".into())
        })?;
        jwk::import_key(&winner)
    }
}
