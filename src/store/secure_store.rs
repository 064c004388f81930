//! SecureStore — typed, encrypted key-value façade.
//!
//! `SecureStore` is the only component that writes into the backend
//! namespace (apart from the key slot, which belongs to `KeyVault` and is
//! off limits here).  Every value goes through `CryptoEnvelope`, so the
//! backend only ever sees envelope tokens.
//!
//! Session records (`SESSION_RECORD_KEYS`) are reserved as well: the
//! public surface refuses them, and only `SessionService` reaches them
//! through the crate-private `*_reserved` accessors.
//!
//! Failure policy:
//! - `set` logs and swallows encryption and write failures.  Callers that
//!   need confirmation use `try_set`.
//! - `get` treats "never stored" and "cannot be decrypted" the same way
//!   (`None`).  `lookup` keeps them apart via `Lookup`.
//! - Key import failures are fatal and always propagate.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{error, warn};

use super::backend::{validate_key_name, Backend};
use crate::crypto::CryptoEnvelope;
use crate::errors::{HseVaultError, Result};
use crate::session::SESSION_RECORD_KEYS;

/// Outcome of reading a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<T> {
    /// The record exists and decrypted cleanly.
    Found(T),
    /// Nothing is stored under the key.
    Absent,
    /// Something is stored but it failed to parse, authenticate or
    /// deserialize.
    Corrupted,
}

impl<T> Lookup<T> {
    /// Collapse to the lenient view: anything but `Found` is `None`.
    pub fn into_option(self) -> Option<T> {
        match self {
            Self::Found(value) => Some(value),
            Self::Absent | Self::Corrupted => None,
        }
    }

    pub fn is_corrupted(&self) -> bool {
        matches!(self, Self::Corrupted)
    }
}

/// Encrypted record store over a raw backend.
pub struct SecureStore {
    envelope: Arc<CryptoEnvelope>,
    backend: Arc<dyn Backend>,
}

impl SecureStore {
    pub fn new(envelope: Arc<CryptoEnvelope>, backend: Arc<dyn Backend>) -> Self {
        Self { envelope, backend }
    }

    /// Encrypt `value` and store it under `key`.
    ///
    /// Lenient: encryption and backend failures are logged and the write
    /// is skipped.  Only a key import failure is returned.
    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        match self.try_set(key, value) {
            Ok(()) => Ok(()),
            Err(e) if e.is_fatal() => Err(e),
            Err(e) => {
                warn!(key, error = %e, "secure write skipped");
                Ok(())
            }
        }
    }

    /// Encrypt `value` and store it under `key`, returning any failure.
    pub fn try_set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        self.check_key(key)?;
        self.write_sealed(key, value)
    }

    /// Read and decrypt `key`, treating corruption as absence.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        Ok(self.lookup(key)?.into_option())
    }

    /// Read and decrypt `key`, distinguishing absent from corrupted.
    pub fn lookup<T: DeserializeOwned>(&self, key: &str) -> Result<Lookup<T>> {
        self.check_key(key)?;
        self.read_sealed(key)
    }

    /// Whether anything (readable or not) is stored under `key`.
    pub fn contains(&self, key: &str) -> Result<bool> {
        self.check_key(key)?;
        Ok(self.backend.read(key)?.is_some())
    }

    /// Delete `key`.  The key material is never touched.
    pub fn remove(&self, key: &str) -> Result<()> {
        self.check_key(key)?;
        self.backend.remove(key)
    }

    /// Delete every record, session records included.  The key material
    /// is kept.
    pub fn clear(&self) -> Result<()> {
        let slot = self.envelope.vault().slot();
        for key in self.backend.keys()? {
            if key != slot {
                self.backend.remove(&key)?;
            }
        }
        Ok(())
    }

    /// Names of all user records, sorted.  The key slot and session
    /// records are not listed.
    pub fn keys(&self) -> Result<Vec<String>> {
        Ok(self
            .backend
            .keys()?
            .into_iter()
            .filter(|k| !self.is_reserved(k))
            .collect())
    }

    /// The envelope used for encryption.
    pub fn envelope(&self) -> &CryptoEnvelope {
        &self.envelope
    }

    /// Whether `key` is held back from the public record surface.
    pub fn is_reserved(&self, key: &str) -> bool {
        key == self.envelope.vault().slot() || SESSION_RECORD_KEYS.contains(&key)
    }

    pub(crate) fn write_reserved<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
    ) -> Result<()> {
        self.check_session_key(key)?;
        self.write_sealed(key, value)
    }

    pub(crate) fn read_reserved<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        self.check_session_key(key)?;
        Ok(self.read_sealed(key)?.into_option())
    }

    pub(crate) fn contains_reserved(&self, key: &str) -> Result<bool> {
        self.check_session_key(key)?;
        Ok(self.backend.read(key)?.is_some())
    }

    pub(crate) fn remove_reserved(&self, key: &str) -> Result<()> {
        self.check_session_key(key)?;
        self.backend.remove(key)
    }

    fn write_sealed<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let token = self.envelope.encrypt(value)?;
        self.backend.write(key, &token)
    }

    fn read_sealed<T: DeserializeOwned>(&self, key: &str) -> Result<Lookup<T>> {
        let Some(token) = self.backend.read(key)? else {
            return Ok(Lookup::Absent);
        };

        match self.envelope.decrypt(&token) {
            Ok(value) => Ok(Lookup::Found(value)),
            Err(e) if e.is_fatal() => Err(e),
            Err(e) => {
                error!(key, error = %e, "stored record could not be decrypted");
                Ok(Lookup::Corrupted)
            }
        }
    }

    fn check_key(&self, key: &str) -> Result<()> {
        validate_key_name(key)?;
        if self.is_reserved(key) {
            return Err(HseVaultError::ReservedKey(key.to_string()));
        }
        Ok(())
    }

    /// Session accessors only reach the session records.
    fn check_session_key(&self, key: &str) -> Result<()> {
        validate_key_name(key)?;
        if !SESSION_RECORD_KEYS.contains(&key) || key == self.envelope.vault().slot() {
            return Err(HseVaultError::ReservedKey(key.to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::KeyVault;
    use crate::store::backend::MemoryBackend;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Observation {
        site: String,
        severity: u8,
    }

    fn store(backend: &MemoryBackend) -> SecureStore {
        let shared: Arc<dyn Backend> = Arc::new(backend.clone());
        let vault = Arc::new(KeyVault::with_default_slot(Arc::clone(&shared)));
        SecureStore::new(Arc::new(CryptoEnvelope::new(vault)), shared)
    }

    #[test]
    fn set_then_get_typed_value() {
        let backend = MemoryBackend::new();
        let store = store(&backend);
        let obs = Observation {
            site: "North Yard".into(),
            severity: 3,
        };
        store.set("obs-1", &obs).unwrap();
        assert_eq!(store.get::<Observation>("obs-1").unwrap(), Some(obs));
    }

    #[test]
    fn backend_only_sees_ciphertext() {
        let backend = MemoryBackend::new();
        let store = store(&backend);
        store.set("obs-1", "North Yard spill").unwrap();
        let raw = backend.read("obs-1").unwrap().unwrap();
        assert!(!raw.contains("North Yard"));
    }

    #[test]
    fn lookup_distinguishes_absent_and_corrupted() {
        let backend = MemoryBackend::new();
        let store = store(&backend);
        assert_eq!(store.lookup::<String>("missing").unwrap(), Lookup::Absent);

        backend.write("broken", "not an envelope").unwrap();
        assert_eq!(store.lookup::<String>("broken").unwrap(), Lookup::Corrupted);
        assert_eq!(store.get::<String>("broken").unwrap(), None);
    }

    #[test]
    fn key_slot_is_reserved() {
        let backend = MemoryBackend::new();
        let store = store(&backend);
        let slot = crate::crypto::DEFAULT_KEY_SLOT;
        assert!(matches!(
            store.try_set(slot, "x"),
            Err(HseVaultError::ReservedKey(_))
        ));
        assert!(store.get::<String>(slot).is_err());
        assert!(store.remove(slot).is_err());
    }

    #[test]
    fn session_records_are_reserved() {
        let backend = MemoryBackend::new();
        let store = store(&backend);
        for key in SESSION_RECORD_KEYS {
            assert!(store.is_reserved(key));
            assert!(matches!(
                store.try_set(key, "forged"),
                Err(HseVaultError::ReservedKey(_))
            ));
            assert!(store.get::<String>(key).is_err());
            assert!(store.remove(key).is_err());
        }
        // Lenient writes are refused too, without surfacing an error.
        store.set(SESSION_RECORD_KEYS[1], "forged").unwrap();
        assert!(backend.keys().unwrap().iter().all(|k| k != SESSION_RECORD_KEYS[1]));
    }

    #[test]
    fn reserved_accessors_reach_only_session_records() {
        let backend = MemoryBackend::new();
        let store = store(&backend);
        let key = SESSION_RECORD_KEYS[0];

        store.write_reserved(key, "token").unwrap();
        assert_eq!(store.read_reserved::<String>(key).unwrap().as_deref(), Some("token"));
        assert!(store.contains_reserved(key).unwrap());
        assert!(store.keys().unwrap().is_empty());

        assert!(store.write_reserved("obs-1", "x").is_err());
        assert!(store
            .write_reserved(crate::crypto::DEFAULT_KEY_SLOT, "x")
            .is_err());

        store.remove_reserved(key).unwrap();
        assert!(!store.contains_reserved(key).unwrap());
    }

    #[test]
    fn clear_also_drops_session_records() {
        let backend = MemoryBackend::new();
        let store = store(&backend);
        store.write_reserved(SESSION_RECORD_KEYS[0], "token").unwrap();
        store.set("a", &1).unwrap();

        store.clear().unwrap();
        assert!(!store.contains_reserved(SESSION_RECORD_KEYS[0]).unwrap());
        assert_eq!(
            backend.keys().unwrap(),
            vec![crate::crypto::DEFAULT_KEY_SLOT.to_string()]
        );
    }

    #[test]
    fn lenient_set_swallows_invalid_key() {
        let backend = MemoryBackend::new();
        let store = store(&backend);
        assert!(store.set("bad/key", "x").is_ok());
        assert!(store.try_set("bad/key", "x").is_err());
    }

    #[test]
    fn clear_keeps_key_material() {
        let backend = MemoryBackend::new();
        let store = store(&backend);
        store.set("a", &1).unwrap();
        store.set("b", &2).unwrap();

        store.clear().unwrap();
        assert!(store.keys().unwrap().is_empty());
        assert_eq!(
            backend.keys().unwrap(),
            vec![crate::crypto::DEFAULT_KEY_SLOT.to_string()]
        );
    }
}
