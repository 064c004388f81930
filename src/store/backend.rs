//! Raw persistence backends.
//!
//! A backend is a flat namespace of string keys to string values, the
//! local analogue of browser storage.  It knows nothing about encryption:
//! `SecureStore` writes ciphertext tokens into it, and `KeyVault` owns one
//! distinguished slot for the exported key.
//!
//! Two implementations ship:
//! - `MemoryBackend` for tests and embedding; cloned handles share state.
//! - `FileBackend`, one file per key inside a directory.

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use crate::errors::{HseVaultError, Result};

/// Maximum length of a record key in bytes.
const MAX_KEY_LEN: usize = 200;

/// Extension used for record files written by `FileBackend`.
const RECORD_EXT: &str = "rec";

/// Distinguishes temp files written by concurrent handles in one process.
static TEMP_SEQ: AtomicU64 = AtomicU64::new(0);

/// A flat string-to-string persistence namespace.
pub trait Backend: Send + Sync {
    /// Read the value stored under `key`, if any.
    fn read(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    fn write(&self, key: &str, value: &str) -> Result<()>;

    /// Store `value` under `key` only if nothing is stored there yet.
    ///
    /// Returns `false` (and leaves the existing value untouched) when the
    /// key was already populated.  Must be atomic with respect to other
    /// writers of the same backend.
    fn write_if_absent(&self, key: &str, value: &str) -> Result<bool>;

    /// Remove `key`.  Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<()>;

    /// All keys currently stored, sorted.
    fn keys(&self) -> Result<Vec<String>>;
}

/// Validate that a record key is safe to use as a backend name.
///
/// Allowed: ASCII letters, digits, underscores, hyphens, periods.
/// Must be non-empty, at most 200 bytes, and must not start with a period.
pub fn validate_key_name(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(HseVaultError::InvalidKeyName(
            "record key cannot be empty".into(),
        ));
    }
    if key.len() > MAX_KEY_LEN {
        return Err(HseVaultError::InvalidKeyName(format!(
            "record key cannot exceed {MAX_KEY_LEN} characters"
        )));
    }
    if key.starts_with('.') {
        return Err(HseVaultError::InvalidKeyName(format!(
            "record key '{key}' cannot start with a period"
        )));
    }
    if !key
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-' || b == b'.')
    {
        return Err(HseVaultError::InvalidKeyName(format!(
            "record key '{key}' contains invalid characters — only ASCII letters, digits, underscores, hyphens, and periods are allowed"
        )));
    }
    Ok(())
}

/// Filesystems without hard link support (FAT, some network mounts)
/// report one of these kinds from `fs::hard_link`.
fn lacks_hard_links(kind: io::ErrorKind) -> bool {
    matches!(
        kind,
        io::ErrorKind::Unsupported | io::ErrorKind::PermissionDenied
    )
}

// ---------------------------------------------------------------------------
// MemoryBackend
// ---------------------------------------------------------------------------

/// In-memory backend.  Clones share the same underlying map, so a fresh
/// set of services built over a clone behaves like an app reload.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    entries: Arc<Mutex<BTreeMap<String, String>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Backend for MemoryBackend {
    fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        validate_key_name(key)?;
        self.entries.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn write_if_absent(&self, key: &str, value: &str) -> Result<bool> {
        validate_key_name(key)?;
        let mut entries = self.entries.lock();
        if entries.contains_key(key) {
            return Ok(false);
        }
        entries.insert(key.to_string(), value.to_string());
        Ok(true)
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries.lock().remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.entries.lock().keys().cloned().collect())
    }
}

// ---------------------------------------------------------------------------
// FileBackend
// ---------------------------------------------------------------------------

/// Directory-backed store: each key lives in `<dir>/<key>.rec`.
///
/// Writes go to a temp file first and are then renamed into place, so a
/// reader never observes a half-written record.  `write_if_absent` hard
/// links the temp file instead of renaming it; the link fails if the
/// target exists, which makes it a compare-and-swap across processes.
#[derive(Debug)]
pub struct FileBackend {
    dir: PathBuf,
    /// Serializes writers inside this process.
    lock: Mutex<()>,
}

impl FileBackend {
    /// Open (creating if needed) a backend rooted at `dir`.
    pub fn open(dir: &Path) -> Result<Self> {
        if !dir.exists() {
            fs::create_dir_all(dir)?;
            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                fs::set_permissions(dir, fs::Permissions::from_mode(0o700))?;
            }
        }
        Ok(Self {
            dir: dir.to_path_buf(),
            lock: Mutex::new(()),
        })
    }

    /// Directory this backend writes into.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the record file for `key`.
    pub fn record_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.{RECORD_EXT}"))
    }

    /// Claim `key` by creating its record file with `create_new`.
    ///
    /// Still exclusive, but a concurrent reader may see the file before
    /// its contents are flushed.  Used only where hard links are refused.
    fn create_exclusive(&self, key: &str, value: &str) -> Result<bool> {
        let path = self.record_path(key);

        let mut options = fs::OpenOptions::new();
        options.write(true).create_new(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let mut file = match options.open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => return Ok(false),
            Err(e) => return Err(e.into()),
        };

        if let Err(e) = file.write_all(value.as_bytes()).and_then(|()| file.sync_all()) {
            let _ = fs::remove_file(&path);
            return Err(e.into());
        }
        Ok(true)
    }

    /// Write `value` into a fresh, uniquely-named temp file next to the
    /// records.  The caller is responsible for moving or deleting it.
    fn write_temp(&self, key: &str, value: &str) -> Result<PathBuf> {
        let tmp_path = self.dir.join(format!(
            ".{key}.{}-{}.tmp",
            std::process::id(),
            TEMP_SEQ.fetch_add(1, Ordering::Relaxed)
        ));

        let mut options = fs::OpenOptions::new();
        options.write(true).create_new(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let mut file = options.open(&tmp_path)?;
        file.write_all(value.as_bytes())?;
        file.sync_all()?;
        Ok(tmp_path)
    }
}

impl Backend for FileBackend {
    fn read(&self, key: &str) -> Result<Option<String>> {
        validate_key_name(key)?;
        match fs::read_to_string(self.record_path(key)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        validate_key_name(key)?;
        let _guard = self.lock.lock();

        let tmp_path = self.write_temp(key, value)?;
        if let Err(e) = fs::rename(&tmp_path, self.record_path(key)) {
            let _ = fs::remove_file(&tmp_path);
            return Err(e.into());
        }
        Ok(())
    }

    fn write_if_absent(&self, key: &str, value: &str) -> Result<bool> {
        validate_key_name(key)?;
        let _guard = self.lock.lock();

        let tmp_path = self.write_temp(key, value)?;
        let linked = fs::hard_link(&tmp_path, self.record_path(key));
        let _ = fs::remove_file(&tmp_path);

        match linked {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Ok(false),
            Err(e) if lacks_hard_links(e.kind()) => {
                debug!(key, error = %e, "hard links unavailable, using exclusive create");
                self.create_exclusive(key, value)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn remove(&self, key: &str) -> Result<()> {
        validate_key_name(key)?;
        let _guard = self.lock.lock();
        match fs::remove_file(self.record_path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn keys(&self) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(RECORD_EXT) {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            if validate_key_name(stem).is_ok() {
                keys.push(stem.to_string());
            }
        }
        keys.sort();
        Ok(keys)
    }
}
