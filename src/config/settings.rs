use std::path::{Path, PathBuf};

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::crypto::DEFAULT_KEY_SLOT;
use crate::errors::{HseVaultError, Result};
use crate::session::SessionPolicy;

/// Project-level configuration, loaded from `.hsevault.toml`.
///
/// Every field has a sensible default so HseVault works out-of-the-box
/// without any config file at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Directory (relative to project root) holding the record files.
    #[serde(default = "default_store_dir")]
    pub store_dir: String,

    /// Backend name of the key slot.
    #[serde(default = "default_key_slot")]
    pub key_slot: String,

    /// Application-wide demo flag (enables profile switching).
    #[serde(default = "default_demo_mode")]
    pub demo_mode: bool,

    /// Lifetime of a normal session in hours (default: 24).
    #[serde(default = "default_session_ttl_hours")]
    pub session_ttl_hours: u32,

    /// Lifetime of a remembered session in days (default: 365).
    #[serde(default = "default_remember_me_days")]
    pub remember_me_days: u32,
}

// ── Serde default helpers ────────────────────────────────────────────

fn default_store_dir() -> String {
    ".hsevault".to_string()
}

fn default_key_slot() -> String {
    DEFAULT_KEY_SLOT.to_string()
}

fn default_demo_mode() -> bool {
    true
}

fn default_session_ttl_hours() -> u32 {
    24
}

fn default_remember_me_days() -> u32 {
    365
}

// ── Implementation ───────────────────────────────────────────────────

impl Default for Settings {
    fn default() -> Self {
        Self {
            store_dir: default_store_dir(),
            key_slot: default_key_slot(),
            demo_mode: default_demo_mode(),
            session_ttl_hours: default_session_ttl_hours(),
            remember_me_days: default_remember_me_days(),
        }
    }
}

impl Settings {
    /// Name of the config file we look for in the project root.
    const FILE_NAME: &'static str = ".hsevault.toml";

    /// Load settings from `<project_dir>/.hsevault.toml`.
    ///
    /// If the file does not exist, sensible defaults are returned.
    /// If the file exists but cannot be parsed, an error is returned.
    pub fn load(project_dir: &Path) -> Result<Self> {
        let config_path = project_dir.join(Self::FILE_NAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path)?;

        let settings: Settings = toml::from_str(&contents).map_err(|e| {
            HseVaultError::ConfigError(format!("Failed to parse {}: {e}", config_path.display()))
        })?;

        settings.validate()?;
        Ok(settings)
    }

    /// Reject lifetimes that would make every session expire immediately.
    fn validate(&self) -> Result<()> {
        if self.session_ttl_hours == 0 {
            return Err(HseVaultError::ConfigError(
                "session_ttl_hours must be at least 1".into(),
            ));
        }
        if self.remember_me_days == 0 {
            return Err(HseVaultError::ConfigError(
                "remember_me_days must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Full path of the record directory.
    ///
    /// Example: `project_dir/.hsevault`
    pub fn store_path(&self, project_dir: &Path) -> PathBuf {
        project_dir.join(&self.store_dir)
    }

    /// Convert the session settings into a service policy.
    pub fn session_policy(&self) -> SessionPolicy {
        SessionPolicy {
            session_ttl: Duration::hours(i64::from(self.session_ttl_hours)),
            remember_me_ttl: Duration::days(i64::from(self.remember_me_days)),
            demo_mode: self.demo_mode,
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────
