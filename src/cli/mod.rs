//! CLI module — Clap argument parser, output helpers, and command implementations.

pub mod commands;
pub mod output;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use crate::config::Settings;
use crate::crypto::{CryptoEnvelope, KeyVault};
use crate::errors::Result;
use crate::session::{DemoRoster, SessionService, SystemClock};
use crate::store::{Backend, FileBackend, SecureStore};

/// HseVault CLI: encrypted local records and sessions for HSE tools.
#[derive(Parser)]
#[command(
    name = "hsevault",
    about = "Encrypted local record store and session manager",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Record directory (default: from .hsevault.toml, else .hsevault)
    #[arg(long, env = "HSEVAULT_STORE_DIR", global = true)]
    pub store_dir: Option<String>,

    /// Show debug logging on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// All available subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Sign in (unknown identifiers are admitted as guests)
    Login {
        /// Login identifier (e.g. sarah.jones or sarah.jones@example.com)
        identifier: String,
        /// Keep the session for a year instead of a day
        #[arg(long)]
        remember_me: bool,
    },

    /// Sign out and drop the session records
    Logout,

    /// Show the signed-in identity
    Whoami,

    /// Switch to another demo profile (demo sessions only)
    Switch {
        /// Profile id (omit to list available profiles)
        profile_id: Option<String>,
    },

    /// Store a record (value is JSON, or taken as a plain string)
    Set {
        /// Record key (e.g. observations)
        key: String,
        /// Record value (omit to read stdin or prompt)
        value: Option<String>,
    },

    /// Print a record's value
    Get {
        /// Record key
        key: String,
    },

    /// Delete a record
    Remove {
        /// Record key
        key: String,
    },

    /// Delete every record (key material is kept)
    Clear {
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// List stored record keys
    List,

    /// Show key and session status
    Status,

    /// View the audit log of session and record operations
    Audit {
        /// Number of entries to show (default: 50)
        #[arg(long, default_value = "50")]
        last: usize,
        /// Show entries since a duration ago (e.g. 7d, 24h, 30m)
        #[arg(long)]
        since: Option<String>,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for (bash, zsh, fish, powershell)
        shell: String,
    },
}

/// Services wired together for one CLI invocation.
pub struct AppContext {
    pub settings: Settings,
    pub store_dir: PathBuf,
    pub store: Arc<SecureStore>,
    pub session: SessionService,
}

impl AppContext {
    /// Load settings from the working directory and build the service
    /// stack over the record directory.
    pub fn open(cli: &Cli) -> Result<Self> {
        let cwd = std::env::current_dir()?;
        let mut settings = Settings::load(&cwd)?;
        if let Some(dir) = &cli.store_dir {
            settings.store_dir = dir.clone();
        }
        let store_dir = settings.store_path(&cwd);

        let backend: Arc<dyn Backend> = Arc::new(FileBackend::open(&store_dir)?);
        let vault = Arc::new(KeyVault::new(Arc::clone(&backend), &settings.key_slot)?);
        let store = Arc::new(SecureStore::new(
            Arc::new(CryptoEnvelope::new(vault)),
            backend,
        ));
        let session = SessionService::new(
            Arc::clone(&store),
            Arc::new(DemoRoster::new()),
            Arc::new(SystemClock),
            settings.session_policy(),
        );

        Ok(Self {
            settings,
            store_dir,
            store,
            session,
        })
    }

    /// Record an audit event attributed to the signed-in identity.
    pub fn audit(&self, op: &str, key: Option<&str>, details: Option<&str>) {
        let subject = self.session.current_user().ok().flatten().map(|i| i.id);
        crate::audit::log_audit(&self.store_dir, op, subject.as_deref(), key, details);
    }
}

/// Parse a record value: JSON if it parses, otherwise a plain string.
pub fn parse_value(raw: &str) -> serde_json::Value {
    serde_json::from_str(raw).unwrap_or_else(|_| serde_json::Value::String(raw.to_string()))
}
