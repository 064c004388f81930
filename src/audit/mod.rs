//! Audit log — SQLite-based history of session and record operations.
//!
//! Stores a row for every login, logout, profile switch and record write
//! in a local SQLite database at `<store_dir>/audit.db`.
//!
//! Designed for graceful degradation: if the database can't be opened or
//! written to, operations silently continue without logging.  Without the
//! `audit-log` feature, `log_audit` is a no-op.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

#[cfg(feature = "audit-log")]
use rusqlite::Connection;

#[cfg(feature = "audit-log")]
use crate::errors::HseVaultError;
use crate::errors::Result;

/// A single audit log entry.
#[derive(Debug, Clone)]
pub struct AuditEntry {
    pub id: i64,
    pub timestamp: DateTime<Utc>,
    pub operation: String,
    /// Identity id of whoever was signed in, if anyone.
    pub subject: Option<String>,
    pub key_name: Option<String>,
    pub details: Option<String>,
}

/// Return the path to the audit database (for testing/display).
pub fn db_path(store_dir: &Path) -> PathBuf {
    store_dir.join("audit.db")
}

/// SQLite-backed audit log.
#[cfg(feature = "audit-log")]
pub struct AuditLog {
    conn: Connection,
}

#[cfg(feature = "audit-log")]
impl AuditLog {
    /// Open (or create) the audit database at `<store_dir>/audit.db`.
    ///
    /// Returns `None` if the database can't be opened — callers should
    /// treat this as "audit logging unavailable" and continue normally.
    pub fn open(store_dir: &Path) -> Option<Self> {
        let path = db_path(store_dir);
        let conn = Connection::open(&path).ok()?;

        // Set restrictive permissions on the audit database (owner-only).
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            let _ = std::fs::set_permissions(&path, perms);
        }

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS audit_log (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                timestamp   TEXT NOT NULL,
                operation   TEXT NOT NULL,
                subject     TEXT,
                key_name    TEXT,
                details     TEXT
            );",
        )
        .ok()?;

        Some(Self { conn })
    }

    /// Record an operation. Fire-and-forget — errors are silently ignored.
    pub fn log(
        &self,
        operation: &str,
        subject: Option<&str>,
        key_name: Option<&str>,
        details: Option<&str>,
    ) {
        let now = Utc::now().to_rfc3339();
        let _ = self.conn.execute(
            "INSERT INTO audit_log (timestamp, operation, subject, key_name, details)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            rusqlite::params![now, operation, subject, key_name, details],
        );
    }

    /// Query recent audit entries.
    ///
    /// - `limit`: maximum number of entries to return (most recent first).
    /// - `since`: if provided, only return entries newer than this timestamp.
    pub fn query(&self, limit: usize, since: Option<DateTime<Utc>>) -> Result<Vec<AuditEntry>> {
        let limit_i64 = i64::try_from(limit).unwrap_or(i64::MAX);
        // RFC 3339 strings from `to_rfc3339` sort chronologically.
        let since_str = since.map_or_else(String::new, |ts| ts.to_rfc3339());

        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, timestamp, operation, subject, key_name, details
                 FROM audit_log
                 WHERE timestamp >= ?1
                 ORDER BY id DESC
                 LIMIT ?2",
            )
            .map_err(|e| HseVaultError::AuditError(format!("query prepare: {e}")))?;

        let rows = stmt
            .query_map(rusqlite::params![since_str, limit_i64], |row| {
                let ts_str: String = row.get(1)?;
                let timestamp = DateTime::parse_from_rfc3339(&ts_str)
                    .map_or_else(|_| Utc::now(), |dt| dt.with_timezone(&Utc));

                Ok(AuditEntry {
                    id: row.get(0)?,
                    timestamp,
                    operation: row.get(2)?,
                    subject: row.get(3)?,
                    key_name: row.get(4)?,
                    details: row.get(5)?,
                })
            })
            .map_err(|e| HseVaultError::AuditError(format!("query exec: {e}")))?;

        let mut entries = Vec::new();
        for row in rows {
            entries.push(row.map_err(|e| HseVaultError::AuditError(format!("row parse: {e}")))?);
        }

        Ok(entries)
    }
}

/// Convenience helper: log an audit event into `<store_dir>/audit.db`.
///
/// Opens the audit database, logs the event, and silently ignores any errors.
/// This is safe to call from any command — it never fails the parent operation.
pub fn log_audit(
    store_dir: &Path,
    op: &str,
    subject: Option<&str>,
    key: Option<&str>,
    details: Option<&str>,
) {
    #[cfg(feature = "audit-log")]
    if let Some(audit) = AuditLog::open(store_dir) {
        audit.log(op, subject, key, details);
    }

    #[cfg(not(feature = "audit-log"))]
    let _ = (store_dir, op, subject, key, details);
}

/// Read recent entries, if audit logging is compiled in.
pub fn recent_entries(
    store_dir: &Path,
    limit: usize,
    since: Option<DateTime<Utc>>,
) -> Result<Vec<AuditEntry>> {
    #[cfg(feature = "audit-log")]
    {
        let audit = AuditLog::open(store_dir)
            .ok_or_else(|| HseVaultError::AuditError("failed to open audit database".into()))?;
        audit.query(limit, since)
    }

    #[cfg(not(feature = "audit-log"))]
    {
        let _ = (store_dir, limit, since);
        Err(crate::errors::HseVaultError::AuditError(
            "audit support not compiled — rebuild with `--features audit-log`".into(),
        ))
    }
}
