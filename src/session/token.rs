//! Session tokens.
//!
//! A token renders as three dot-separated segments:
//!
//! ```text
//! base64url(header).base64url(payload).unsigned
//! ```
//!
//! The third segment is a constant marker, not a signature.  Nothing here
//! proves who minted a token; validity rests solely on the `exp`
//! timestamp.  Replacing the marker with a MAC over the first two
//! segments (and verifying it in `decode`) is required before any
//! production use.

use base64::engine::general_purpose::URL_SAFE_NO_PAD as BASE64URL;
use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::identity::{Identity, Role};
use crate::errors::{HseVaultError, Result};

/// Literal third segment of every token.
pub const UNSIGNED_MARKER: &str = "unsigned";

/// Fixed algorithm/type header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct TokenHeader {
    alg: String,
    typ: String,
}

impl TokenHeader {
    fn fixed() -> Self {
        Self {
            alg: "none".into(),
            typ: "JWT".into(),
        }
    }
}

/// Decoded token payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionToken {
    #[serde(rename = "sub")]
    pub subject: String,
    pub role: Role,
    #[serde(rename = "name")]
    pub display_name: String,
    #[serde(rename = "iat", with = "chrono::serde::ts_milliseconds")]
    pub issued_at: DateTime<Utc>,
    #[serde(rename = "exp", with = "chrono::serde::ts_milliseconds")]
    pub expires_at: DateTime<Utc>,
}

impl SessionToken {
    /// Mint a token for `identity` valid for `ttl` from `now`.
    pub fn mint(identity: &Identity, now: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            subject: identity.id.clone(),
            role: identity.role,
            display_name: identity.display_name.clone(),
            issued_at: now,
            expires_at: now + ttl,
        }
    }

    /// A token is expired once `now` is strictly past `expires_at`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// Render the three-segment string form.
    pub fn encode(&self) -> Result<String> {
        let header = serde_json::to_vec(&TokenHeader::fixed())
            .map_err(|e| HseVaultError::SerializationError(format!("token header: {e}")))?;
        let payload = serde_json::to_vec(self)
            .map_err(|e| HseVaultError::SerializationError(format!("token payload: {e}")))?;

        Ok(format!(
            "{}.{}.{UNSIGNED_MARKER}",
            BASE64URL.encode(header),
            BASE64URL.encode(payload)
        ))
    }

    /// Parse the three-segment string form.
    pub fn decode(token: &str) -> Result<Self> {
        let mut parts = token.split('.');
        let (Some(header), Some(payload), Some(marker), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(HseVaultError::InvalidToken(
                "expected three dot-separated segments".into(),
            ));
        };

        if marker != UNSIGNED_MARKER {
            return Err(HseVaultError::InvalidToken(format!(
                "unexpected third segment '{marker}'"
            )));
        }

        let header_bytes = BASE64URL
            .decode(header)
            .map_err(|e| HseVaultError::InvalidToken(format!("header encoding: {e}")))?;
        let parsed_header: TokenHeader = serde_json::from_slice(&header_bytes)
            .map_err(|e| HseVaultError::InvalidToken(format!("header: {e}")))?;
        if parsed_header != TokenHeader::fixed() {
            return Err(HseVaultError::InvalidToken(format!(
                "unsupported header alg={} typ={}",
                parsed_header.alg, parsed_header.typ
            )));
        }

        let payload_bytes = BASE64URL
            .decode(payload)
            .map_err(|e| HseVaultError::InvalidToken(format!("payload encoding: {e}")))?;
        serde_json::from_slice(&payload_bytes)
            .map_err(|e| HseVaultError::InvalidToken(format!("payload: {e}")))
    }
}
