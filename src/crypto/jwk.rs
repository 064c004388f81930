//! JSON Web Key interchange for the vault key.
//!
//! The key is persisted as a symmetric ("oct") JWK so that it survives
//! reloads and can be inspected with standard tooling:
//!
//! ```text
//! {"kty":"oct","k":"<base64url>","alg":"A256GCM","ext":true,"key_ops":["encrypt","decrypt"]}
//! ```
//!
//! The exported form is plaintext.  The root key cannot encrypt itself,
//! so anyone who can read the backend can read the key.

use base64::engine::general_purpose::URL_SAFE_NO_PAD as BASE64URL;
use base64::Engine;
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, Zeroizing};

use super::key::{SymmetricKey, KEY_LEN};
use crate::errors::{HseVaultError, Result};

const KTY_OCT: &str = "oct";
const ALG_A256GCM: &str = "A256GCM";

/// Serialized shape of an exported key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Jwk {
    pub kty: String,
    pub k: String,
    pub alg: String,
    #[serde(default)]
    pub ext: bool,
    #[serde(default)]
    pub key_ops: Vec<String>,
}

impl Drop for Jwk {
    fn drop(&mut self) {
        self.k.zeroize();
    }
}

/// Export `key` to its JWK JSON string.
pub fn export_key(key: &SymmetricKey) -> Result<Zeroizing<String>> {
    let jwk = Jwk {
        kty: KTY_OCT.into(),
        k: BASE64URL.encode(key.as_bytes()),
        alg: ALG_A256GCM.into(),
        ext: true,
        key_ops: vec!["encrypt".into(), "decrypt".into()],
    };
    serde_json::to_string(&jwk)
        .map(Zeroizing::new)
        .map_err(|e| HseVaultError::SerializationError(format!("key export: {e}")))
}

/// Import a key from its JWK JSON string.
///
/// Any parse or validation problem is a `KeyImportFailure`.
pub fn import_key(raw: &str) -> Result<SymmetricKey> {
    let jwk: Jwk = serde_json::from_str(raw)
        .map_err(|e| HseVaultError::KeyImportFailure(format!("not a valid JWK: {e}")))?;

    if jwk.kty != KTY_OCT {
        return Err(HseVaultError::KeyImportFailure(format!(
            "unsupported key type '{}', expected '{KTY_OCT}'",
            jwk.kty
        )));
    }
    if jwk.alg != ALG_A256GCM {
        return Err(HseVaultError::KeyImportFailure(format!(
            "unsupported algorithm '{}', expected '{ALG_A256GCM}'",
            jwk.alg
        )));
    }

    let decoded = Zeroizing::new(
        BASE64URL
            .decode(jwk.k.as_bytes())
            .map_err(|e| HseVaultError::KeyImportFailure(format!("key material: {e}")))?,
    );
    if decoded.len() != KEY_LEN {
        return Err(HseVaultError::KeyImportFailure(format!(
            "key must be {KEY_LEN} bytes, got {}",
            decoded.len()
        )));
    }

    let mut bytes = [0u8; KEY_LEN];
    bytes.copy_from_slice(&decoded);
    let key = SymmetricKey::from_bytes(bytes);
    bytes.zeroize();
    Ok(key)
}
