//! `hsevault get` — decrypt and print a record.

use crate::cli::{AppContext, Cli};
use crate::errors::{HseVaultError, Result};
use crate::store::Lookup;

/// Execute the `get` command.
pub fn execute(cli: &Cli, key: &str) -> Result<()> {
    let ctx = AppContext::open(cli)?;

    match ctx.store.lookup::<serde_json::Value>(key)? {
        Lookup::Found(serde_json::Value::String(s)) => println!("{s}"),
        Lookup::Found(value) => {
            let pretty = serde_json::to_string_pretty(&value)
                .map_err(|e| HseVaultError::SerializationError(e.to_string()))?;
            println!("{pretty}");
        }
        Lookup::Absent => {
            return Err(HseVaultError::CommandFailed(format!(
                "no record stored under '{key}'"
            )))
        }
        Lookup::Corrupted => {
            return Err(HseVaultError::CommandFailed(format!(
                "record '{key}' is corrupted and cannot be decrypted"
            )))
        }
    }

    Ok(())
}
