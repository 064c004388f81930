//! `hsevault set` — encrypt and store a record.

use std::io::{self, IsTerminal, Read};

use crate::cli::output;
use crate::cli::{parse_value, AppContext, Cli};
use crate::errors::{HseVaultError, Result};

/// Execute the `set` command.
pub fn execute(cli: &Cli, key: &str, value: Option<&str>) -> Result<()> {
    // Determine the record value from one of three sources.
    let raw = if let Some(v) = value {
        // Source 1: Inline value on the command line.
        v.to_string()
    } else if !io::stdin().is_terminal() {
        // Source 2: Piped input (stdin is not a terminal).
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        buf.trim_end().to_string()
    } else {
        // Source 3: Interactive prompt.
        dialoguer::Input::<String>::new()
            .with_prompt(format!("Value for {key}"))
            .interact_text()
            .map_err(|e| HseVaultError::CommandFailed(format!("input prompt: {e}")))?
    };

    let ctx = AppContext::open(cli)?;
    let existed = ctx.store.contains(key)?;

    // Strict write so the user learns about failures.
    ctx.store.try_set(key, &parse_value(&raw))?;

    let op_detail = if existed { "updated" } else { "added" };
    ctx.audit("set", Some(key), Some(op_detail));
    output::success(&format!("Record '{key}' {op_detail}"));

    Ok(())
}
