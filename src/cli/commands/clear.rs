//! `hsevault clear` — delete every record, keeping the key material.

use dialoguer::Confirm;

use crate::cli::output;
use crate::cli::{AppContext, Cli};
use crate::errors::{HseVaultError, Result};

/// Execute the `clear` command.
pub fn execute(cli: &Cli, force: bool) -> Result<()> {
    let ctx = AppContext::open(cli)?;
    let count = ctx.store.keys()?.len();
    let signed_in = ctx.session.session()?.is_some();

    if count == 0 && !signed_in {
        output::info("Nothing to clear.");
        return Ok(());
    }

    // Unless --force is set, ask for confirmation before deleting.
    if !force {
        let prompt = if signed_in {
            format!("Delete all {count} record(s) and end the session?")
        } else {
            format!("Delete all {count} record(s)?")
        };
        let confirmed = Confirm::new()
            .with_prompt(prompt)
            .default(false)
            .interact()
            .map_err(|e| HseVaultError::CommandFailed(format!("confirm prompt: {e}")))?;

        if !confirmed {
            output::info("Cancelled.");
            return Ok(());
        }
    }

    // Attribute the entry before the session records disappear.
    let details = format!("{count} record(s)");
    ctx.audit("clear", None, Some(&details));
    ctx.store.clear()?;

    output::success(&format!("Cleared {count} record(s). Key material kept."));
    Ok(())
}
