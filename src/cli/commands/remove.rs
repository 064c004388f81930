//! `hsevault remove` — delete a record.

use crate::cli::output;
use crate::cli::{AppContext, Cli};
use crate::errors::Result;

/// Execute the `remove` command.
pub fn execute(cli: &Cli, key: &str) -> Result<()> {
    let ctx = AppContext::open(cli)?;

    if !ctx.store.contains(key)? {
        output::info(&format!("No record stored under '{key}'."));
        return Ok(());
    }

    ctx.store.remove(key)?;
    ctx.audit("remove", Some(key), None);
    output::success(&format!("Removed record '{key}'"));

    Ok(())
}
