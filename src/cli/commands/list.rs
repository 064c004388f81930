//! `hsevault list` — show stored record keys.

use crate::cli::output;
use crate::cli::{AppContext, Cli};
use crate::errors::Result;

/// Execute the `list` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let ctx = AppContext::open(cli)?;
    let keys = ctx.store.keys()?;

    output::info(&format!("{} record(s)", keys.len()));
    output::print_records_table(&keys);

    Ok(())
}
