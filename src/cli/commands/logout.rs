//! `hsevault logout` — end the session.

use crate::cli::output;
use crate::cli::{AppContext, Cli};
use crate::errors::Result;

/// Execute the `logout` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let ctx = AppContext::open(cli)?;

    // Attribute the entry before the identity record is gone.
    ctx.audit("logout", None, None);
    ctx.session.logout()?;

    output::success("Signed out.");
    Ok(())
}
