//! `hsevault login` — start a session.

use crate::cli::output;
use crate::cli::{AppContext, Cli};
use crate::errors::{HseVaultError, Result};

/// Execute the `login` command.
pub fn execute(cli: &Cli, identifier: &str, remember_me: bool) -> Result<()> {
    let ctx = AppContext::open(cli)?;

    let outcome = ctx.session.login(identifier, remember_me)?.ok_or_else(|| {
        HseVaultError::CommandFailed(format!(
            "cannot sign in as '{identifier}' — identifiers may only contain letters, digits, '.', '_' and '-'"
        ))
    })?;

    let details = format!("remember_me={remember_me}");
    ctx.audit("login", None, Some(&details));

    output::success(&format!(
        "Signed in as {} ({})",
        outcome.identity.display_name, outcome.identity.role
    ));
    if outcome.identity.is_guest() {
        output::warning("Unknown identifier — signed in with guest access.");
    }
    if outcome.is_demo {
        output::tip("Demo session: run `hsevault switch` to try other profiles.");
    }

    Ok(())
}
