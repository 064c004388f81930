//! `hsevault whoami` — show the signed-in identity.

use crate::cli::output;
use crate::cli::{AppContext, Cli};
use crate::errors::{HseVaultError, Result};

/// Execute the `whoami` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let ctx = AppContext::open(cli)?;

    let identity = ctx
        .session
        .current_user()?
        .ok_or(HseVaultError::NotAuthenticated)?;

    output::print_identity(&identity);
    if let Some(token) = ctx.session.session()? {
        output::tip(&format!(
            "Session expires {}",
            token.expires_at.format("%Y-%m-%d %H:%M:%S UTC")
        ));
    }

    Ok(())
}
