//! `hsevault switch` — change demo profile without signing in again.

use crate::cli::output;
use crate::cli::{AppContext, Cli};
use crate::errors::{HseVaultError, Result};

/// Execute the `switch` command.
pub fn execute(cli: &Cli, profile_id: Option<&str>) -> Result<()> {
    let ctx = AppContext::open(cli)?;

    if !ctx.session.is_demo_session()? {
        return Err(HseVaultError::CommandFailed(
            "profile switching is only available in demo sessions".into(),
        ));
    }

    let Some(target) = profile_id else {
        output::info("Available demo profiles:");
        output::print_profiles_table(&ctx.session.profiles());
        output::tip("Run `hsevault switch <ID>` to change profile.");
        return Ok(());
    };

    let identity = ctx
        .session
        .switch_profile(target)?
        .ok_or_else(|| HseVaultError::CommandFailed(format!("unknown profile '{target}'")))?;

    ctx.audit("switch-profile", None, Some(&identity.id));
    output::success(&format!(
        "Now acting as {} ({})",
        identity.display_name, identity.role
    ));

    Ok(())
}
