//! `hsevault status` — key fingerprint and session state.

use console::style;

use crate::cli::{AppContext, Cli};
use crate::errors::Result;

/// Execute the `status` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let ctx = AppContext::open(cli)?;

    let fingerprint = ctx
        .store
        .envelope()
        .vault()
        .fingerprint()?
        .unwrap_or_else(|| "not created yet".to_string());

    let user = ctx.session.current_user()?;
    let demo = ctx.session.is_demo_session()?;

    println!("{} {}", style("Store:").bold(), ctx.store_dir.display());
    println!("{} {fingerprint}", style("Key:").bold());
    println!("{} {}", style("Records:").bold(), ctx.store.keys()?.len());
    println!("{} {:?}", style("Session:").bold(), ctx.session.state());
    match user {
        Some(identity) => println!(
            "{} {} ({}){}",
            style("User:").bold(),
            identity.display_name,
            identity.role,
            if demo { " [demo]" } else { "" }
        ),
        None => println!("{} -", style("User:").bold()),
    }

    Ok(())
}
