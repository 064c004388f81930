//! `hsevault completions` — generate shell completion scripts.
//!
//! Usage:
//!   hsevault completions bash > ~/.bash_completion.d/hsevault
//!   hsevault completions zsh
//!   hsevault completions fish
//!   hsevault completions powershell

use std::io;

use clap::{CommandFactory, ValueEnum};
use clap_complete::{generate, Shell};

use crate::cli::Cli;
use crate::errors::{HseVaultError, Result};

/// Execute the `completions` command.
pub fn execute(shell: &str) -> Result<()> {
    let shell = parse_shell(shell)?;
    let mut cmd = Cli::command();
    let bin = cmd.get_name().to_string();
    generate(shell, &mut cmd, bin, &mut io::stdout());
    Ok(())
}

/// Parse a shell name (case-insensitive, `ps` for PowerShell).
fn parse_shell(name: &str) -> Result<Shell> {
    let name = name.trim();
    if name.eq_ignore_ascii_case("ps") {
        return Ok(Shell::PowerShell);
    }
    <Shell as ValueEnum>::from_str(name, true).map_err(|_| {
        HseVaultError::CommandFailed(format!(
            "unknown shell '{name}' — supported: {}",
            supported_shells()
        ))
    })
}

fn supported_shells() -> String {
    Shell::value_variants()
        .iter()
        .filter_map(Shell::to_possible_value)
        .map(|v| v.get_name().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
