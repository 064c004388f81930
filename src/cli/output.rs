//! Colored terminal output helpers.
//!
//! All user-facing output goes through these functions so we get
//! consistent styling across every command.

use comfy_table::{ContentArrangement, Table};
use console::style;

use crate::session::Identity;

/// Print a green success message: "check_mark {msg}"
pub fn success(msg: &str) {
    println!("{} {}", style("\u{2713}").green().bold(), msg);
}

/// Print a red error message: "x_mark {msg}"
pub fn error(msg: &str) {
    eprintln!("{} {}", style("\u{2717}").red().bold(), msg);
}

/// Print a yellow warning: "warning_sign {msg}"
pub fn warning(msg: &str) {
    eprintln!("{} {}", style("\u{26a0}").yellow().bold(), msg);
}

/// Print a blue info message: "info_sign {msg}"
pub fn info(msg: &str) {
    println!("{} {}", style("\u{2139}").blue().bold(), msg);
}

/// Print a dim tip/hint: "arrow {msg}"
pub fn tip(msg: &str) {
    println!("{} {}", style("\u{2192}").dim(), style(msg).dim());
}

/// Print one identity as a two-column table.
pub fn print_identity(identity: &Identity) {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.add_row(vec!["Name", identity.display_name.as_str()]);
    table.add_row(vec!["Id", identity.id.as_str()]);
    table.add_row(vec!["Role", identity.role.as_str()]);
    table.add_row(vec!["Department", identity.department.as_str()]);
    println!("{table}");
}

/// Print the profiles a demo session may switch to.
pub fn print_profiles_table(profiles: &[Identity]) {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Id", "Name", "Role", "Department"]);

    for p in profiles {
        table.add_row(vec![
            p.id.clone(),
            p.display_name.clone(),
            p.role.to_string(),
            p.department.clone(),
        ]);
    }

    println!("{table}");
}

/// Print the stored record keys.
pub fn print_records_table(keys: &[String]) {
    if keys.is_empty() {
        info("No records stored yet.");
        tip("Run `hsevault set <KEY> <VALUE>` to add your first record.");
        return;
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Record"]);
    for key in keys {
        table.add_row(vec![key.clone()]);
    }

    println!("{table}");
}
