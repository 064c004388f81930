//! One module per subcommand.

pub mod audit_cmd;
pub mod clear;
pub mod completions;
pub mod get;
pub mod list;
pub mod login;
pub mod logout;
pub mod remove;
pub mod set;
pub mod status;
pub mod switch;
pub mod whoami;
