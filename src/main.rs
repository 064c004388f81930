use clap::Parser;
use hsevault::cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();

    hsevault::logging::init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Login {
            ref identifier,
            remember_me,
        } => hsevault::cli::commands::login::execute(&cli, identifier, remember_me),
        Commands::Logout => hsevault::cli::commands::logout::execute(&cli),
        Commands::Whoami => hsevault::cli::commands::whoami::execute(&cli),
        Commands::Switch { ref profile_id } => {
            hsevault::cli::commands::switch::execute(&cli, profile_id.as_deref())
        }
        Commands::Set { ref key, ref value } => {
            hsevault::cli::commands::set::execute(&cli, key, value.as_deref())
        }
        Commands::Get { ref key } => hsevault::cli::commands::get::execute(&cli, key),
        Commands::Remove { ref key } => hsevault::cli::commands::remove::execute(&cli, key),
        Commands::Clear { force } => hsevault::cli::commands::clear::execute(&cli, force),
        Commands::List => hsevault::cli::commands::list::execute(&cli),
        Commands::Status => hsevault::cli::commands::status::execute(&cli),
        Commands::Audit { last, ref since } => {
            hsevault::cli::commands::audit_cmd::execute(&cli, last, since.as_deref())
        }
        Commands::Completions { ref shell } => hsevault::cli::commands::completions::execute(shell),
    };

    if let Err(e) = result {
        hsevault::cli::output::error(&e.to_string());
        std::process::exit(1);
    }
}
