//! loanfit - Main Entry Point
//!
//! Interactive dashboard by default, with `build` and `info` subcommands.

use clap::Parser;
use loanfit::cli::{cmd_build, cmd_info, cmd_interactive, load_config, Cli, Commands};

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "loanfit=info".into()),
        )
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Some(Commands::Build(args)) => {
            cmd_build(&args, &config)?;
        }
        Some(Commands::Info { data }) => {
            cmd_info(data.as_deref(), &config)?;
        }
        None => {
            cmd_interactive(&config)?;
        }
    }

    Ok(())
}
