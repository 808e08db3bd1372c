//! alpaca CLI
//!
//! Command-line front end for synchronizing configuration repositories and
//! inspecting how namespace layers resolve into a property chain.

mod cli;
mod commands;
mod error;

use std::time::Duration;

use clap::Parser;
use colored::Colorize;

use cli::{Cli, Commands};
use commands::SyncArgs;
use error::{CliError, Result};

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        let mut source = std::error::Error::source(&e);
        while let Some(cause) = source {
            eprintln!("  {}: {}", "caused by".dimmed(), cause);
            source = std::error::Error::source(cause);
        }
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    alpaca_core::logging::init_with_default(default_level)
        .map_err(|e| CliError::user(format!("Failed to set up logging: {e}")))?;
    tracing::debug!(verbose = cli.verbose, "Logging initialized");

    match cli.command {
        Some(cmd) => execute_command(cmd),
        None => {
            println!("{} layered configuration resolver", "alpaca".green().bold());
            println!();
            println!("Run {} for available commands.", "alpaca --help".cyan());
            Ok(())
        }
    }
}

fn execute_command(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Sync {
            uri,
            basedir,
            label,
            username,
            password,
            proxy,
            timeout,
        } => {
            commands::run_sync(SyncArgs {
                uri,
                basedir,
                label,
                username,
                password,
                proxy,
                timeout: Duration::from_secs(timeout),
            })?;
        }
        Commands::Plan {
            app,
            component,
            profiles,
        } => {
            commands::run_plan(app.as_deref(), component.as_deref(), &profiles)?;
        }
        Commands::Resolve {
            app,
            profiles,
            snapshot,
            keys,
        } => {
            commands::run_resolve(&app, &profiles, &snapshot, &keys)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_cli_error_user() {
        let error = crate::error::CliError::user("test error");
        assert_eq!(format!("{}", error), "test error");
    }
}
