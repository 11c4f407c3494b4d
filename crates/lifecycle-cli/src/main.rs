//! Lifecycle Manager CLI
//!
//! The command-line interface for reconciling bucket lifecycle
//! configurations.

mod cli;
mod commands;
mod error;

use std::env;

use clap::Parser;
use colored::Colorize;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use cli::{Cli, Commands};
use error::Result;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let verbose = cli.verbose || debug_env_enabled();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(if verbose { Level::DEBUG } else { Level::INFO })
        .with_target(verbose)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");
    if verbose {
        tracing::debug!("Verbose mode enabled");
    }

    match cli.command {
        Some(cmd) => execute_command(cmd),
        None => {
            println!("{} Lifecycle Manager CLI", "lifecycle".green().bold());
            println!();
            println!("Run {} for available commands.", "lifecycle --help".cyan());
            Ok(())
        }
    }
}

fn execute_command(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Apply {
            bucket,
            config_file,
            backup_dir,
        } => commands::apply::run(&bucket, &config_file, backup_dir.as_deref()),
        Commands::Test => commands::selftest::run(),
    }
}

/// Honor the conventional DEBUG environment variable alongside --verbose.
fn debug_env_enabled() -> bool {
    env::var("DEBUG").is_ok_and(|v| is_truthy(&v))
}

fn is_truthy(value: &str) -> bool {
    ["true", "1", "yes", "on"]
        .iter()
        .any(|t| value.eq_ignore_ascii_case(t))
}
