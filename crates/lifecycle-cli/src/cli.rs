//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Lifecycle Manager - Reconcile S3 bucket lifecycle configurations
#[derive(Parser, Debug)]
#[command(name = "lifecycle")]
#[command(author, version, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Apply a lifecycle configuration file to a bucket
    ///
    /// Merges the file's rules with the bucket's current rules (the file
    /// wins on conflicting rule IDs), publishes the result if anything
    /// changed, and verifies the stored configuration afterwards.
    Apply {
        /// Bucket to reconcile
        bucket: String,

        /// Path to the lifecycle configuration JSON file
        config_file: PathBuf,

        /// Directory for pre-update backups (defaults to the OS temp dir)
        #[arg(long)]
        backup_dir: Option<PathBuf>,
    },

    /// Run the embedded self-test suite (no bucket access)
    Test,
}
