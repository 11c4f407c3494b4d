//! Apply command implementation

use std::path::Path;

use colored::Colorize;

use lifecycle_core::{ApplyStatus, BackupManager, ReconcileEngine};
use lifecycle_store::{S3PolicyStore, StoreConfig};

use crate::error::Result;

/// Reconcile `bucket` with the configuration file at `config_file`.
pub fn run(bucket: &str, config_file: &Path, backup_dir: Option<&Path>) -> Result<()> {
    println!(
        "{} Reconciling lifecycle configuration for {}...",
        "=>".blue().bold(),
        bucket.cyan()
    );

    let config = StoreConfig::from_env()?;
    let store = S3PolicyStore::new(config)?;
    let backups = match backup_dir {
        Some(dir) => BackupManager::new(dir),
        None => BackupManager::in_temp_dir(),
    };

    let engine = ReconcileEngine::new(Box::new(store), backups);
    let outcome = engine.apply(bucket, config_file)?;

    match outcome.status {
        ApplyStatus::UpToDate => {
            println!(
                "{} Bucket {} is already up to date. Nothing published.",
                "OK".green().bold(),
                outcome.bucket.cyan()
            );
        }
        ApplyStatus::Verified => {
            println!(
                "{} Bucket {} updated and verified.",
                "UPDATED".green().bold(),
                outcome.bucket.cyan()
            );
        }
    }
    println!("   Finished at {}", outcome.completed_at.to_rfc3339());

    Ok(())
}
