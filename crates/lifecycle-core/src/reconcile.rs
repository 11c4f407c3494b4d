//! ReconcileEngine implementation
//!
//! The ReconcileEngine coordinates state between the local configuration
//! file (desired intents) and the remote bucket (actual lifecycle rules).

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;

use lifecycle_policy::{documents_equal, merge};
use lifecycle_store::PolicyStore;

use crate::backup::BackupManager;
use crate::error::{Error, Result};
use crate::loader::load_policy;

/// Terminal state of a successful apply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ApplyStatus {
    /// The remote configuration already matched the merged result
    UpToDate,
    /// The merged configuration was published and read back intact
    Verified,
}

impl std::fmt::Display for ApplyStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UpToDate => write!(f, "up to date"),
            Self::Verified => write!(f, "verified"),
        }
    }
}

/// Report from an apply operation
#[derive(Debug, Clone, Serialize)]
pub struct ApplyOutcome {
    /// Bucket the operation ran against
    pub bucket: String,
    /// Whether a publish took place
    pub updated: bool,
    /// Final status of the run
    pub status: ApplyStatus,
    /// When the run finished
    pub completed_at: DateTime<Utc>,
}

/// Engine driving a bucket's lifecycle configuration to the desired state
///
/// A single `apply` call performs:
/// - **load**: read and validate the local configuration file
/// - **fetch**: read the bucket's current configuration
/// - **merge + compare**: union the rule sets with local precedence and
///   test for canonical equality
/// - **publish + verify**: when they differ, snapshot the remote state,
///   write the merged document, and confirm it reads back unchanged
pub struct ReconcileEngine {
    store: Box<dyn PolicyStore>,
    backups: BackupManager,
}

impl ReconcileEngine {
    pub fn new(store: Box<dyn PolicyStore>, backups: BackupManager) -> Self {
        Self { store, backups }
    }

    /// Reconcile `bucket` with the configuration file at `config_path`.
    ///
    /// Converged buckets are left untouched; no mutating call is made. A
    /// failed snapshot is logged and skipped. A publish whose read-back
    /// differs from what was written fails with
    /// [`Error::VerificationMismatch`].
    pub fn apply(&self, bucket: &str, config_path: &Path) -> Result<ApplyOutcome> {
        validate_bucket_name(bucket)?;

        tracing::info!(bucket, config = %config_path.display(), "Starting lifecycle reconciliation");

        let local = load_policy(config_path)?;
        let remote = self.store.fetch_policy(bucket)?;
        match &remote {
            Some(policy) => {
                tracing::debug!(bucket, rules = policy.rules().len(), "Fetched remote configuration")
            }
            None => tracing::debug!(bucket, "Bucket has no lifecycle configuration"),
        }

        let merged = merge(&local, remote.as_ref());

        if documents_equal(remote.as_ref(), Some(&merged)) {
            tracing::info!(bucket, "Lifecycle configuration is already up to date");
            return Ok(self.outcome(bucket, ApplyStatus::UpToDate));
        }

        if let Some(current) = &remote {
            match self.backups.write_snapshot(bucket, current) {
                Ok(path) => {
                    tracing::info!(bucket, path = %path.display(), "Backed up remote configuration")
                }
                Err(err) => {
                    tracing::warn!(bucket, error = %err, "Could not back up remote configuration; continuing")
                }
            }
        }

        tracing::info!(bucket, rules = merged.rules().len(), "Publishing merged configuration");
        self.store.publish_policy(bucket, &merged)?;

        let readback = self.store.fetch_policy(bucket)?;
        if !documents_equal(readback.as_ref(), Some(&merged)) {
            return Err(Error::VerificationMismatch {
                bucket: bucket.to_string(),
            });
        }

        tracing::info!(bucket, "Lifecycle configuration updated and verified");
        Ok(self.outcome(bucket, ApplyStatus::Verified))
    }

    fn outcome(&self, bucket: &str, status: ApplyStatus) -> ApplyOutcome {
        ApplyOutcome {
            bucket: bucket.to_string(),
            updated: status == ApplyStatus::Verified,
            status,
            completed_at: Utc::now(),
        }
    }
}

/// Reject bucket names that cannot safely appear in request paths or
/// snapshot filenames.
fn validate_bucket_name(bucket: &str) -> Result<()> {
    let valid = !bucket.is_empty()
        && bucket
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '.' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(Error::InvalidBucket {
            bucket: bucket.to_string(),
        })
    }
}
