//! Lifecycle reconciliation workflow
//!
//! Ties the policy algebra (`lifecycle-policy`) to a
//! [`PolicyStore`](lifecycle_store::PolicyStore) backend and drives a
//! bucket to the merged desired state:
//!
//! 1. load and validate the local configuration file
//! 2. fetch the current remote configuration
//! 3. merge with local precedence and compare canonically
//! 4. if they differ: back up the remote state, publish the merged
//!    document, then re-fetch and verify it round-tripped intact
//!
//! Backups are best-effort; a failed snapshot logs a warning and the update
//! proceeds. A failed post-publish verification is an error in its own
//! right, distinct from transport failures.

pub mod backup;
pub mod error;
pub mod loader;
pub mod reconcile;
pub mod selftest;

pub use backup::BackupManager;
pub use error::{Error, Result};
pub use loader::load_policy;
pub use reconcile::{ApplyOutcome, ApplyStatus, ReconcileEngine};
