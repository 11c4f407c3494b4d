//! Workflow error types

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Config file not found: {}", path.display())]
    ConfigNotFound { path: PathBuf },

    #[error("Invalid lifecycle configuration in {}", path.display())]
    InvalidPolicy { path: PathBuf },

    #[error("Invalid bucket name: '{bucket}'")]
    InvalidBucket { bucket: String },

    #[error("Verification failed for bucket '{bucket}': stored configuration differs from the published one")]
    VerificationMismatch { bucket: String },

    #[error(transparent)]
    Store(#[from] lifecycle_store::StoreError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
