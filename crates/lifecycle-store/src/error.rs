//! Error types for lifecycle-store

/// Result type for store operations
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur at the storage boundary
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Required environment variables were not set
    #[error("Missing required environment variables: {missing}")]
    MissingEnv { missing: String },

    /// The resolved configuration cannot be used to build a client
    #[error("Invalid store configuration: {message}")]
    Config { message: String },

    /// HTTP-level failure (connect, timeout, invalid URL)
    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    /// The service answered with a non-success status
    #[error("{operation} for bucket '{bucket}' failed with HTTP {status} ({code})")]
    Api {
        operation: &'static str,
        bucket: String,
        status: u16,
        code: String,
    },

    /// The lifecycle XML payload could not be produced or understood
    #[error("Lifecycle wire format error: {message}")]
    Wire { message: String },
}

impl StoreError {
    pub(crate) fn wire(message: impl Into<String>) -> Self {
        Self::Wire {
            message: message.into(),
        }
    }
}
