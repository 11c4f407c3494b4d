//! Error types for lifecycle-policy

/// Result type for lifecycle-policy operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when constructing policy documents
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A policy document must be a JSON object at the top level
    #[error("Policy document must be a JSON object, got {found}")]
    NotAnObject { found: &'static str },

    /// JSON serialization/deserialization error
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
