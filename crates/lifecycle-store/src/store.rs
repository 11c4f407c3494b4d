//! The storage trait the workflow depends on

use lifecycle_policy::PolicyDocument;

use crate::error::Result;

/// Access to a bucket's lifecycle configuration
///
/// Implementations are synchronous and single-attempt: a failed call is
/// reported as-is, with no retry or backoff at this layer. A bucket with no
/// lifecycle configuration is a well-defined state and maps to `Ok(None)`,
/// not an error.
pub trait PolicyStore {
    /// Fetch the bucket's current lifecycle configuration
    fn fetch_policy(&self, bucket: &str) -> Result<Option<PolicyDocument>>;

    /// Replace the bucket's lifecycle configuration
    fn publish_policy(&self, bucket: &str, policy: &PolicyDocument) -> Result<()>;
}
