//! Local configuration loading
//!
//! Reads the desired lifecycle configuration from a JSON file and validates
//! it before anything touches the network.

use std::fs;
use std::path::Path;

use lifecycle_policy::{PolicyDocument, validate};
use serde_json::Value;

use crate::error::{Error, Result};

/// Load and validate a lifecycle configuration from `path`.
///
/// The file must hold a JSON object that passes structural validation; a
/// bucket with no desired rules is expressed as `{"Rules": []}`.
pub fn load_policy(path: &Path) -> Result<PolicyDocument> {
    if !path.exists() {
        return Err(Error::ConfigNotFound {
            path: path.to_path_buf(),
        });
    }

    let content = fs::read_to_string(path)?;
    let value: Value = serde_json::from_str(&content)?;

    if !value.is_object() || !validate(Some(&value)) {
        return Err(Error::InvalidPolicy {
            path: path.to_path_buf(),
        });
    }

    let policy = PolicyDocument::from_value(value).map_err(|_| Error::InvalidPolicy {
        path: path.to_path_buf(),
    })?;

    tracing::debug!(
        path = %path.display(),
        rules = policy.rules().len(),
        "Loaded lifecycle configuration"
    );
    Ok(policy)
}
