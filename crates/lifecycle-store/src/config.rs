//! Environment-driven store configuration
//!
//! Credential and endpoint resolution happens entirely at this boundary,
//! before the reconciliation engine is constructed. The core never inspects
//! the environment.
//!
//! Recognized variables:
//!
//! - `AWS_ACCESS_KEY_ID` (required)
//! - `AWS_SECRET_ACCESS_KEY` (required)
//! - `S3_ENDPOINT` (required) — base URL of the S3-compatible service
//! - `AWS_DEFAULT_REGION` (optional, defaults to `us-east-1`)
//! - `AWS_VERIFY_SSL` (optional, defaults to `false`)
//! - `S3_CA_BUNDLE` (optional) — PEM bundle path, only honored when SSL
//!   verification is enabled

use std::env;

use crate::error::{Result, StoreError};
use crate::sigv4::Credentials;

const DEFAULT_REGION: &str = "us-east-1";

/// Resolved configuration for the S3 store
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub credentials: Credentials,
    pub endpoint: String,
    pub region: String,
    pub verify_ssl: bool,
    pub ca_bundle: Option<String>,
}

impl StoreConfig {
    /// Resolve the configuration from the process environment
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::MissingEnv`] listing every missing required
    /// variable at once.
    pub fn from_env() -> Result<Self> {
        let access_key = non_empty_var("AWS_ACCESS_KEY_ID");
        let secret_key = non_empty_var("AWS_SECRET_ACCESS_KEY");
        let endpoint = non_empty_var("S3_ENDPOINT");

        let mut missing = Vec::new();
        if access_key.is_none() {
            missing.push("AWS_ACCESS_KEY_ID");
        }
        if secret_key.is_none() {
            missing.push("AWS_SECRET_ACCESS_KEY");
        }
        if endpoint.is_none() {
            missing.push("S3_ENDPOINT");
        }
        if !missing.is_empty() {
            return Err(StoreError::MissingEnv {
                missing: missing.join(", "),
            });
        }

        let region = non_empty_var("AWS_DEFAULT_REGION").unwrap_or_else(|| DEFAULT_REGION.into());
        let verify_ssl = env::var("AWS_VERIFY_SSL")
            .map(|v| v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);
        let ca_bundle = non_empty_var("S3_CA_BUNDLE");

        if !verify_ssl && ca_bundle.is_some() {
            tracing::warn!(
                "S3_CA_BUNDLE is set but SSL verification is disabled; the bundle will be ignored"
            );
        }

        let endpoint = endpoint.unwrap_or_default();
        tracing::info!(endpoint = %endpoint, region = %region, "Resolved S3 store configuration");

        Ok(Self {
            credentials: Credentials {
                access_key: access_key.unwrap_or_default(),
                secret_key: secret_key.unwrap_or_default(),
            },
            endpoint,
            region,
            verify_ssl,
            ca_bundle,
        })
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.is_empty())
}
