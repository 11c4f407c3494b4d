//! Blocking S3 client for the bucket lifecycle API
//!
//! Path-style addressing against a configured endpoint, one HTTP call per
//! store operation, no retries. Requests are signed with SigV4; bodies are
//! converted through the wire codec.

use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::Utc;
use md5::{Digest, Md5};
use reqwest::Url;
use reqwest::blocking::Client;

use lifecycle_policy::PolicyDocument;

use crate::config::StoreConfig;
use crate::error::{Result, StoreError};
use crate::sigv4::{Credentials, EMPTY_PAYLOAD_HASH, SigningContext, sha256_hex};
use crate::store::PolicyStore;
use crate::{sigv4, wire};

const SERVICE: &str = "s3";
const LIFECYCLE_QUERY: &str = "lifecycle=";
const NO_SUCH_LIFECYCLE: &str = "NoSuchLifecycleConfiguration";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// S3-backed implementation of [`PolicyStore`]
pub struct S3PolicyStore {
    http: Client,
    endpoint: Url,
    region: String,
    credentials: Credentials,
}

impl S3PolicyStore {
    /// Build a client from resolved configuration
    pub fn new(config: StoreConfig) -> Result<Self> {
        let mut builder = Client::builder().timeout(REQUEST_TIMEOUT);

        if !config.verify_ssl {
            builder = builder.danger_accept_invalid_certs(true);
        } else if let Some(path) = &config.ca_bundle {
            let pem = std::fs::read(path).map_err(|e| StoreError::Config {
                message: format!("cannot read CA bundle {}: {}", path, e),
            })?;
            let certificate = reqwest::Certificate::from_pem(&pem)?;
            builder = builder.add_root_certificate(certificate);
            tracing::info!(bundle = %path, "SSL verification enabled with custom CA bundle");
        }

        let endpoint = Url::parse(config.endpoint.trim_end_matches('/')).map_err(|e| {
            StoreError::Config {
                message: format!("invalid S3 endpoint '{}': {}", config.endpoint, e),
            }
        })?;

        Ok(Self {
            http: builder.build()?,
            endpoint,
            region: config.region,
            credentials: config.credentials,
        })
    }

    /// The `?lifecycle` subresource URL for a bucket, path-style
    fn lifecycle_url(&self, bucket: &str) -> Result<Url> {
        let mut url = self.endpoint.clone();
        url.path_segments_mut()
            .map_err(|()| StoreError::Config {
                message: format!("endpoint '{}' cannot take a bucket path", self.endpoint),
            })?
            .push(bucket);
        url.set_query(Some(LIFECYCLE_QUERY));
        Ok(url)
    }

    fn host_header(&self, url: &Url) -> Result<String> {
        let host = url.host_str().ok_or_else(|| StoreError::Config {
            message: format!("endpoint '{}' has no host", self.endpoint),
        })?;
        Ok(match url.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        })
    }

    /// Sign a request, returning the headers to attach
    ///
    /// `reqwest` derives the `Host` header from the URL, so it is signed
    /// here but not returned.
    fn signed_headers(
        &self,
        method: &str,
        url: &Url,
        payload_hash: &str,
    ) -> Result<Vec<(String, String)>> {
        let ctx = SigningContext {
            credentials: &self.credentials,
            region: &self.region,
            service: SERVICE,
            timestamp: Utc::now(),
        };
        let amz_date = ctx.amz_date();

        let to_sign = vec![
            ("host".to_string(), self.host_header(url)?),
            ("x-amz-content-sha256".to_string(), payload_hash.to_string()),
            ("x-amz-date".to_string(), amz_date.clone()),
        ];
        let authorization = sigv4::authorization_header(
            &ctx,
            method,
            url.path(),
            LIFECYCLE_QUERY,
            &to_sign,
            payload_hash,
        );

        Ok(vec![
            ("x-amz-content-sha256".to_string(), payload_hash.to_string()),
            ("x-amz-date".to_string(), amz_date),
            ("authorization".to_string(), authorization),
        ])
    }
}

impl PolicyStore for S3PolicyStore {
    fn fetch_policy(&self, bucket: &str) -> Result<Option<PolicyDocument>> {
        let url = self.lifecycle_url(bucket)?;
        tracing::debug!(bucket, %url, "Fetching lifecycle configuration");

        let mut request = self.http.get(url.clone());
        for (name, value) in self.signed_headers("GET", &url, EMPTY_PAYLOAD_HASH)? {
            request = request.header(name, value);
        }

        let response = request.send()?;
        let status = response.status();
        let body = response.text()?;

        if status.is_success() {
            let policy = wire::from_xml(&body)?;
            tracing::debug!(bucket, rules = policy.rules().len(), "Fetched lifecycle configuration");
            return Ok(Some(policy));
        }

        let code = wire::error_code(&body).unwrap_or_default();
        if status == reqwest::StatusCode::NOT_FOUND && code == NO_SUCH_LIFECYCLE {
            tracing::info!(bucket, "No existing lifecycle configuration found");
            return Ok(None);
        }

        Err(StoreError::Api {
            operation: "fetch",
            bucket: bucket.to_string(),
            status: status.as_u16(),
            code,
        })
    }

    fn publish_policy(&self, bucket: &str, policy: &PolicyDocument) -> Result<()> {
        let url = self.lifecycle_url(bucket)?;
        let body = wire::to_xml(policy)?;
        let payload_hash = sha256_hex(body.as_bytes());
        let content_md5 = BASE64.encode(Md5::digest(body.as_bytes()));

        tracing::debug!(bucket, %url, bytes = body.len(), "Publishing lifecycle configuration");

        let mut request = self
            .http
            .put(url.clone())
            .header("content-type", "application/xml")
            .header("content-md5", content_md5);
        for (name, value) in self.signed_headers("PUT", &url, &payload_hash)? {
            request = request.header(name, value);
        }

        let response = request.body(body).send()?;
        let status = response.status();
        if status.is_success() {
            tracing::info!(bucket, "Lifecycle configuration updated");
            return Ok(());
        }

        let body = response.text()?;
        Err(StoreError::Api {
            operation: "publish",
            bucket: bucket.to_string(),
            status: status.as_u16(),
            code: wire::error_code(&body).unwrap_or_default(),
        })
    }
}
