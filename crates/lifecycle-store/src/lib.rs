//! Remote policy storage boundary
//!
//! This crate owns everything that talks to (or stands in for) the object
//! storage service:
//!
//! - **PolicyStore**: the trait the reconciliation workflow depends on
//! - **StoreConfig**: credential/endpoint resolution from the environment
//! - **S3PolicyStore**: a blocking S3 REST client speaking the bucket
//!   lifecycle API, with SigV4 request signing and the XML wire codec
//!
//! The workflow in `lifecycle-core` only sees the trait, so it can be tested
//! against an in-process fake without any of this crate's transport
//! machinery.

pub mod client;
pub mod config;
pub mod error;
pub mod memory;
pub mod sigv4;
pub mod store;
pub mod wire;

pub use client::S3PolicyStore;
pub use config::StoreConfig;
pub use error::{Result, StoreError};
pub use memory::MemoryPolicyStore;
pub use sigv4::Credentials;
pub use store::PolicyStore;
