//! Policy document model for bucket lifecycle configurations
//!
//! This crate provides the pure data layer of the lifecycle manager:
//!
//! - **PolicyDocument**: a lifecycle configuration as an opaque JSON object
//! - **Validation**: structural well-formedness checks for local documents
//! - **Merging**: local-precedence, ID-keyed union of two documents' rules
//! - **Comparison**: canonical-JSON equality, insensitive to key order
//!
//! Nothing in this crate performs I/O. The storage boundary lives in
//! `lifecycle-store` and the workflow that ties everything together lives in
//! `lifecycle-core`.

pub mod compare;
pub mod document;
pub mod error;
pub mod merge;
pub mod validate;

pub use compare::{canonical_json, documents_equal};
pub use document::{PolicyDocument, rule_id};
pub use error::{Error, Result};
pub use merge::merge;
pub use validate::validate;
