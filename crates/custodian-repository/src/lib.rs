//! # custodian-repository
//!
//! Read-only HTTP access to a component repository:
//!
//! ```text
//! {base}/repository.json               repository index
//! {base}/{component_id}/custom.json    version catalog
//! {base}/{component_id}/changelog.md   default release notes
//! ```
//!
//! Every JSON document is schema-validated before it is returned.

pub mod client;
pub mod error;

pub use client::{RepositoryClient, COMPONENT_FILE, DEFAULT_CHANGELOG_FILE, REPOSITORY_FILE};
pub use error::{ErrorKind, RepositoryError, Result};
