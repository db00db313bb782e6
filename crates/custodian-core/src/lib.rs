//! # custodian-core
//!
//! Core library for the Custodian component manager providing:
//! - Repository and component description types
//! - Schema validation of untrusted repository documents
//! - Version parsing, stability rules and host-compatibility resolution
//! - Hierarchical configuration loading and reconciliation

pub mod config;
pub mod error;
pub mod resolver;
pub mod schema;
pub mod types;
pub mod version;

pub use config::{reconcile, ConfigLoader, ManagerConfig, Reconciliation, RepositoryEntryConfig};
pub use error::{Error, Result, Violation};
pub use resolver::{latest_version, supported_versions};
pub use schema::SchemaValidator;
pub use types::{ComponentDescription, InstalledManifest, RepositoryDescription, VersionEntry};
pub use version::{is_stable, parse_version};
