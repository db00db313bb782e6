//! Type definitions for Custodian

pub mod manifest;
pub mod repository;

pub use manifest::InstalledManifest;
pub use repository::{ComponentDescription, RepositoryDescription, VersionEntry};
