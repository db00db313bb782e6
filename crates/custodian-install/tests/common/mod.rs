//! Common test infrastructure for custodian-install tests
//!
//! # Modules
//!
//! - `archive`: in-memory zip builder for release archives
//! - `fixtures`: repository documents and manager setup
//! - `mock_server`: Wiremock setup helpers for repository endpoints
//! - `reporter`: issue reporter and host doubles

#![allow(dead_code)]

pub mod archive;
pub mod fixtures;
pub mod mock_server;
pub mod reporter;

pub use archive::*;
pub use fixtures::*;
pub use mock_server::*;
pub use reporter::*;
