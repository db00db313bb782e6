//! Common test infrastructure for custodian-repository tests
//!
//! # Modules
//!
//! - `fixtures`: repository and component documents
//! - `mock_server`: Wiremock setup helpers for repository endpoints

#![allow(dead_code)]

pub mod fixtures;
pub mod mock_server;

pub use fixtures::*;
pub use mock_server::*;
