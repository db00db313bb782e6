//! CLI command implementations

pub mod changelog;
pub mod check;
pub mod config;
pub mod install;
pub mod list;
pub mod versions;

use crate::host::ConsoleIssueReporter;
use anyhow::{Context, Result};
use camino::Utf8Path;
use custodian_core::{ConfigLoader, ManagerConfig};
use custodian_install::{ComponentManager, ManagerRegistry};
use std::sync::Arc;

/// Load the validated configuration
pub(crate) fn load_config(path: Option<&Utf8Path>) -> Result<ManagerConfig> {
    let loader = config_loader(path)?;
    loader
        .load()
        .with_context(|| format!("Failed to load config from {}", loader.config_path()))
}

pub(crate) fn config_loader(path: Option<&Utf8Path>) -> Result<ConfigLoader> {
    match path {
        Some(path) => Ok(ConfigLoader::with_file(path)),
        None => Ok(ConfigLoader::new()?),
    }
}

/// Manager for the selected repository entry with a fresh registry
pub(crate) fn build_manager(
    config: &ManagerConfig,
    entry: Option<&str>,
) -> Result<ComponentManager> {
    let manager = ComponentManager::from_config(
        config,
        entry,
        ManagerRegistry::new(),
        Arc::new(ConsoleIssueReporter),
    )?;
    Ok(manager)
}
