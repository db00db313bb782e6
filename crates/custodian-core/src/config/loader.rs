//! Hierarchical configuration loader with precedence
//!
//! Loads configuration from multiple sources with the following precedence (low to high):
//! 1. Embedded defaults (built into binary)
//! 2. Config file (~/.custodian/config.yaml or an explicit path)
//! 3. Environment variables (CUSTODIAN_* prefix)
//! 4. CLI flags (handled by caller)

use super::types::{ManagerConfig, RepositoryEntryConfig};
use crate::error::{Error, Result};
use camino::{Utf8Path, Utf8PathBuf};
use rust_embed::RustEmbed;
use serde_yaml_ng::Value;
use std::env;
use std::fs;
use std::path::PathBuf;
use tracing::debug;

/// Embedded configuration files
#[derive(RustEmbed)]
#[folder = "$CARGO_MANIFEST_DIR/embedded/config/"]
struct EmbeddedConfigs;

const DEFAULTS_FILE: &str = "defaults.yaml";
const CONFIG_FILE: &str = "config.yaml";

/// Configuration hierarchy loader
pub struct ConfigLoader {
    /// Config file overlaid on the embedded defaults
    config_path: Utf8PathBuf,

    /// Whether a missing config file is an error
    explicit: bool,
}

impl ConfigLoader {
    /// Loader for the standard config file (~/.custodian/config.yaml)
    pub fn new() -> Result<Self> {
        // HOME first, so containers and tests can redirect it
        let home = env::var_os("HOME")
            .map(PathBuf::from)
            .or_else(dirs::home_dir)
            .ok_or_else(|| Error::invalid_config("Could not determine home directory"))?;
        let home = Utf8PathBuf::from_path_buf(home).map_err(|p| {
            Error::invalid_config(format!("Non UTF-8 home directory: {}", p.display()))
        })?;

        Ok(Self {
            config_path: home.join(".custodian").join(CONFIG_FILE),
            explicit: false,
        })
    }

    /// Loader for an explicit config file, which must exist
    pub fn with_file(path: impl Into<Utf8PathBuf>) -> Self {
        Self {
            config_path: path.into(),
            explicit: true,
        }
    }

    /// Path of the config file this loader reads
    pub fn config_path(&self) -> &Utf8Path {
        &self.config_path
    }

    /// Load and validate the configuration
    pub fn load(&self) -> Result<ManagerConfig> {
        let config = self.load_unchecked()?;
        config.validate()?;
        Ok(config)
    }

    /// Load the configuration without validating it
    pub fn load_unchecked(&self) -> Result<ManagerConfig> {
        let mut merged = Self::load_embedded_defaults()?;

        if self.config_path.exists() {
            debug!("Loading config file: {}", self.config_path);
            let overlay = Self::load_yaml_file(&self.config_path)?;
            merge_values(&mut merged, overlay);
        } else if self.explicit {
            return Err(Error::config_not_found(self.config_path.as_str()));
        }

        let config: ManagerConfig = serde_yaml_ng::from_value(merged)
            .map_err(|e| Error::invalid_config(format!("{}: {}", self.config_path, e)))?;

        Self::apply_env_overrides(config)
    }

    fn load_embedded_defaults() -> Result<Value> {
        let embedded_file = EmbeddedConfigs::get(DEFAULTS_FILE).ok_or_else(|| {
            Error::config_not_found(format!("Embedded config not found: {}", DEFAULTS_FILE))
        })?;

        let content = std::str::from_utf8(&embedded_file.data).map_err(|_| {
            Error::invalid_config(format!("Invalid UTF-8 in embedded config: {}", DEFAULTS_FILE))
        })?;

        serde_yaml_ng::from_str(content).map_err(|e| {
            Error::invalid_config(format!(
                "Failed to parse embedded config {}: {}",
                DEFAULTS_FILE, e
            ))
        })
    }

    fn load_yaml_file(path: &Utf8Path) -> Result<Value> {
        let content = fs::read_to_string(path)?;
        let value: Value = serde_yaml_ng::from_str(&content)
            .map_err(|e| Error::invalid_config(format!("Failed to parse {}: {}", path, e)))?;

        // An empty file parses as null and overrides nothing
        Ok(match value {
            Value::Null => Value::Mapping(Default::default()),
            other => other,
        })
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(mut config: ManagerConfig) -> Result<ManagerConfig> {
        if let Ok(val) = env::var("CUSTODIAN_HOST_VERSION") {
            config.host.version = Some(val);
        }

        if let Ok(val) = env::var("CUSTODIAN_CONFIG_ROOT") {
            config.host.config_root = val;
        }

        if let Ok(val) = env::var("CUSTODIAN_RESTART_COMMAND") {
            config.host.restart_command = Some(val);
        }

        if let Ok(val) = env::var("CUSTODIAN_REQUEST_TIMEOUT_SECS") {
            config.network.request_timeout_secs = val.parse().map_err(|_| {
                Error::invalid_config("CUSTODIAN_REQUEST_TIMEOUT_SECS must be a valid number")
            })?;
        }

        if let Ok(val) = env::var("CUSTODIAN_DOWNLOAD_TIMEOUT_SECS") {
            config.network.download_timeout_secs = val.parse().map_err(|_| {
                Error::invalid_config("CUSTODIAN_DOWNLOAD_TIMEOUT_SECS must be a valid number")
            })?;
        }

        if let Ok(val) = env::var("CUSTODIAN_USER_AGENT") {
            config.network.user_agent = val;
        }

        // A repository URL from the environment replaces the configured list
        if let Ok(val) = env::var("CUSTODIAN_REPOSITORY_URL") {
            config.repositories = vec![RepositoryEntryConfig::new(val)];
        }

        if let Ok(val) = env::var("CUSTODIAN_SHOW_UNSTABLE") {
            let show_unstable: bool = val.parse().map_err(|_| {
                Error::invalid_config("CUSTODIAN_SHOW_UNSTABLE must be true or false")
            })?;
            for entry in &mut config.repositories {
                entry.show_unstable = show_unstable;
            }
        }

        Ok(config)
    }
}

/// Deep-merge `overlay` into `base`; mappings merge key by key, anything else is replaced
fn merge_values(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Mapping(base_map), Value::Mapping(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}
