//! Manager configuration types

use crate::error::{Error, Result};
use crate::version::parse_version;
use camino::Utf8PathBuf;
use semver::Version;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::time::Duration;
use url::Url;

/// Directory under the host config root that holds installed components
pub const COMPONENTS_DIR: &str = "custom_components";

/// Allowed polling interval, in hours
pub const POLLING_HOURS_RANGE: std::ops::RangeInclusive<u32> = 3..=24;

/// Complete manager configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ManagerConfig {
    /// The host application components are installed into
    #[serde(default)]
    pub host: HostConfig,

    /// Network and HTTP configuration
    #[serde(default)]
    pub network: NetworkConfig,

    /// Configured repositories (config entries)
    #[serde(default)]
    pub repositories: Vec<RepositoryEntryConfig>,
}

/// Host application settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct HostConfig {
    /// Running host version, used for compatibility checks
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Host configuration root containing `custom_components/`
    #[serde(default = "default_config_root")]
    pub config_root: String,

    /// Shell command that restarts the host
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restart_command: Option<String>,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            version: None,
            config_root: default_config_root(),
            restart_command: None,
        }
    }
}

fn default_config_root() -> String {
    ".".to_string()
}

/// Network and HTTP configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct NetworkConfig {
    /// Timeout for JSON and page requests, in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Timeout for archive downloads, in seconds
    #[serde(default = "default_download_timeout")]
    pub download_timeout_secs: u64,

    /// User agent string for HTTP requests
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: default_request_timeout(),
            download_timeout_secs: default_download_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

impl NetworkConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn download_timeout(&self) -> Duration {
        Duration::from_secs(self.download_timeout_secs)
    }
}

fn default_request_timeout() -> u64 {
    5
}
fn default_download_timeout() -> u64 {
    10
}
fn default_user_agent() -> String {
    format!(
        "custodian/{} ({}; {})",
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS,
        std::env::consts::ARCH
    )
}

/// One configured repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RepositoryEntryConfig {
    /// Explicit entry id; derived from the base URL when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Display title; defaults to the repository name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Root URL of the repository
    pub base_url: String,

    /// How often installed components are checked for updates
    #[serde(default = "default_polling_hours")]
    pub polling_hours: u32,

    /// Offer pre-release versions
    #[serde(default)]
    pub show_unstable: bool,
}

fn default_polling_hours() -> u32 {
    6
}

impl RepositoryEntryConfig {
    /// Create an entry with default options
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            id: None,
            title: None,
            base_url: base_url.into(),
            polling_hours: default_polling_hours(),
            show_unstable: false,
        }
    }

    /// Base URL without trailing slashes
    pub fn normalized_base_url(&self) -> &str {
        self.base_url.trim().trim_end_matches('/')
    }

    /// Parsed base URL
    pub fn base_url(&self) -> Result<Url> {
        let raw = self.normalized_base_url();
        let url = Url::parse(raw)
            .map_err(|e| Error::invalid_config(format!("Invalid base-url '{}': {}", raw, e)))?;

        if !matches!(url.scheme(), "http" | "https") || !url.has_host() {
            return Err(Error::invalid_config(format!(
                "base-url '{}' must be an absolute http(s) URL",
                raw
            )));
        }

        Ok(url)
    }

    /// Stable entry id: the explicit id, else the SHA-256 of the normalized base URL
    pub fn entry_id(&self) -> String {
        match &self.id {
            Some(id) => id.clone(),
            None => format!("{:x}", Sha256::digest(self.normalized_base_url().as_bytes())),
        }
    }

    pub fn polling_interval(&self) -> Duration {
        Duration::from_secs(u64::from(self.polling_hours) * 3600)
    }

    fn validate(&self) -> Result<()> {
        self.base_url()?;

        if !POLLING_HOURS_RANGE.contains(&self.polling_hours) {
            return Err(Error::invalid_config(format!(
                "polling-hours for {} must be between {} and {}, got {}",
                self.normalized_base_url(),
                POLLING_HOURS_RANGE.start(),
                POLLING_HOURS_RANGE.end(),
                self.polling_hours
            )));
        }

        if matches!(&self.id, Some(id) if id.trim().is_empty()) {
            return Err(Error::invalid_config(format!(
                "id for {} must not be empty",
                self.normalized_base_url()
            )));
        }

        Ok(())
    }
}

impl ManagerConfig {
    /// Parsed host version
    pub fn host_version(&self) -> Result<Version> {
        let raw = self
            .host
            .version
            .as_deref()
            .ok_or_else(|| Error::invalid_config("host.version is not set"))?;
        parse_version(raw)
    }

    /// Directory that holds installed components
    pub fn components_dir(&self) -> Utf8PathBuf {
        Utf8PathBuf::from(&self.host.config_root).join(COMPONENTS_DIR)
    }

    /// Select a repository entry
    ///
    /// Without an explicit id the configuration must hold exactly one entry.
    pub fn entry(&self, entry_id: Option<&str>) -> Result<&RepositoryEntryConfig> {
        match entry_id {
            Some(id) => self
                .repositories
                .iter()
                .find(|e| e.entry_id() == id)
                .ok_or_else(|| Error::invalid_config(format!("No repository entry '{}'", id))),
            None => match self.repositories.as_slice() {
                [] => Err(Error::invalid_config("No repositories configured")),
                [only] => Ok(only),
                many => Err(Error::invalid_config(format!(
                    "Several repositories configured, choose one of: {}",
                    many.iter()
                        .map(|e| e.entry_id())
                        .collect::<Vec<_>>()
                        .join(", ")
                ))),
            },
        }
    }

    /// Check the configuration is usable
    pub fn validate(&self) -> Result<()> {
        self.host_version()?;

        if self.network.request_timeout_secs == 0 || self.network.download_timeout_secs == 0 {
            return Err(Error::invalid_config("network timeouts must be at least one second"));
        }

        let mut ids = HashSet::new();
        for entry in &self.repositories {
            entry.validate()?;
            let id = entry.entry_id();
            if !ids.insert(id.clone()) {
                return Err(Error::invalid_config(format!(
                    "Repository entry '{}' is configured twice",
                    id
                )));
            }
        }

        Ok(())
    }
}
