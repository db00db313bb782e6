//! Repository HTTP client
//!
//! Requests are one-shot: no caching and no retries. Callers issue them in
//! pipeline order (index, then catalog, then archive).

use crate::error::{RepositoryError, Result};
use bytes::Bytes;
use custodian_core::config::NetworkConfig;
use custodian_core::{ComponentDescription, RepositoryDescription, SchemaValidator};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Repository index, relative to the base URL
pub const REPOSITORY_FILE: &str = "repository.json";

/// Component catalog, relative to the component directory
pub const COMPONENT_FILE: &str = "custom.json";

/// Release notes used when the catalog names none
pub const DEFAULT_CHANGELOG_FILE: &str = "changelog.md";

/// Client for one repository
#[derive(Debug, Clone)]
pub struct RepositoryClient {
    /// HTTP client
    client: reqwest::Client,

    /// Base URL without trailing slash
    base_url: String,

    /// Bound for JSON and page requests
    request_timeout: Duration,

    /// Bound for archive downloads
    download_timeout: Duration,

    validator: Arc<SchemaValidator>,
}

impl RepositoryClient {
    /// Create a client for the repository at `base_url`
    pub fn new(
        base_url: &Url,
        network: &NetworkConfig,
        validator: Arc<SchemaValidator>,
    ) -> Result<Self> {
        let base_url = base_url.as_str().trim_end_matches('/').to_string();

        let client = reqwest::Client::builder()
            .user_agent(&network.user_agent)
            .build()
            .map_err(|e| RepositoryError::remote_transport(&base_url, e))?;

        Ok(Self {
            client,
            base_url,
            request_timeout: network.request_timeout(),
            download_timeout: network.download_timeout(),
            validator,
        })
    }

    /// Base URL without trailing slash
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn repository_url(&self) -> String {
        format!("{}/{}", self.base_url, REPOSITORY_FILE)
    }

    pub fn component_url(&self, component_id: &str) -> String {
        format!("{}/{}/{}", self.base_url, component_id, COMPONENT_FILE)
    }

    /// Changelog location: the catalog's own link, else the default file
    pub fn changelog_url(
        &self,
        component_id: &str,
        component: Option<&ComponentDescription>,
    ) -> String {
        component
            .and_then(|c| c.changelog.as_ref())
            .map(|url| url.to_string())
            .unwrap_or_else(|| {
                format!("{}/{}/{}", self.base_url, component_id, DEFAULT_CHANGELOG_FILE)
            })
    }

    /// Fetch and validate `repository.json`
    pub async fn fetch_repository(&self) -> Result<RepositoryDescription> {
        let url = self.repository_url();
        let value = self.get_json(&url).await?;

        self.validator
            .validate_repository(&value)
            .map_err(|e| RepositoryError::invalid_data(&url, e.to_string()))
    }

    /// Fetch and validate a component's `custom.json`
    pub async fn fetch_component(&self, component_id: &str) -> Result<ComponentDescription> {
        let url = self.component_url(component_id);
        let value = self.get_json(&url).await?;

        self.validator
            .validate_component(&value)
            .map_err(|e| RepositoryError::invalid_data(&url, e.to_string()))
    }

    /// Fetch a component's release notes as raw text
    pub async fn fetch_changelog(
        &self,
        component_id: &str,
        component: Option<&ComponentDescription>,
    ) -> Result<String> {
        let url = self.changelog_url(component_id, component);
        self.fetch_page(&url).await
    }

    /// Fetch any page as text, without validation
    pub async fn fetch_page(&self, url: &str) -> Result<String> {
        let response = self.get(url, self.request_timeout).await?;
        response
            .text()
            .await
            .map_err(|e| RepositoryError::remote_transport(url, e))
    }

    /// Download a release archive into memory
    pub async fn download_archive(&self, url: &Url) -> Result<Bytes> {
        let url = url.as_str();
        let response = self.get(url, self.download_timeout).await?;
        let archive = response
            .bytes()
            .await
            .map_err(|e| RepositoryError::remote_transport(url, e))?;

        debug!("Downloaded {} ({} bytes)", url, archive.len());
        Ok(archive)
    }

    async fn get_json(&self, url: &str) -> Result<Value> {
        let body = self.fetch_page(url).await?;
        serde_json::from_str(&body).map_err(|e| RepositoryError::invalid_data(url, e.to_string()))
    }

    async fn get(&self, url: &str, timeout: Duration) -> Result<reqwest::Response> {
        debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| {
                warn!("Request to {} failed: {}", url, e);
                RepositoryError::remote_transport(url, e)
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!("Request to {} returned {}", url, status);
            return Err(RepositoryError::remote_status(url, status.as_u16()));
        }

        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> RepositoryClient {
        RepositoryClient::new(
            &Url::parse(base).unwrap(),
            &NetworkConfig::default(),
            Arc::new(SchemaValidator::new().unwrap()),
        )
        .unwrap()
    }

    #[test]
    fn test_urls_follow_repository_layout() {
        let client = client("https://example.com/repo/");
        assert_eq!(client.base_url(), "https://example.com/repo");
        assert_eq!(
            client.repository_url(),
            "https://example.com/repo/repository.json"
        );
        assert_eq!(
            client.component_url("foo"),
            "https://example.com/repo/foo/custom.json"
        );
        assert_eq!(
            client.changelog_url("foo", None),
            "https://example.com/repo/foo/changelog.md"
        );
    }

    #[test]
    fn test_changelog_url_prefers_catalog_link() {
        let client = client("https://example.com/repo");
        let component = ComponentDescription {
            name: "Foo".to_string(),
            description: None,
            homepage: None,
            changelog: Some(Url::parse("https://docs.example.com/foo/CHANGES").unwrap()),
            versions: Default::default(),
        };
        assert_eq!(
            client.changelog_url("foo", Some(&component)),
            "https://docs.example.com/foo/CHANGES"
        );
    }
}
