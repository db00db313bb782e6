//! Repository and component description types
//!
//! These are the typed results of schema validation. Downstream code never
//! touches the raw JSON documents.

use semver::Version;
use serde::Serialize;
use std::collections::BTreeMap;
use url::Url;

/// Index document served at `{base}/repository.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepositoryDescription {
    /// Repository display name
    pub name: String,

    /// Optional free-form description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Optional repository homepage
    #[serde(skip_serializing_if = "Option::is_none")]
    pub homepage: Option<Url>,

    /// Component id -> short description
    pub customs: BTreeMap<String, String>,
}

impl RepositoryDescription {
    /// Whether the repository lists the given component
    pub fn has_component(&self, component_id: &str) -> bool {
        self.customs.contains_key(component_id)
    }

    /// Component ids in stable order
    pub fn component_ids(&self) -> Vec<String> {
        self.customs.keys().cloned().collect()
    }
}

/// Version catalog served at `{base}/{component_id}/custom.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComponentDescription {
    /// Component display name
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub homepage: Option<Url>,

    /// Changelog location, overrides `{base}/{component_id}/changelog.md`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub changelog: Option<Url>,

    /// Available versions keyed by their normalized version
    pub versions: BTreeMap<Version, VersionEntry>,
}

impl ComponentDescription {
    /// Look up the entry for a version
    pub fn entry(&self, version: &Version) -> Option<&VersionEntry> {
        self.versions.get(version)
    }

    /// Catalog spelling of a version, `None` when it is not listed
    pub fn tag(&self, version: &Version) -> Option<&str> {
        self.entry(version).map(|entry| entry.tag.as_str())
    }
}

/// Install constraints and release location for one component version
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionEntry {
    /// Version key exactly as written in the catalog
    pub tag: String,

    /// Oldest host version this release supports
    pub host_min_version: Version,

    /// Newest host version this release supports; absent means no upper bound
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host_max_version: Option<Version>,

    /// Zip archive with one top-level directory
    pub release_file: Url,

    /// Release page for this version
    #[serde(skip_serializing_if = "Option::is_none")]
    pub homepage: Option<Url>,
}

impl VersionEntry {
    /// Check `host_min_version <= host <= host_max_version`
    pub fn supports_host(&self, host_version: &Version) -> bool {
        let above_min = *host_version >= self.host_min_version;
        let below_max = self
            .host_max_version
            .as_ref()
            .map_or(true, |max| host_version <= max);
        above_min && below_max
    }

    /// Page to point users at: the release homepage, else the archive itself
    pub fn learn_more_url(&self) -> &Url {
        self.homepage.as_ref().unwrap_or(&self.release_file)
    }
}
