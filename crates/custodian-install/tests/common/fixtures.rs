//! Repository documents and manager setup

use super::mock_server::mock_json;
use super::reporter::RecordingReporter;
use camino::Utf8PathBuf;
use custodian_core::config::NetworkConfig;
use custodian_core::RepositoryEntryConfig;
use custodian_install::{ComponentManager, ManagerRegistry};
use semver::Version;
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;
use wiremock::MockServer;

pub const COMPONENT_ID: &str = "foo";
pub const HOST_VERSION: Version = Version::new(2024, 2, 0);

pub fn repository_json() -> Value {
    json!({
        "name": "Test repository",
        "customs": { COMPONENT_ID: "Foo integration" }
    })
}

/// Catalog listing `versions`, each requiring host 2024.1.0
pub fn component_json(server: &MockServer, versions: &[&str]) -> Value {
    let entries: serde_json::Map<String, Value> = versions
        .iter()
        .map(|v| {
            (
                v.to_string(),
                json!({
                    "host_min": "2024.1.0",
                    "release_file": format!("{}/releases/foo-{}.zip", server.uri(), v)
                }),
            )
        })
        .collect();

    json!({ "name": "Foo", "versions": entries })
}

/// Serve the index and a catalog for `foo`
pub async fn mount_repository(server: &MockServer, versions: &[&str]) {
    mock_json(server, "/repository.json", &repository_json()).await;
    mock_json(server, "/foo/custom.json", &component_json(server, versions)).await;
}

/// A manager for the mock repository, installing into a temporary config root
pub struct TestManager {
    pub manager: ComponentManager,
    pub reporter: Arc<RecordingReporter>,
    pub registry: ManagerRegistry,
    pub components_dir: Utf8PathBuf,
    _root: TempDir,
}

impl TestManager {
    pub fn new(server: &MockServer, host_version: Version) -> Self {
        let root = TempDir::new().unwrap();
        let components_dir = Utf8PathBuf::from_path_buf(root.path().join("custom_components"))
            .expect("Invalid UTF-8 path");
        std::fs::create_dir_all(&components_dir).unwrap();

        let reporter = Arc::new(RecordingReporter::default());
        let registry = ManagerRegistry::new();
        let manager = ComponentManager::new(
            RepositoryEntryConfig::new(server.uri()),
            host_version,
            NetworkConfig::default(),
            components_dir.clone(),
            registry.clone(),
            reporter.clone(),
        )
        .unwrap();

        Self {
            manager,
            reporter,
            registry,
            components_dir,
            _root: root,
        }
    }

    pub fn component_dir(&self) -> Utf8PathBuf {
        self.components_dir.join(COMPONENT_ID)
    }

    pub fn temp_dir(&self) -> Utf8PathBuf {
        self.components_dir.join(format!("_tmp_{}", COMPONENT_ID))
    }
}
