//! Installed component manifests

use crate::installer::validate_component_id;
use camino::{Utf8Path, Utf8PathBuf};
use custodian_core::InstalledManifest;
use tracing::{debug, warn};

/// Manifest file inside a component directory
pub const MANIFEST_FILE: &str = "manifest.json";

/// Reads `custom_components/{id}/manifest.json`
#[derive(Debug, Clone)]
pub struct ManifestReader {
    components_dir: Utf8PathBuf,
}

impl ManifestReader {
    pub fn new(components_dir: impl Into<Utf8PathBuf>) -> Self {
        Self {
            components_dir: components_dir.into(),
        }
    }

    pub fn manifest_path(&self, component_id: &str) -> Utf8PathBuf {
        self.components_dir.join(component_id).join(MANIFEST_FILE)
    }

    /// The component's manifest, `None` when it is not installed
    ///
    /// A manifest that is not valid JSON reads as empty. Ids that would
    /// leave the components directory are never read.
    pub async fn read(&self, component_id: &str) -> Option<InstalledManifest> {
        if let Err(e) = validate_component_id(component_id) {
            warn!("Not reading manifest: {}", e);
            return None;
        }
        let path = self.manifest_path(component_id);

        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("The {} component is not installed", component_id);
                return None;
            }
            Err(e) => {
                warn!("Cannot read {}: {}", path, e);
                return None;
            }
        };

        Some(parse_manifest(&path, &content))
    }

    /// Installed version exactly as the manifest writes it
    pub async fn installed_version(&self, component_id: &str) -> Option<String> {
        self.read(component_id).await?.version
    }
}

fn parse_manifest(path: &Utf8Path, content: &str) -> InstalledManifest {
    InstalledManifest::from_json(content).unwrap_or_else(|e| {
        warn!("Error reading manifest {}: {}", path, e);
        InstalledManifest::default()
    })
}
