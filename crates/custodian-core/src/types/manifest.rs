//! Local component manifest (`custom_components/{id}/manifest.json`)

use serde::{Deserialize, Serialize};

/// The subset of an installed component's manifest that Custodian reads
///
/// Other keys in the file belong to the host and are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstalledManifest {
    /// Display name of the installed component
    #[serde(default)]
    pub name: Option<String>,

    /// Installed version token, exactly as written in the manifest
    #[serde(default)]
    pub version: Option<String>,
}

impl InstalledManifest {
    /// Parse manifest JSON
    pub fn from_json(content: &str) -> serde_json::Result<Self> {
        serde_json::from_str(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_ignores_host_keys() {
        let manifest = InstalledManifest::from_json(
            r#"{"domain": "foo", "name": "Foo", "version": "1.2.0", "requirements": []}"#,
        )
        .unwrap();
        assert_eq!(manifest.name.as_deref(), Some("Foo"));
        assert_eq!(manifest.version.as_deref(), Some("1.2.0"));
    }

    #[test]
    fn test_manifest_without_version() {
        let manifest = InstalledManifest::from_json("{}").unwrap();
        assert_eq!(manifest, InstalledManifest::default());
    }
}
