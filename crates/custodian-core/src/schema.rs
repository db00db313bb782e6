//! Schema validation for repository documents
//!
//! Validation happens in two passes:
//! 1. JSON Schema (embedded `schemas/*.schema.json`) checks the shape: required
//!    keys, value types and no unknown keys anywhere.
//! 2. A semantic pass converts the document into typed values, checking what
//!    JSON Schema cannot express: version tokens, absolute URLs, host bounds
//!    and duplicate versions after normalization.
//!
//! Either pass reports every violation it finds as [`Error::Validation`].

use crate::error::{Error, Result, Violation};
use crate::types::{ComponentDescription, RepositoryDescription, VersionEntry};
use crate::version::parse_version;
use jsonschema::Validator;
use rust_embed::RustEmbed;
use semver::{BuildMetadata, Version};
use serde::Deserialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;
use url::Url;

/// Schema name for `repository.json`
pub const REPOSITORY_SCHEMA: &str = "repository";

/// Schema name for `custom.json`
pub const COMPONENT_SCHEMA: &str = "component";

/// Embedded schema files
#[derive(RustEmbed)]
#[folder = "$CARGO_MANIFEST_DIR/schemas/"]
struct EmbeddedSchemas;

/// Schema validator with pre-compiled schemas
#[derive(Debug)]
pub struct SchemaValidator {
    /// Compiled schemas by name
    schemas: HashMap<String, Validator>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RepositoryWire {
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    homepage: Option<String>,
    customs: BTreeMap<String, String>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ComponentWire {
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    homepage: Option<String>,
    #[serde(default)]
    changelog: Option<String>,
    versions: BTreeMap<String, VersionEntryWire>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct VersionEntryWire {
    host_min: String,
    #[serde(default)]
    host_max: Option<String>,
    release_file: String,
    #[serde(default)]
    homepage: Option<String>,
}

impl SchemaValidator {
    /// Create a new schema validator with embedded schemas
    pub fn new() -> Result<Self> {
        let mut schemas = HashMap::new();

        for file in EmbeddedSchemas::iter() {
            if !file.ends_with(".schema.json") {
                continue;
            }

            let name = file.trim_end_matches(".schema.json").to_string();
            debug!("Loading embedded schema: {}", name);

            if let Some(content) = EmbeddedSchemas::get(&file) {
                let json_str = std::str::from_utf8(&content.data).map_err(|_| {
                    Error::invalid_config(format!("Invalid UTF-8 in schema: {}", file))
                })?;

                let schema_value: Value = serde_json::from_str(json_str)?;
                let compiled = jsonschema::validator_for(&schema_value).map_err(|e| {
                    Error::invalid_config(format!("Failed to compile schema {}: {}", name, e))
                })?;

                schemas.insert(name, compiled);
            }
        }

        for required in [REPOSITORY_SCHEMA, COMPONENT_SCHEMA] {
            if !schemas.contains_key(required) {
                return Err(Error::schema_not_found(required));
            }
        }

        Ok(Self { schemas })
    }

    /// Validate a JSON value against a named schema
    pub fn validate(&self, value: &Value, schema_name: &str) -> Result<()> {
        let schema = self
            .schemas
            .get(schema_name)
            .ok_or_else(|| Error::schema_not_found(schema_name))?;

        let violations: Vec<Violation> = schema
            .iter_errors(value)
            .map(|e| Violation::new(e.instance_path().to_string(), e.to_string()))
            .collect();

        if !violations.is_empty() {
            return Err(Error::validation(schema_name, violations));
        }

        Ok(())
    }

    /// Check if a schema exists
    pub fn has_schema(&self, name: &str) -> bool {
        self.schemas.contains_key(name)
    }

    /// Validate a raw `repository.json` document
    pub fn validate_repository(&self, raw: &Value) -> Result<RepositoryDescription> {
        self.validate(raw, REPOSITORY_SCHEMA)?;

        let wire = RepositoryWire::deserialize(raw).map_err(|e| {
            Error::validation(REPOSITORY_SCHEMA, vec![Violation::new("", e.to_string())])
        })?;

        let mut violations = Vec::new();
        let homepage = parse_url_field(wire.homepage.as_deref(), "/homepage", &mut violations);

        if !violations.is_empty() {
            return Err(Error::validation(REPOSITORY_SCHEMA, violations));
        }

        Ok(RepositoryDescription {
            name: wire.name,
            description: wire.description,
            homepage,
            customs: wire.customs,
        })
    }

    /// Validate a raw `custom.json` document
    pub fn validate_component(&self, raw: &Value) -> Result<ComponentDescription> {
        self.validate(raw, COMPONENT_SCHEMA)?;

        let wire = ComponentWire::deserialize(raw).map_err(|e| {
            Error::validation(COMPONENT_SCHEMA, vec![Violation::new("", e.to_string())])
        })?;

        let mut violations = Vec::new();
        let homepage = parse_url_field(wire.homepage.as_deref(), "/homepage", &mut violations);
        let changelog = parse_url_field(wire.changelog.as_deref(), "/changelog", &mut violations);

        let mut versions = BTreeMap::new();
        let mut raw_keys: HashMap<Version, String> = HashMap::new();

        for (key, entry) in wire.versions {
            let path = format!("/versions/{}", key);

            let version = match parse_version(&key) {
                Ok(v) => Some(v),
                Err(_) => {
                    violations.push(Violation::new(
                        &path,
                        format!("'{}' is not a valid version", key),
                    ));
                    None
                }
            };

            let entry = convert_entry(&key, entry, &path, &mut violations);

            if let (Some(version), Some(entry)) = (version, entry) {
                // Build metadata does not take part in precedence
                let mut comparable = version.clone();
                comparable.build = BuildMetadata::EMPTY;

                if let Some(previous) = raw_keys.insert(comparable.clone(), key.clone()) {
                    violations.push(Violation::new(
                        &path,
                        format!(
                            "duplicates version '{}' (both normalize to {})",
                            previous, comparable
                        ),
                    ));
                    continue;
                }
                versions.insert(version, entry);
            }
        }

        if !violations.is_empty() {
            return Err(Error::validation(COMPONENT_SCHEMA, violations));
        }

        Ok(ComponentDescription {
            name: wire.name,
            description: wire.description,
            homepage,
            changelog,
            versions,
        })
    }
}

fn convert_entry(
    tag: &str,
    wire: VersionEntryWire,
    path: &str,
    violations: &mut Vec<Violation>,
) -> Option<VersionEntry> {
    let before = violations.len();

    let host_min = parse_version_field(&wire.host_min, &format!("{}/host_min", path), violations);
    let host_max = wire
        .host_max
        .as_deref()
        .and_then(|raw| parse_version_field(raw, &format!("{}/host_max", path), violations));
    let release_file = parse_url_field(
        Some(&wire.release_file),
        &format!("{}/release_file", path),
        violations,
    );
    let homepage = parse_url_field(
        wire.homepage.as_deref(),
        &format!("{}/homepage", path),
        violations,
    );

    if let (Some(min), Some(max)) = (&host_min, &host_max) {
        if min > max {
            violations.push(Violation::new(
                format!("{}/host_max", path),
                format!("host_max {} is lower than host_min {}", max, min),
            ));
        }
    }

    if violations.len() > before {
        return None;
    }

    Some(VersionEntry {
        tag: tag.to_string(),
        host_min_version: host_min?,
        host_max_version: host_max,
        release_file: release_file?,
        homepage,
    })
}

fn parse_version_field(raw: &str, path: &str, violations: &mut Vec<Violation>) -> Option<Version> {
    match parse_version(raw) {
        Ok(v) => Some(v),
        Err(_) => {
            violations.push(Violation::new(path, format!("'{}' is not a valid version", raw)));
            None
        }
    }
}

/// Parse an optional absolute http(s) URL
fn parse_url_field(raw: Option<&str>, path: &str, violations: &mut Vec<Violation>) -> Option<Url> {
    let raw = raw?;
    match Url::parse(raw) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.has_host() => Some(url),
        _ => {
            violations.push(Violation::new(
                path,
                format!("'{}' is not an absolute http(s) URL", raw),
            ));
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn validator() -> SchemaValidator {
        SchemaValidator::new().unwrap()
    }

    #[test]
    fn test_embedded_schemas_load() {
        let v = validator();
        assert!(v.has_schema(REPOSITORY_SCHEMA));
        assert!(v.has_schema(COMPONENT_SCHEMA));
    }

    #[test]
    fn test_valid_repository() {
        let repo = validator()
            .validate_repository(&json!({
                "name": "My repository",
                "description": "Personal components",
                "homepage": "https://example.com",
                "customs": {"foo": "Foo integration", "bar": "Bar integration"}
            }))
            .unwrap();

        assert_eq!(repo.name, "My repository");
        assert_eq!(repo.component_ids(), vec!["bar", "foo"]);
        assert_eq!(repo.homepage.unwrap().as_str(), "https://example.com/");
    }

    #[test]
    fn test_repository_optional_keys_are_absent() {
        let repo = validator()
            .validate_repository(&json!({"name": "r", "customs": {}}))
            .unwrap();
        assert!(repo.description.is_none());
        assert!(repo.homepage.is_none());
        assert!(repo.customs.is_empty());
    }

    #[test]
    fn test_repository_rejects_unknown_keys() {
        let err = validator()
            .validate_repository(&json!({"name": "r", "customs": {}, "extra": 1}))
            .unwrap_err();
        assert!(err.violations()[0].message.contains("extra"));
    }

    #[test]
    fn test_repository_rejects_missing_customs() {
        let err = validator()
            .validate_repository(&json!({"name": "r"}))
            .unwrap_err();
        assert!(err.violations().iter().any(|v| v.message.contains("customs")));
    }

    #[test]
    fn test_repository_rejects_non_string_descriptions() {
        let err = validator()
            .validate_repository(&json!({"name": "r", "customs": {"foo": 3}}))
            .unwrap_err();
        assert_eq!(err.violations()[0].key, "/customs/foo");
    }

    #[test]
    fn test_repository_rejects_relative_homepage() {
        let err = validator()
            .validate_repository(&json!({"name": "r", "customs": {}, "homepage": "/docs"}))
            .unwrap_err();
        assert_eq!(err.violations()[0].key, "/homepage");
    }

    #[test]
    fn test_valid_component() {
        let component = validator()
            .validate_component(&json!({
                "name": "Foo",
                "changelog": "https://example.com/foo/CHANGELOG.md",
                "versions": {
                    "1.0.0": {"host_min": "2024.1.0", "release_file": "http://x/1.0.0.zip"},
                    "1.1.0b1": {
                        "host_min": "2024.1.0",
                        "host_max": "2024.12",
                        "release_file": "http://x/1.1.0b1.zip",
                        "homepage": "https://example.com/foo/1.1.0b1"
                    }
                }
            }))
            .unwrap();

        assert_eq!(component.versions.len(), 2);
        let beta = component.entry(&parse_version("1.1.0b1").unwrap()).unwrap();
        assert_eq!(beta.host_max_version, Some(Version::new(2024, 12, 0)));
        assert!(component.changelog.is_some());
    }

    #[test]
    fn test_component_rejects_unknown_entry_keys() {
        let err = validator()
            .validate_component(&json!({
                "name": "Foo",
                "versions": {
                    "1.0.0": {"host_min": "2024.1.0", "release_file": "http://x/a.zip", "sha": "x"}
                }
            }))
            .unwrap_err();
        assert_eq!(err.violations()[0].key, "/versions/1.0.0");
    }

    #[test]
    fn test_component_rejects_missing_release_file() {
        let err = validator()
            .validate_component(&json!({
                "name": "Foo",
                "versions": {"1.0.0": {"host_min": "2024.1.0"}}
            }))
            .unwrap_err();
        assert!(err
            .violations()
            .iter()
            .any(|v| v.message.contains("release_file")));
    }

    #[test]
    fn test_component_reports_every_semantic_violation() {
        let err = validator()
            .validate_component(&json!({
                "name": "Foo",
                "versions": {
                    "latest": {"host_min": "2024.1.0", "release_file": "http://x/a.zip"},
                    "1.0.0": {"host_min": "soon", "release_file": "ftp://x/a.zip"}
                }
            }))
            .unwrap_err();

        let keys: Vec<&str> = err.violations().iter().map(|v| v.key.as_str()).collect();
        assert!(keys.contains(&"/versions/latest"));
        assert!(keys.contains(&"/versions/1.0.0/host_min"));
        assert!(keys.contains(&"/versions/1.0.0/release_file"));
    }

    #[test]
    fn test_component_rejects_inverted_host_bounds() {
        let err = validator()
            .validate_component(&json!({
                "name": "Foo",
                "versions": {
                    "1.0.0": {
                        "host_min": "2024.6.0",
                        "host_max": "2024.1.0",
                        "release_file": "http://x/a.zip"
                    }
                }
            }))
            .unwrap_err();
        assert_eq!(err.violations()[0].key, "/versions/1.0.0/host_max");
    }

    #[test]
    fn test_component_rejects_duplicate_normalized_versions() {
        let err = validator()
            .validate_component(&json!({
                "name": "Foo",
                "versions": {
                    "1.0": {"host_min": "2024.1.0", "release_file": "http://x/a.zip"},
                    "1.0.0": {"host_min": "2024.1.0", "release_file": "http://x/b.zip"}
                }
            }))
            .unwrap_err();
        assert!(err.violations()[0].message.contains("duplicates version"));
    }

    #[test]
    fn test_component_rejects_versions_differing_only_in_build() {
        let err = validator()
            .validate_component(&json!({
                "name": "Foo",
                "versions": {
                    "1.0.0+a": {"host_min": "2024.1.0", "release_file": "http://x/a.zip"},
                    "1.0.0+b": {"host_min": "2024.1.0", "release_file": "http://x/b.zip"}
                }
            }))
            .unwrap_err();
        assert_eq!(err.violations().len(), 1);
        assert!(err.violations()[0].message.contains("duplicates version '1.0.0+a'"));
    }

    #[test]
    fn test_component_keeps_catalog_spelling() {
        let component = validator()
            .validate_component(&json!({
                "name": "Foo",
                "versions": {
                    "1.0": {"host_min": "2024.1.0", "release_file": "http://x/a.zip"}
                }
            }))
            .unwrap();
        assert_eq!(component.tag(&Version::new(1, 0, 0)), Some("1.0"));
    }

    #[test]
    fn test_component_allows_empty_versions() {
        let component = validator()
            .validate_component(&json!({"name": "Foo", "versions": {}}))
            .unwrap();
        assert!(component.versions.is_empty());
    }
}
