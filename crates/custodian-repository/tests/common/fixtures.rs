//! Repository documents used across tests

use serde_json::{json, Value};

pub const COMPONENT_ID: &str = "foo";

/// Index listing a single component
pub fn repository_json() -> Value {
    json!({
        "name": "Test repository",
        "homepage": "https://example.com",
        "customs": { COMPONENT_ID: "Foo integration" }
    })
}

/// Catalog with one stable and one pre-release version
pub fn component_json(release_base: &str) -> Value {
    json!({
        "name": "Foo",
        "versions": {
            "1.0.0": {
                "host_min": "2024.1.0",
                "release_file": format!("{}/releases/foo-1.0.0.zip", release_base)
            },
            "1.1.0b1": {
                "host_min": "2024.1.0",
                "release_file": format!("{}/releases/foo-1.1.0b1.zip", release_base),
                "homepage": "https://example.com/foo/1.1.0b1"
            }
        }
    })
}
