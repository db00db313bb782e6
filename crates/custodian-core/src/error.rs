//! Error types for custodian-core

use std::fmt;
use thiserror::Error;

/// Result type alias using custodian-core's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// A single schema or semantic violation found in a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Dotted path of the offending key (empty for the document root)
    pub key: String,

    /// What is wrong with it
    pub message: String,
}

impl Violation {
    pub fn new(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.key.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.key, self.message)
        }
    }
}

/// Core error types for Custodian
#[derive(Error, Debug)]
pub enum Error {
    /// Document failed validation
    #[error("Invalid {document} document:\n{}", format_violations(.violations))]
    Validation {
        document: String,
        violations: Vec<Violation>,
    },

    /// Invalid version token
    #[error("Invalid version format: {version}")]
    InvalidVersion { version: String },

    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    /// Invalid configuration format
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// Schema not found
    #[error("Schema not found: {name}")]
    SchemaNotFound { name: String },

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    YamlParse(#[from] serde_yaml_ng::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn format_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(|v| format!("  - {}", v))
        .collect::<Vec<_>>()
        .join("\n")
}

impl Error {
    /// Create a validation error from a list of violations
    pub fn validation(document: impl Into<String>, violations: Vec<Violation>) -> Self {
        Self::Validation {
            document: document.into(),
            violations,
        }
    }

    /// Create an invalid version error
    pub fn invalid_version(version: impl Into<String>) -> Self {
        Self::InvalidVersion {
            version: version.into(),
        }
    }

    /// Create a config not found error
    pub fn config_not_found(path: impl Into<String>) -> Self {
        Self::ConfigNotFound { path: path.into() }
    }

    /// Create an invalid config error
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create a schema not found error
    pub fn schema_not_found(name: impl Into<String>) -> Self {
        Self::SchemaNotFound { name: name.into() }
    }

    /// Violations carried by a validation error, empty for other kinds
    pub fn violations(&self) -> &[Violation] {
        match self {
            Self::Validation { violations, .. } => violations,
            _ => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_lists_every_violation() {
        let err = Error::validation(
            "component",
            vec![
                Violation::new("name", "is required"),
                Violation::new("", "unexpected key 'extra'"),
            ],
        );

        let message = err.to_string();
        assert!(message.starts_with("Invalid component document"));
        assert!(message.contains("  - name: is required"));
        assert!(message.contains("  - unexpected key 'extra'"));
        assert_eq!(err.violations().len(), 2);
    }

    #[test]
    fn test_non_validation_error_has_no_violations() {
        let err = Error::invalid_version("not-a-version");
        assert!(err.violations().is_empty());
        assert_eq!(err.to_string(), "Invalid version format: not-a-version");
    }
}
