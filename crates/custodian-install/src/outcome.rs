//! Install outcome tracking and host issues

use crate::manifest::ManifestReader;
use custodian_core::VersionEntry;
use semver::Version;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::{error, info};
use url::Url;

/// Placeholder shown when the installed version could not be read
pub const NOT_RETRIEVED: &str = "[Not retrieved]";

/// Whether an install produced the desired version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InstallOutcome {
    Success,
    Failed,
}

impl InstallOutcome {
    /// `Success` only when the manifest version is exactly the catalog's
    ///
    /// Both sides are compared as written: `1.0` does not match `1.0.0`.
    pub fn classify(desired: &str, installed: Option<&str>) -> Self {
        if installed == Some(desired) {
            Self::Success
        } else {
            Self::Failed
        }
    }
}

/// Everything the recovery flow needs to retry or confirm an install
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstallOutcomeRecord {
    pub component_id: String,
    pub component_name: String,
    pub desired_version: Version,
    /// Manifest version as written, `None` when not installed
    pub installed_version: Option<String>,
    /// Repository entry the install came from
    pub entry_id: String,
    pub version_entry: VersionEntry,
    pub outcome: InstallOutcome,
}

impl InstallOutcomeRecord {
    /// Correlation key of the issue raised for this record
    pub fn issue_id(&self) -> &str {
        &self.component_id
    }

    /// Desired version as spelled in the catalog
    pub fn desired_tag(&self) -> &str {
        &self.version_entry.tag
    }

    pub fn learn_more_url(&self) -> &Url {
        self.version_entry.learn_more_url()
    }

    pub fn placeholders(&self) -> BTreeMap<String, String> {
        BTreeMap::from([
            ("component".to_string(), self.component_id.clone()),
            ("component_name".to_string(), self.component_name.clone()),
            (
                "desired_version".to_string(),
                self.desired_tag().to_string(),
            ),
            (
                "installed_version".to_string(),
                self.installed_version
                    .clone()
                    .unwrap_or_else(|| NOT_RETRIEVED.to_string()),
            ),
        ])
    }

    /// The issue to register with the host
    pub fn issue(&self) -> Issue {
        let kind = match self.outcome {
            InstallOutcome::Success => IssueKind::RestartRequired,
            InstallOutcome::Failed => IssueKind::UpdateFailed,
        };

        Issue {
            issue_id: self.issue_id().to_string(),
            kind,
            severity: kind.severity(),
            placeholders: self.placeholders(),
            learn_more_url: Some(self.learn_more_url().clone()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    RestartRequired,
    UpdateFailed,
}

impl IssueKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RestartRequired => "restart_required",
            Self::UpdateFailed => "update_failed",
        }
    }

    pub fn severity(&self) -> IssueSeverity {
        match self {
            Self::RestartRequired => IssueSeverity::Warning,
            Self::UpdateFailed => IssueSeverity::Error,
        }
    }
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueSeverity {
    Warning,
    Error,
}

/// A notice registered with the host's issue system
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    pub issue_id: String,
    pub kind: IssueKind,
    pub severity: IssueSeverity,
    pub placeholders: BTreeMap<String, String>,
    pub learn_more_url: Option<Url>,
}

/// Host issue registry
pub trait IssueReporter: Send + Sync {
    fn register(&self, issue: Issue);
}

/// Checks installs against the local manifest
#[derive(Clone)]
pub struct OutcomeTracker {
    manifests: ManifestReader,
    reporter: Arc<dyn IssueReporter>,
}

impl OutcomeTracker {
    pub fn new(manifests: ManifestReader, reporter: Arc<dyn IssueReporter>) -> Self {
        Self {
            manifests,
            reporter,
        }
    }

    pub fn manifests(&self) -> &ManifestReader {
        &self.manifests
    }

    /// Manifest version of a component, `None` when it is not installed
    pub async fn check_version_installed(&self, component_id: &str) -> Option<String> {
        self.manifests.installed_version(component_id).await
    }

    /// Classify an install attempt, optionally registering an issue
    pub async fn track(
        &self,
        component_id: &str,
        component_name: &str,
        desired_version: &Version,
        entry_id: &str,
        version_entry: &VersionEntry,
        raise_issue: bool,
    ) -> InstallOutcomeRecord {
        let installed_version = self.check_version_installed(component_id).await;
        let outcome = InstallOutcome::classify(&version_entry.tag, installed_version.as_deref());

        match outcome {
            InstallOutcome::Success => {
                info!("Installation of {}@{} completed", component_id, version_entry.tag)
            }
            InstallOutcome::Failed => error!(
                "Installation of {}@{} failed, manifest reports {:?}",
                component_id, version_entry.tag, installed_version
            ),
        }

        let record = InstallOutcomeRecord {
            component_id: component_id.to_string(),
            component_name: component_name.to_string(),
            desired_version: desired_version.clone(),
            installed_version,
            entry_id: entry_id.to_string(),
            version_entry: version_entry.clone(),
            outcome,
        };

        if raise_issue {
            self.reporter.register(record.issue());
        }

        record
    }
}
