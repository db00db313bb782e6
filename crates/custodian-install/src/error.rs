//! Error types for installation, resolution and recovery

use semver::Version;
use thiserror::Error;
use tracing::error;

/// Installer failures
///
/// Filesystem and archive problems are logged where they happen and surface
/// only as [`InstallError::Extraction`].
#[derive(Error, Debug)]
pub enum InstallError {
    /// The archive could not be unpacked into place
    #[error("Failed to install {component}: {reason}")]
    Extraction { component: String, reason: String },

    /// The id cannot be used as a directory name
    #[error("Invalid component id '{id}': {reason}")]
    InvalidComponentId { id: String, reason: String },

    /// The blocking install task panicked or was cancelled
    #[error("Install task for {component} did not complete: {reason}")]
    Worker { component: String, reason: String },
}

impl InstallError {
    pub fn extraction(component: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Extraction {
            component: component.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_component_id(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidComponentId {
            id: id.into(),
            reason: reason.into(),
        }
    }
}

/// No version can be installed; raised before anything is downloaded
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolutionError {
    #[error("Component {component} is not listed in the repository")]
    UnknownComponent { component: String },

    #[error("No version of {component} supports host version {host_version}")]
    NoInstallableVersion {
        component: String,
        host_version: Version,
    },

    #[error("Version {version} of {component} is not available for host version {host_version}")]
    VersionNotSupported {
        component: String,
        version: String,
        host_version: Version,
    },
}

/// Registry lifecycle errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Repository entry {entry_id} is already attached")]
    AlreadyAttached { entry_id: String },
}

/// Host-visible error returned by every service operation
///
/// The internal error kind is logged when the error is created and is not
/// carried further.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ServiceError {
    pub message: String,
}

impl ServiceError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Log an internal error with its kind and convert it
    pub fn internal(kind: &str, err: &dyn std::error::Error) -> Self {
        error!(kind, "{}", err);
        Self::new(err.to_string())
    }
}

/// Recovery flow misuse or host failure
#[derive(Error, Debug)]
pub enum RecoveryError {
    /// `confirm` was called in a state that has no confirm transition
    #[error("Cannot confirm in state {state}")]
    InvalidTransition { state: String },

    /// The host could not be restarted
    #[error("Restart failed: {0}")]
    Restart(ServiceError),
}
