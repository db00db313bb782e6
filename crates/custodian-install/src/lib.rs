//! # custodian-install
//!
//! The install side of Custodian:
//! - [`ComponentInstaller`]: replaces `custom_components/{id}` with the
//!   contents of a release archive
//! - [`OutcomeTracker`]: compares the installed manifest against the
//!   desired version and raises an issue with the host
//! - [`ManagerRegistry`]: attached repository entries and repair records
//! - [`ComponentManager`]: the host-facing operations of one repository entry
//! - [`RecoveryFlow`]: the retry / restart state machine behind an issue

pub mod error;
pub mod installer;
pub mod manager;
pub mod manifest;
pub mod outcome;
pub mod recovery;
pub mod registry;

pub use error::{InstallError, RecoveryError, RegistryError, ResolutionError, ServiceError};
pub use installer::ComponentInstaller;
pub use manager::{select_install_target, ComponentManager, IssueMode, UpdateStatus};
pub use manifest::ManifestReader;
pub use outcome::{
    InstallOutcome, InstallOutcomeRecord, Issue, IssueKind, IssueReporter, IssueSeverity,
    OutcomeTracker, NOT_RETRIEVED,
};
pub use recovery::{AbortReason, HostControl, InstallRetry, RecoveryFlow, RecoveryState};
pub use registry::ManagerRegistry;
