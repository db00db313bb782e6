//! Recovery flow behind an install issue
//!
//! ```text
//! Init ──success──▶ ConfirmRestart ──confirm──▶ Done
//!   │                    ▲
//!   └──failed──▶ Retry ──┤ reinstall reached the desired version
//!                  │
//!                  └──▶ Aborted
//! ```
//!
//! The issue id only correlates the flow with its install record in the
//! registry; all state lives in [`RecoveryState`].

use crate::error::{RecoveryError, ServiceError};
use crate::outcome::{InstallOutcome, InstallOutcomeRecord};
use crate::registry::ManagerRegistry;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};
use url::Url;

/// Re-runs the install pipeline for a record, without raising an issue
#[async_trait]
pub trait InstallRetry: Send + Sync {
    async fn reinstall(
        &self,
        record: &InstallOutcomeRecord,
    ) -> Result<InstallOutcomeRecord, ServiceError>;
}

/// Host operations the flow delegates to
#[async_trait]
pub trait HostControl: Send + Sync {
    async fn restart(&self) -> Result<(), ServiceError>;
}

/// Why a flow ended without a restart
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbortReason {
    /// The retry did not produce the desired version
    InstallError { component: String, release: Url },

    /// The repository entry was removed since the failed attempt
    InvalidConfigEntry {
        component: String,
        desired_version: String,
        entry_id: String,
    },

    /// No install record matches the issue id
    UnknownIssue { issue_id: String },
}

impl AbortReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InstallError { .. } => "install_error",
            Self::InvalidConfigEntry { .. } => "invalid_config_entry",
            Self::UnknownIssue { .. } => "unknown_issue",
        }
    }
}

impl fmt::Display for AbortReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InstallError { component, release } => {
                write!(f, "{} could not be installed, see {}", component, release)
            }
            Self::InvalidConfigEntry {
                component,
                desired_version,
                entry_id,
            } => write!(
                f,
                "{}@{} came from repository entry {}, which no longer exists",
                component, desired_version, entry_id
            ),
            Self::UnknownIssue { issue_id } => write!(f, "No install record for {}", issue_id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecoveryState {
    Init,
    /// Waiting for the user to confirm a reinstall
    Retry,
    /// Waiting for the user to confirm a host restart
    ConfirmRestart,
    Aborted(AbortReason),
    Done,
}

impl RecoveryState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Aborted(_) | Self::Done)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::Retry => "retry",
            Self::ConfirmRestart => "confirm_restart",
            Self::Aborted(_) => "aborted",
            Self::Done => "done",
        }
    }
}

/// One run of the recovery flow for an issue
pub struct RecoveryFlow {
    issue_id: String,
    state: RecoveryState,
    record: Option<InstallOutcomeRecord>,
    registry: ManagerRegistry,
    installer: Arc<dyn InstallRetry>,
    host: Arc<dyn HostControl>,
}

impl RecoveryFlow {
    pub fn new(
        issue_id: impl Into<String>,
        registry: ManagerRegistry,
        installer: Arc<dyn InstallRetry>,
        host: Arc<dyn HostControl>,
    ) -> Self {
        Self {
            issue_id: issue_id.into(),
            state: RecoveryState::Init,
            record: None,
            registry,
            installer,
            host,
        }
    }

    pub fn state(&self) -> &RecoveryState {
        &self.state
    }

    /// Install record the flow is working on
    pub fn record(&self) -> Option<&InstallOutcomeRecord> {
        self.record.as_ref()
    }

    /// Leave `Init` based on the recorded outcome
    pub async fn start(&mut self) -> &RecoveryState {
        if self.state != RecoveryState::Init {
            return &self.state;
        }

        self.record = self.registry.outcome(&self.issue_id).await;
        self.state = match &self.record {
            None => RecoveryState::Aborted(AbortReason::UnknownIssue {
                issue_id: self.issue_id.clone(),
            }),
            Some(record) => match record.outcome {
                InstallOutcome::Success => RecoveryState::ConfirmRestart,
                InstallOutcome::Failed => RecoveryState::Retry,
            },
        };

        &self.state
    }

    /// Confirm the current step
    pub async fn confirm(&mut self) -> Result<&RecoveryState, RecoveryError> {
        match (self.state.clone(), self.record.clone()) {
            (RecoveryState::Retry, Some(record)) => {
                self.state = self.retry(&record).await;
                Ok(&self.state)
            }
            (RecoveryState::ConfirmRestart, _) => {
                self.host.restart().await.map_err(RecoveryError::Restart)?;
                info!("Restart requested for {}", self.issue_id);
                self.registry.clear_outcome(&self.issue_id).await;
                self.state = RecoveryState::Done;
                Ok(&self.state)
            }
            (state, _) => Err(RecoveryError::InvalidTransition {
                state: state.name().to_string(),
            }),
        }
    }

    async fn retry(&mut self, record: &InstallOutcomeRecord) -> RecoveryState {
        if !self.registry.is_attached(&record.entry_id).await {
            return RecoveryState::Aborted(AbortReason::InvalidConfigEntry {
                component: record.component_id.clone(),
                desired_version: record.desired_tag().to_string(),
                entry_id: record.entry_id.clone(),
            });
        }

        let install_error = || {
            RecoveryState::Aborted(AbortReason::InstallError {
                component: record.component_id.clone(),
                release: record.learn_more_url().clone(),
            })
        };

        match self.installer.reinstall(record).await {
            Ok(retried) if retried.installed_version.as_deref() == Some(record.desired_tag()) => {
                self.record = Some(retried);
                RecoveryState::ConfirmRestart
            }
            Ok(retried) => {
                warn!(
                    "Retry of {}@{} installed {:?}",
                    record.component_id,
                    record.desired_tag(),
                    retried.installed_version
                );
                self.record = Some(retried);
                install_error()
            }
            Err(e) => {
                warn!("Retry of {} failed: {}", record.component_id, e);
                install_error()
            }
        }
    }
}
