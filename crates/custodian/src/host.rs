//! Host integration for the command line
//!
//! Issues are printed to the terminal and the host is restarted with the
//! configured shell command.

use crate::output;
use async_trait::async_trait;
use custodian_install::{HostControl, Issue, IssueKind, IssueReporter, IssueSeverity, ServiceError};
use tracing::{debug, info};

/// Prints issues instead of storing them in a host registry
pub struct ConsoleIssueReporter;

impl IssueReporter for ConsoleIssueReporter {
    fn register(&self, issue: Issue) {
        debug!("Registered issue {} ({})", issue.issue_id, issue.kind);
        let message = issue_message(&issue);

        match issue.severity {
            IssueSeverity::Warning => output::warning(&message),
            IssueSeverity::Error => output::error(&message),
        }
        if let Some(url) = &issue.learn_more_url {
            output::kv("Learn more", url.as_str());
        }
    }
}

/// Human readable text of an issue
pub fn issue_message(issue: &Issue) -> String {
    let get = |key: &str| issue.placeholders.get(key).map_or("", String::as_str);

    match issue.kind {
        IssueKind::RestartRequired => format!(
            "{} was updated to {}; restart the host to load it",
            get("component_name"),
            get("desired_version")
        ),
        IssueKind::UpdateFailed => format!(
            "{} could not be updated to {} (installed: {})",
            get("component_name"),
            get("desired_version"),
            get("installed_version")
        ),
    }
}

/// Restarts the host through `host.restart-command`
pub struct ShellHost {
    restart_command: Option<String>,
}

impl ShellHost {
    pub fn new(restart_command: Option<String>) -> Self {
        Self { restart_command }
    }

    pub fn can_restart(&self) -> bool {
        self.restart_command.is_some()
    }
}

#[async_trait]
impl HostControl for ShellHost {
    async fn restart(&self) -> Result<(), ServiceError> {
        let Some(command) = self.restart_command.clone() else {
            return Err(ServiceError::new(
                "No restart command configured (host.restart-command)",
            ));
        };

        info!("Restarting host: {}", command);
        let result = tokio::task::spawn_blocking(move || {
            duct::cmd("sh", ["-c", command.as_str()])
                .stdout_null()
                .stderr_capture()
                .unchecked()
                .run()
        })
        .await
        .map_err(|e| ServiceError::new(format!("Restart task failed: {}", e)))?
        .map_err(|e| ServiceError::new(format!("Failed to run restart command: {}", e)))?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            return Err(ServiceError::new(format!(
                "Restart command exited with {}: {}",
                result.status,
                stderr.trim()
            )));
        }

        Ok(())
    }
}
