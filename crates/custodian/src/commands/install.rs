//! Install command
//!
//! Installs a component and then walks the recovery flow of its outcome:
//! a failed install can be retried, a successful one ends with an optional
//! host restart.

use crate::cli::InstallArgs;
use crate::host::ShellHost;
use crate::output;
use anyhow::{anyhow, bail, Result};
use camino::Utf8Path;
use custodian_core::ManagerConfig;
use custodian_install::{
    ComponentManager, InstallOutcome, InstallOutcomeRecord, IssueMode, RecoveryFlow,
    RecoveryState,
};
use dialoguer::Confirm;
use std::sync::Arc;

pub async fn run(args: InstallArgs, config: Option<&Utf8Path>, entry: Option<&str>) -> Result<()> {
    let config = super::load_config(config)?;
    let manager = Arc::new(super::build_manager(&config, entry)?);

    // Retries check that the entry is still attached
    manager.attach().await?;
    let result = install(&args, &config, &manager).await;
    manager.detach().await;

    result
}

async fn install(
    args: &InstallArgs,
    config: &ManagerConfig,
    manager: &Arc<ComponentManager>,
) -> Result<()> {
    let target = match &args.version {
        Some(version) => format!("{}@{}", args.component, version),
        None => format!("the latest supported version of {}", args.component),
    };

    if !confirm(&format!("Install {}?", target), args.yes)? {
        output::info("Installation cancelled");
        return Ok(());
    }

    let spinner = output::spinner(&format!("Installing {}...", target));
    let record = manager
        .install_component(&args.component, args.version.as_deref(), IssueMode::Raise)
        .await;
    spinner.finish_and_clear();
    let record = record?;
    report(&record);

    if args.no_repair {
        return match record.outcome {
            InstallOutcome::Success => Ok(()),
            InstallOutcome::Failed => bail!("Installation of {} failed", record.component_id),
        };
    }

    let host = Arc::new(ShellHost::new(config.host.restart_command.clone()));
    let mut flow = RecoveryFlow::new(
        record.issue_id(),
        manager.registry().clone(),
        manager.clone(),
        host.clone(),
    );
    flow.start().await;

    loop {
        match flow.state().clone() {
            RecoveryState::Init => {
                flow.start().await;
            }
            RecoveryState::Retry => {
                if !confirm(&format!("Retry installing {}?", record.component_id), args.yes)? {
                    bail!("Installation of {} failed", record.component_id);
                }

                let spinner = output::spinner("Retrying installation...");
                let state = flow.confirm().await;
                spinner.finish_and_clear();
                state?;

                if let Some(retried) = flow.record() {
                    report(retried);
                }
            }
            RecoveryState::ConfirmRestart => {
                if !host.can_restart() {
                    output::info("Restart the host to load the new version");
                    return Ok(());
                }
                if !confirm("Restart the host now?", args.yes)? {
                    output::info("Restart the host later to load the new version");
                    return Ok(());
                }
                flow.confirm().await?;
            }
            RecoveryState::Aborted(reason) => {
                return Err(anyhow!("{}", reason));
            }
            RecoveryState::Done => {
                output::success("Host restart requested");
                return Ok(());
            }
        }
    }
}

fn report(record: &InstallOutcomeRecord) {
    match record.outcome {
        InstallOutcome::Success => output::success(&format!(
            "Installed {}@{}",
            record.component_id,
            record.desired_tag()
        )),
        InstallOutcome::Failed => output::error(&format!(
            "Installation of {}@{} did not complete",
            record.component_id,
            record.desired_tag()
        )),
    }
}

fn confirm(prompt: &str, assume_yes: bool) -> Result<bool> {
    if assume_yes {
        return Ok(true);
    }

    Ok(Confirm::new().with_prompt(prompt).default(false).interact()?)
}
