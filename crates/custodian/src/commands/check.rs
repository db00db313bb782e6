//! Check command

use crate::cli::CheckArgs;
use crate::output;
use anyhow::Result;
use camino::Utf8Path;
use custodian_install::UpdateStatus;
use tabled::{settings::Style, Table, Tabled};
use tracing::debug;

#[derive(Tabled)]
struct StatusRow {
    #[tabled(rename = "COMPONENT")]
    id: String,
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "INSTALLED")]
    installed: String,
    #[tabled(rename = "LATEST")]
    latest: String,
    #[tabled(rename = "STATUS")]
    status: String,
}

impl From<UpdateStatus> for StatusRow {
    fn from(status: UpdateStatus) -> Self {
        let show = |v: Option<semver::Version>| v.map_or_else(|| "-".to_string(), |v| v.to_string());
        let state = if status.update_available {
            "update available"
        } else {
            "up to date"
        };

        Self {
            id: status.component_id,
            name: status.component_name,
            installed: show(status.installed_version),
            latest: show(status.latest_version),
            status: state.to_string(),
        }
    }
}

pub async fn run(args: CheckArgs, config: Option<&Utf8Path>, entry: Option<&str>) -> Result<()> {
    let config = super::load_config(config)?;
    let mut manager = super::build_manager(&config, entry)?;

    if args.unstable && !manager.entry().show_unstable {
        let mut options = manager.entry().clone();
        options.show_unstable = true;
        let reconciliation = manager.reconfigure(options).await?;
        debug!("Considering pre-releases: {:?}", reconciliation);
    }

    let component_ids = match &args.component {
        Some(id) => vec![id.clone()],
        None => manager
            .installed_components()
            .await?
            .into_iter()
            .map(|(id, _)| id)
            .collect(),
    };

    let spinner = output::spinner("Checking for updates...");
    let mut statuses = Vec::new();
    let mut not_installed = Vec::new();
    for id in component_ids {
        match manager.check_update(&id).await {
            Ok(Some(status)) => statuses.push(status),
            Ok(None) => not_installed.push(id),
            Err(e) => {
                spinner.finish_and_clear();
                return Err(e.into());
            }
        }
    }
    spinner.finish_and_clear();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&statuses)?);
        return Ok(());
    }

    for id in &not_installed {
        output::info(&format!("{} is not installed", id));
    }
    if statuses.is_empty() {
        if args.component.is_none() {
            output::info("No repository components are installed");
        }
        return Ok(());
    }

    let updates = statuses.iter().filter(|s| s.update_available).count();
    let rows: Vec<StatusRow> = statuses.into_iter().map(StatusRow::from).collect();
    let mut table = Table::new(rows);
    table.with(Style::sharp());
    println!("{}", table);

    if updates > 0 {
        output::info(&format!(
            "{} update(s) available, run 'custodian install <component>'",
            updates
        ));
    } else {
        output::success("All components are up to date");
    }

    Ok(())
}
