//! Versions command

use crate::cli::VersionsArgs;
use crate::output;
use anyhow::Result;
use camino::Utf8Path;

pub async fn run(args: VersionsArgs, config: Option<&Utf8Path>, entry: Option<&str>) -> Result<()> {
    let config = super::load_config(config)?;
    let manager = super::build_manager(&config, entry)?;
    let allow_unstable = args.unstable || manager.entry().show_unstable;

    let versions = manager
        .supported_versions(&args.component, allow_unstable)
        .await?;

    if args.json {
        let versions: Vec<String> = versions.iter().map(ToString::to_string).collect();
        println!("{}", serde_json::to_string_pretty(&versions)?);
        return Ok(());
    }

    if versions.is_empty() {
        output::warning(&format!(
            "No version of {} supports host version {}",
            args.component,
            manager.host_version()
        ));
        return Ok(());
    }

    output::header(&format!(
        "{} versions for host {}",
        args.component,
        manager.host_version()
    ));
    for (i, version) in versions.iter().rev().enumerate() {
        if i == 0 {
            println!("  {} (latest)", version);
        } else {
            println!("  {}", version);
        }
    }

    Ok(())
}
