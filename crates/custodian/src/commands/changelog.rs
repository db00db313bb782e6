//! Changelog command

use crate::cli::ChangelogArgs;
use crate::output;
use anyhow::Result;
use camino::Utf8Path;

pub async fn run(args: ChangelogArgs, config: Option<&Utf8Path>, entry: Option<&str>) -> Result<()> {
    let config = super::load_config(config)?;
    let manager = super::build_manager(&config, entry)?;

    match manager.release_notes(&args.component).await {
        Some(notes) => println!("{}", notes.trim_end()),
        None => output::warning(&format!("No release notes available for {}", args.component)),
    }

    Ok(())
}
