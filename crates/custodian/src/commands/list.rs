//! List command

use crate::cli::ListArgs;
use crate::output;
use anyhow::Result;
use camino::Utf8Path;
use tabled::{settings::Style, Table, Tabled};

#[derive(Tabled)]
struct ComponentRow {
    #[tabled(rename = "COMPONENT")]
    id: String,
    #[tabled(rename = "DESCRIPTION")]
    description: String,
}

pub async fn run(args: ListArgs, config: Option<&Utf8Path>, entry: Option<&str>) -> Result<()> {
    let config = super::load_config(config)?;
    let manager = super::build_manager(&config, entry)?;

    let spinner = output::spinner("Fetching repository index...");
    let components = manager.list_components().await;
    spinner.finish_and_clear();
    let components = components?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&components)?);
        return Ok(());
    }

    if components.is_empty() {
        output::info("The repository lists no components");
        return Ok(());
    }

    output::header(&format!("Components ({})", manager.entry().normalized_base_url()));
    let rows: Vec<ComponentRow> = components
        .into_iter()
        .map(|(id, description)| ComponentRow { id, description })
        .collect();

    let mut table = Table::new(rows);
    table.with(Style::sharp());
    println!("{}", table);

    Ok(())
}
