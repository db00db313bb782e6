//! Config command

use crate::cli::{ConfigCommands, ConfigShowArgs};
use crate::output;
use anyhow::Result;
use camino::Utf8Path;

pub fn run(cmd: ConfigCommands, config: Option<&Utf8Path>) -> Result<()> {
    match cmd {
        ConfigCommands::Show(args) => show(args, config),
        ConfigCommands::Validate => validate(config),
    }
}

fn show(args: ConfigShowArgs, path: Option<&Utf8Path>) -> Result<()> {
    let loader = super::config_loader(path)?;
    let config = loader.load_unchecked()?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    output::kv("Config file", loader.config_path().as_str());
    println!("{}", serde_yaml_ng::to_string(&config)?);
    Ok(())
}

fn validate(path: Option<&Utf8Path>) -> Result<()> {
    let loader = super::config_loader(path)?;
    output::info(&format!("Validating {}", loader.config_path()));

    let config = match loader.load() {
        Ok(config) => config,
        Err(e) => {
            output::error(&e.to_string());
            return Err(e.into());
        }
    };

    output::success("Configuration is valid");
    output::kv("Host version", &config.host_version()?.to_string());
    output::kv("Components", config.components_dir().as_str());

    for entry in &config.repositories {
        output::header(entry.title.as_deref().unwrap_or(entry.normalized_base_url()));
        output::kv("Entry id", &entry.entry_id());
        output::kv("Base URL", entry.normalized_base_url());
        output::kv("Polling", &format!("every {} hours", entry.polling_hours));
        output::kv("Pre-releases", if entry.show_unstable { "yes" } else { "no" });
    }

    Ok(())
}
