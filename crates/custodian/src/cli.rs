//! CLI argument parsing with clap

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};

/// Custodian - keep custom components up to date from a component repository
#[derive(Parser, Debug)]
#[command(name = "custodian")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to config file (default: ~/.custodian/config.yaml)
    #[arg(short, long, global = true, env = "CUSTODIAN_CONFIG")]
    pub config: Option<Utf8PathBuf>,

    /// Repository entry to use when several are configured
    #[arg(long, global = true)]
    pub entry: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the components of the repository
    List(ListArgs),

    /// Show versions of a component installable on this host
    Versions(VersionsArgs),

    /// Install or update a component
    #[command(disable_version_flag = true)]
    Install(InstallArgs),

    /// Check installed components for updates
    Check(CheckArgs),

    /// Show the release notes of a component
    Changelog(ChangelogArgs),

    /// Configuration management
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct VersionsArgs {
    /// Component id
    pub component: String,

    /// Include pre-release versions
    #[arg(long)]
    pub unstable: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct InstallArgs {
    /// Component id
    pub component: String,

    /// Version to install (default: newest supported)
    #[arg(long)]
    pub version: Option<String>,

    /// Skip confirmation prompts
    #[arg(short, long)]
    pub yes: bool,

    /// Do not offer retry or restart afterwards
    #[arg(long)]
    pub no_repair: bool,
}

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Component id (default: every installed component)
    pub component: Option<String>,

    /// Consider pre-release versions
    #[arg(long)]
    pub unstable: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct ChangelogArgs {
    /// Component id
    pub component: String,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show the resolved configuration
    Show(ConfigShowArgs),

    /// Validate the configuration
    Validate,
}

#[derive(Args, Debug)]
pub struct ConfigShowArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}
