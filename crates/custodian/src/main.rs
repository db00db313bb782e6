//! Custodian CLI - keep custom components up to date
//!
//! This is the main entry point for the Custodian command-line interface.

mod cli;
mod commands;
mod host;
mod output;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize rustls crypto provider (required for rustls 0.23+)
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();

    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.quiet);

    let config = cli.config.as_deref();
    let entry = cli.entry.as_deref();

    match cli.command {
        Commands::List(args) => commands::list::run(args, config, entry).await,
        Commands::Versions(args) => commands::versions::run(args, config, entry).await,
        Commands::Install(args) => commands::install::run(args, config, entry).await,
        Commands::Check(args) => commands::check::run(args, config, entry).await,
        Commands::Changelog(args) => commands::changelog::run(args, config, entry).await,
        Commands::Config(args) => commands::config::run(args, config),
    }
}

/// Initialize tracing with appropriate verbosity
fn init_tracing(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("warn"),
            1 => EnvFilter::new("info"),
            2 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}
