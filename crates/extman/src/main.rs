//! extman CLI - manage installed drivers and plugins
//!
//! This is the main entry point for the extman command-line interface.

mod cli;
mod commands;
mod output;

use anyhow::Result;
use clap::Parser;
use extman_extensions::{DriverKind, PluginKind};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI args
    let cli = Cli::parse();

    // Initialize tracing
    init_tracing(cli.verbose, cli.quiet);

    let config = cli.host_config()?;

    // Run command
    match cli.command {
        Commands::Driver(cmd) => commands::extension::run(DriverKind, cmd, &config).await,
        Commands::Plugin(cmd) => commands::extension::run(PluginKind, cmd, &config).await,
    }
}

/// Initialize tracing with appropriate verbosity
fn init_tracing(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            // Operator output goes to stdout; diagnostics start at warn
            0 => EnvFilter::new("warn"),
            1 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}
