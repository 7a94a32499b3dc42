//! CLI argument parsing with clap

use clap::builder::BoolishValueParser;
use clap::{Args, Parser, Subcommand};
use extman_core::config::{HOME_ENV, RELOAD_ENV};
use extman_core::HostConfig;
use std::path::PathBuf;

/// extman - Manage the drivers and plugins installed for an automation host
#[derive(Parser, Debug)]
#[command(name = "extman")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Framework home directory (default: ~/.extman)
    #[arg(long, global = true, env = HOME_ENV)]
    pub home: Option<PathBuf>,

    /// Evict cached extension modules before loading them
    #[arg(long, global = true, env = RELOAD_ENV, value_parser = BoolishValueParser::new())]
    pub reload: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Host configuration from flags, falling back to the default home
    pub fn host_config(&self) -> anyhow::Result<HostConfig> {
        let config = match &self.home {
            Some(home) => HostConfig::new(home),
            None => HostConfig::from_env()?,
        };
        Ok(config.with_force_reload(self.reload))
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Installed driver management
    #[command(subcommand)]
    Driver(ExtensionCommands),

    /// Installed plugin management
    #[command(subcommand)]
    Plugin(ExtensionCommands),
}

// Extension commands
#[derive(Subcommand, Debug)]
pub enum ExtensionCommands {
    /// List installed extensions
    List(ExtensionListArgs),

    /// Validate every installed extension record
    Validate(ExtensionValidateArgs),

    /// Show an installed extension's record
    Info(ExtensionNameArgs),

    /// Show where an extension is installed
    Path(ExtensionNameArgs),

    /// Resolve and load an extension's main class
    Load(ExtensionNameArgs),

    /// Change fields of an installed extension's record
    Update(ExtensionUpdateArgs),

    /// Remove an extension from the manifest
    Remove(ExtensionNameArgs),
}

#[derive(Args, Debug)]
pub struct ExtensionListArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Mark these extensions as active
    #[arg(long, value_delimiter = ',')]
    pub active: Vec<String>,
}

#[derive(Args, Debug)]
pub struct ExtensionValidateArgs {
    /// Output problems as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct ExtensionNameArgs {
    /// Extension name as recorded in the manifest
    pub name: String,
}

#[derive(Args, Debug)]
pub struct ExtensionUpdateArgs {
    /// Extension name as recorded in the manifest
    pub name: String,

    /// Field assignment (`field=value`); values are parsed as JSON when possible
    #[arg(long = "set", value_name = "FIELD=VALUE", required = true)]
    pub assignments: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_driver_list() {
        let cli = Cli::try_parse_from(["extman", "driver", "list", "--json"]).unwrap();
        match cli.command {
            Commands::Driver(ExtensionCommands::List(args)) => {
                assert!(args.json);
                assert!(args.active.is_empty());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_update_assignments() {
        let cli = Cli::try_parse_from([
            "extman",
            "plugin",
            "update",
            "fakePlugin",
            "--set",
            "version=1.2.0",
            "--set",
            "installType=local",
        ])
        .unwrap();
        match cli.command {
            Commands::Plugin(ExtensionCommands::Update(args)) => {
                assert_eq!(args.name, "fakePlugin");
                assert_eq!(args.assignments, vec!["version=1.2.0", "installType=local"]);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_update_requires_assignment() {
        assert!(Cli::try_parse_from(["extman", "plugin", "update", "fakePlugin"]).is_err());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "extman", "driver", "load", "fakeDriver", "--home", "/tmp/host", "--reload", "-vv",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(cli.reload);

        let config = cli.host_config().unwrap();
        assert_eq!(config.home, PathBuf::from("/tmp/host"));
        assert_eq!(config.manifest_path, PathBuf::from("/tmp/host/extensions.yaml"));
        assert!(config.force_reload);
    }
}
