//! Extension management commands
//!
//! Implements the per-kind CLI commands (`extman driver ...`, `extman plugin ...`):
//! - list: List installed extensions
//! - validate: Validate records and report problems
//! - info: Show an installed extension's record
//! - path: Show install and require paths
//! - load: Resolve and load the main class
//! - update: Shallow-merge fields into a record
//! - remove: Remove a record from the manifest

mod common;
mod info;
mod list;
mod load;
mod remove;
mod update;
mod validate;

use anyhow::Result;
use extman_core::HostConfig;
use extman_extensions::ExtensionKindSpec;

use crate::cli::ExtensionCommands;

/// Main entry point for extension subcommands
pub async fn run<K: ExtensionKindSpec>(spec: K, cmd: ExtensionCommands, config: &HostConfig) -> Result<()> {
    match cmd {
        ExtensionCommands::List(args) => list::run(spec, args, config).await,
        ExtensionCommands::Validate(args) => validate::run(spec, args, config).await,
        ExtensionCommands::Info(args) => info::run(spec, args, config).await,
        ExtensionCommands::Path(args) => info::run_path(spec, args, config).await,
        ExtensionCommands::Load(args) => load::run(spec, args, config).await,
        ExtensionCommands::Update(args) => update::run(spec, args, config).await,
        ExtensionCommands::Remove(args) => remove::run(spec, args, config).await,
    }
}
