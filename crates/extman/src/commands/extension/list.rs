//! Extension list command

use anyhow::{Context, Result};
use extman_core::HostConfig;
use extman_extensions::ExtensionKindSpec;

use super::common::{open_engine, stdout_log};
use crate::cli::ExtensionListArgs;

/// List installed extensions
///
/// Supports:
/// - Inventory: `extman driver list`
/// - Mark active ones: `extman driver list --active fakeDriver`
/// - JSON output (raw records): `extman driver list --json`
pub(super) async fn run<K: ExtensionKindSpec>(
    spec: K,
    args: ExtensionListArgs,
    config: &HostConfig,
) -> Result<()> {
    let engine = open_engine(spec, config, Some(stdout_log())).await?;

    if args.json {
        let json = serde_json::to_string_pretty(engine.installed())
            .context("Failed to serialize installed extensions to JSON")?;
        println!("{}", json);
        return Ok(());
    }

    let active: Vec<&str> = args.active.iter().map(String::as_str).collect();
    engine.list_installed(Some(active.as_slice()))?;
    Ok(())
}
