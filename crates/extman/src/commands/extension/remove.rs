//! Extension remove command

use anyhow::Result;
use extman_core::HostConfig;
use extman_extensions::ExtensionKindSpec;

use super::common::open_engine;
use crate::cli::ExtensionNameArgs;
use crate::output;

/// Remove an extension's record from the manifest
///
/// Installed package files are left in place. Removing an unknown name is
/// not an error.
pub(super) async fn run<K: ExtensionKindSpec>(
    spec: K,
    args: ExtensionNameArgs,
    config: &HostConfig,
) -> Result<()> {
    let mut engine = open_engine(spec, config, None).await?;
    let kind = engine.kind();

    if engine.remove_extension(&args.name).await? {
        output::success(&format!("Removed {} {} from the manifest", kind, args.name));
    } else {
        output::info(&format!("{} {} is not installed; nothing to remove", kind, args.name));
    }

    Ok(())
}
