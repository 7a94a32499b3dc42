//! Extension load command

use anyhow::{Context, Result};
use extman_core::HostConfig;
use extman_extensions::ExtensionKindSpec;

use super::common::{open_engine, stdout_log};
use crate::cli::ExtensionNameArgs;
use crate::output;

/// Validate the manifest, then resolve and load one extension's main class
pub(super) async fn run<K: ExtensionKindSpec>(
    spec: K,
    args: ExtensionNameArgs,
    config: &HostConfig,
) -> Result<()> {
    let mut engine = open_engine(spec, config, Some(stdout_log())).await?;
    let kind = engine.kind();
    let present = engine.is_installed(&args.name);

    engine.validate();
    if present && !engine.is_installed(&args.name) {
        anyhow::bail!("{} \"{}\" has an invalid manifest record", kind, args.name);
    }

    let class = engine
        .load_main_class(&args.name)
        .with_context(|| format!("Failed to load {} \"{}\"", kind, args.name))?;

    output::success(&format!("Loaded {} {} main class {}", kind, args.name, class.name));
    output::kv("module", &class.module_path.display().to_string());
    output::kv("package", &class.package_dir.display().to_string());
    if config.force_reload {
        output::info("Module cache bypassed (reload enabled)");
    }

    Ok(())
}
