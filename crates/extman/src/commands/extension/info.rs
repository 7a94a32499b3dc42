//! Extension info and path commands

use anyhow::Result;
use extman_core::HostConfig;
use extman_extensions::ExtensionKindSpec;

use super::common::open_engine;
use crate::cli::ExtensionNameArgs;
use crate::output;

/// Show an installed extension's description and record fields
pub(super) async fn run<K: ExtensionKindSpec>(
    spec: K,
    args: ExtensionNameArgs,
    config: &HostConfig,
) -> Result<()> {
    let engine = open_engine(spec, config, None).await?;
    let record = engine
        .installed()
        .get(&args.name)
        .ok_or_else(|| extman_core::Error::not_installed(engine.kind(), &args.name))?;

    match engine.describe(&args.name) {
        Ok(description) => output::header(&description),
        Err(e @ extman_core::Error::InvalidRecord { .. }) => {
            output::header(&args.name);
            output::warning(&e.to_string());
        }
        Err(e) => return Err(e.into()),
    }

    for (field, value) in record.fields() {
        let value = match value.as_str() {
            Some(s) => s.to_string(),
            None => value.to_string(),
        };
        output::kv(field, &value);
    }

    Ok(())
}

/// Show install and require paths
pub(super) async fn run_path<K: ExtensionKindSpec>(
    spec: K,
    args: ExtensionNameArgs,
    config: &HostConfig,
) -> Result<()> {
    let engine = open_engine(spec, config, None).await?;

    let install_path = engine.install_path(&args.name)?;
    let require_path = engine.require_path(&args.name)?;

    output::kv("install path", &install_path.display().to_string());
    output::kv("require path", &require_path.display().to_string());
    if !require_path.is_dir() {
        output::warning(&format!("{} does not exist", require_path.display()));
    }

    Ok(())
}
