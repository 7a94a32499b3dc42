//! Shared helpers for extension subcommands

use anyhow::{Context, Result};
use extman_core::{HostConfig, JsonSchemaRegistry};
use extman_extensions::{
    CachedModuleLoader, ExtensionConfig, ExtensionKindSpec, FileManifestStore, LoaderConfig, LogFn,
    PackageResolver,
};
use std::sync::Arc;
use tracing::debug;

use crate::output;

/// Operator lines printed to stdout
pub(super) fn stdout_log() -> LogFn {
    Arc::new(|line: &str| output::engine_line(line))
}

/// Open the manifest and build an engine for `spec`'s kind
///
/// `log` of `None` routes operator lines to tracing.
pub(super) async fn open_engine<K: ExtensionKindSpec>(
    spec: K,
    config: &HostConfig,
    log: Option<LogFn>,
) -> Result<ExtensionConfig<K>> {
    debug!("Opening {} manifest under {:?}", spec.kind(), config.home);
    let store = FileManifestStore::from_config(config)
        .await
        .with_context(|| format!("Failed to open manifest {:?}", config.manifest_path))?;

    let loader = CachedModuleLoader::new(LoaderConfig {
        force_reload: config.force_reload,
    });

    let engine = ExtensionConfig::new(spec, Arc::new(store), Arc::new(JsonSchemaRegistry::new()), log)
        .await
        .context("Failed to read installed extensions")?
        .with_resolver(Arc::new(PackageResolver::new(&config.packages_dir)))
        .with_loader(Arc::new(loader))
        .with_packages_dir(&config.packages_dir);

    Ok(engine)
}
