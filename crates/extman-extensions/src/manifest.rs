//! Installed-extension manifest storage
//!
//! The manifest records every installed extension, per kind. It lives at
//! `<home>/extensions.yaml`:
//!
//! ```yaml
//! schemaRev: 1
//! drivers:
//!   fakeDriver:
//!     version: 1.0.0
//!     packageName: fake-driver
//!     installSpec: fake-driver@1.0.0
//!     installType: npm
//!     installPath: node_modules/fake-driver
//!     mainClassName: FakeDriver
//! plugins: {}
//! ```
//!
//! Engines read a snapshot of one section, mutate their own working copy and
//! hand it back before calling [`ManifestStore::write`].

use async_trait::async_trait;
use extman_core::types::{ExtensionKind, ManifestFile, RawExtensionRecord, RawRegistry};
use extman_core::{HostConfig, Result};
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Durable storage for installed-extension records
#[async_trait]
pub trait ManifestStore: Send + Sync {
    /// Path of the durable manifest
    fn manifest_path(&self) -> &Path;

    /// Framework home directory that install paths are relative to
    fn framework_home(&self) -> &Path;

    /// Snapshot of the records for one kind
    async fn extension_data(&self, kind: ExtensionKind) -> Result<RawRegistry>;

    /// Insert or replace a record and persist it
    ///
    /// Returns `true` if the manifest changed.
    async fn add_extension(
        &self,
        kind: ExtensionKind,
        name: &str,
        record: RawExtensionRecord,
    ) -> Result<bool>;

    /// Replace all records of one kind (in memory; call [`write`](Self::write))
    async fn set_extension_data(&self, kind: ExtensionKind, data: RawRegistry) -> Result<()>;

    /// Persist the current state
    async fn write(&self) -> Result<()>;
}

/// YAML-file-backed manifest store
pub struct FileManifestStore {
    /// Path to manifest file
    manifest_path: PathBuf,

    /// Framework home
    home: PathBuf,

    /// Current manifest data
    manifest: RwLock<ManifestFile>,
}

impl FileManifestStore {
    /// Open the manifest at `manifest_path`
    ///
    /// Creates the manifest file if it doesn't exist.
    pub async fn open(home: impl Into<PathBuf>, manifest_path: impl Into<PathBuf>) -> Result<Self> {
        let home = home.into();
        let manifest_path = manifest_path.into();
        debug!("Loading manifest from: {:?}", manifest_path);

        let manifest = if tokio::fs::try_exists(&manifest_path).await? {
            Self::load_manifest(&manifest_path).await?
        } else {
            info!("Creating new manifest at: {:?}", manifest_path);
            let manifest = ManifestFile::default();
            Self::save_manifest(&manifest_path, &manifest).await?;
            manifest
        };

        if manifest.needs_migration() {
            warn!(
                "Manifest {:?} has schema revision {}; records will be read as-is",
                manifest_path, manifest.schema_rev
            );
        }

        Ok(Self {
            manifest_path,
            home,
            manifest: RwLock::new(manifest),
        })
    }

    /// Open the manifest described by a host configuration
    pub async fn from_config(config: &HostConfig) -> Result<Self> {
        Self::open(&config.home, &config.manifest_path).await
    }

    /// Copy of the whole manifest document
    pub async fn snapshot(&self) -> ManifestFile {
        self.manifest.read().await.clone()
    }

    async fn load_manifest(path: &Path) -> Result<ManifestFile> {
        let content = tokio::fs::read_to_string(path).await?;
        let manifest: ManifestFile = if content.trim().is_empty() {
            ManifestFile::default()
        } else {
            serde_yaml_ng::from_str(&content)?
        };
        debug!(
            "Loaded manifest with {} drivers and {} plugins",
            manifest.drivers.len(),
            manifest.plugins.len()
        );
        Ok(manifest)
    }

    async fn save_manifest(path: &Path, manifest: &ManifestFile) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let content = serde_yaml_ng::to_string(manifest)?;
        tokio::fs::write(path, content).await?;
        debug!(
            "Saved manifest with {} drivers and {} plugins",
            manifest.drivers.len(),
            manifest.plugins.len()
        );
        Ok(())
    }
}

#[async_trait]
impl ManifestStore for FileManifestStore {
    fn manifest_path(&self) -> &Path {
        &self.manifest_path
    }

    fn framework_home(&self) -> &Path {
        &self.home
    }

    async fn extension_data(&self, kind: ExtensionKind) -> Result<RawRegistry> {
        Ok(self.manifest.read().await.section(kind).clone())
    }

    async fn add_extension(
        &self,
        kind: ExtensionKind,
        name: &str,
        record: RawExtensionRecord,
    ) -> Result<bool> {
        let changed = {
            let mut manifest = self.manifest.write().await;
            let previous = manifest
                .section_mut(kind)
                .insert(name.to_string(), record.clone());
            previous.as_ref() != Some(&record)
        };

        if changed {
            info!("Recorded {} {} in manifest", kind, name);
            self.write().await?;
        } else {
            debug!("{} {} already recorded with identical data", kind, name);
        }

        Ok(changed)
    }

    async fn set_extension_data(&self, kind: ExtensionKind, data: RawRegistry) -> Result<()> {
        *self.manifest.write().await.section_mut(kind) = data;
        Ok(())
    }

    async fn write(&self) -> Result<()> {
        let manifest = self.manifest.read().await;
        Self::save_manifest(&self.manifest_path, &manifest).await
    }
}
