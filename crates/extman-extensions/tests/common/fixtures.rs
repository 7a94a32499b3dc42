//! Test fixture utilities
//!
//! Provides a throwaway framework home with installed packages and a
//! manifest, plus builders for well-formed manifest records.

#![allow(dead_code)]

use super::constants::*;
use anyhow::{Context, Result};
use extman_core::types::RawExtensionRecord;
use extman_extensions::FileManifestStore;
use serde_json::json;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

/// Framework home in a temporary directory
pub struct FixtureHome {
    temp_dir: TempDir,
}

impl FixtureHome {
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new().context("Failed to create temp directory")?;
        Ok(Self { temp_dir })
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.path().join("extensions.yaml")
    }

    /// Directory of an installed package
    pub fn package_dir(&self, package_name: &str) -> PathBuf {
        self.path().join("node_modules").join(package_name)
    }

    /// Write files into an installed package, creating it if needed
    pub fn write_package(&self, package_name: &str, files: &[(&str, &str)]) -> Result<PathBuf> {
        let dir = self.package_dir(package_name);
        for (relative, content) in files {
            let path = dir.join(relative);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {:?}", parent))?;
            }
            std::fs::write(&path, content).with_context(|| format!("Failed to write {:?}", path))?;
        }
        Ok(dir)
    }

    /// Install the fake driver package (entry module and schema)
    pub fn install_fake_driver(&self) -> Result<PathBuf> {
        self.write_package(
            FAKE_DRIVER_PACKAGE,
            &[
                (
                    "package.json",
                    r#"{ "name": "fake-driver", "main": "lib/driver.js" }"#,
                ),
                ("lib/driver.js", FAKE_DRIVER_SOURCE),
                ("build/lib/fake-driver-schema.json", FAKE_DRIVER_SCHEMA),
            ],
        )
    }

    /// Install the fake plugin package (entry module only)
    pub fn install_fake_plugin(&self) -> Result<PathBuf> {
        self.write_package(FAKE_PLUGIN_PACKAGE, &[("index.js", FAKE_PLUGIN_SOURCE)])
    }

    /// Replace the manifest file
    pub fn write_manifest(&self, yaml: &str) -> Result<()> {
        std::fs::write(self.manifest_path(), yaml).context("Failed to write manifest")
    }

    pub fn read_manifest(&self) -> Result<String> {
        std::fs::read_to_string(self.manifest_path()).context("Failed to read manifest")
    }

    /// Open the manifest of this home
    pub async fn open_store(&self) -> Result<Arc<FileManifestStore>> {
        let store = FileManifestStore::open(self.path(), self.manifest_path()).await?;
        Ok(Arc::new(store))
    }
}

/// Well-formed fields shared by every kind
pub fn common_record(package: &str, class: &str) -> RawExtensionRecord {
    RawExtensionRecord::new()
        .with("version", TEST_VERSION)
        .with("packageName", package)
        .with("installSpec", format!("{}@{}", package, TEST_VERSION))
        .with("installType", "npm")
        .with("installPath", format!("node_modules/{}", package))
        .with("mainClassName", class)
}

/// The fake driver as recorded after installation
pub fn fake_driver_record() -> RawExtensionRecord {
    common_record(FAKE_DRIVER_PACKAGE, FAKE_DRIVER_CLASS)
        .with("automationName", "Fake")
        .with("platformNames", json!(["iOS", "Android"]))
        .with("schema", "./build/lib/fake-driver-schema.json")
}

/// The fake plugin as recorded after installation
pub fn fake_plugin_record() -> RawExtensionRecord {
    common_record(FAKE_PLUGIN_PACKAGE, FAKE_PLUGIN_CLASS)
}
