//! Mock implementations for testing
//!
//! Provides collaborators that record how the engine drives them, without
//! touching the filesystem.

#![allow(dead_code)]

use async_trait::async_trait;
use extman_core::types::{ExtensionKind, ManifestFile, RawExtensionRecord, RawRegistry};
use extman_core::{Error, Result, SchemaRegistrar};
use extman_extensions::{LogFn, ManifestStore};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Record of a schema registration
#[derive(Clone, Debug, PartialEq)]
pub struct MockRegistration {
    pub kind: ExtensionKind,
    pub name: String,
    pub schema: Value,
}

/// Schema registrar that records every call
#[derive(Default)]
pub struct MockSchemaRegistrar {
    registrations: Arc<Mutex<Vec<MockRegistration>>>,
    reject_with: Option<String>,
}

impl MockSchemaRegistrar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registrar that fails every call with `message`
    pub fn rejecting(message: &str) -> Self {
        Self {
            registrations: Arc::new(Mutex::new(Vec::new())),
            reject_with: Some(message.to_string()),
        }
    }

    pub fn registrations(&self) -> Vec<MockRegistration> {
        self.registrations.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.registrations.lock().unwrap().len()
    }
}

impl SchemaRegistrar for MockSchemaRegistrar {
    fn register(&self, kind: ExtensionKind, name: &str, schema: &Value) -> Result<()> {
        self.registrations.lock().unwrap().push(MockRegistration {
            kind,
            name: name.to_string(),
            schema: schema.clone(),
        });
        match &self.reject_with {
            Some(message) => Err(Error::schema_registration(kind, name, message.clone())),
            None => Ok(()),
        }
    }
}

/// In-memory manifest store that counts writes
pub struct MockManifestStore {
    manifest_path: PathBuf,
    home: PathBuf,
    manifest: Mutex<ManifestFile>,
    writes: Mutex<usize>,
    fail_writes: Mutex<bool>,
}

impl MockManifestStore {
    pub fn new(home: impl Into<PathBuf>) -> Self {
        let home = home.into();
        Self {
            manifest_path: home.join("extensions.yaml"),
            home,
            manifest: Mutex::new(ManifestFile::default()),
            writes: Mutex::new(0),
            fail_writes: Mutex::new(false),
        }
    }

    /// Store preloaded with one kind's records
    pub fn with_records(home: impl Into<PathBuf>, kind: ExtensionKind, records: RawRegistry) -> Self {
        let store = Self::new(home);
        *store.manifest.lock().unwrap().section_mut(kind) = records;
        store
    }

    /// Make every subsequent `write` fail (or succeed again)
    pub fn set_fail_writes(&self, fail: bool) {
        *self.fail_writes.lock().unwrap() = fail;
    }

    pub fn write_count(&self) -> usize {
        *self.writes.lock().unwrap()
    }

    pub fn snapshot(&self) -> ManifestFile {
        self.manifest.lock().unwrap().clone()
    }
}

#[async_trait]
impl ManifestStore for MockManifestStore {
    fn manifest_path(&self) -> &Path {
        &self.manifest_path
    }

    fn framework_home(&self) -> &Path {
        &self.home
    }

    async fn extension_data(&self, kind: ExtensionKind) -> Result<RawRegistry> {
        Ok(self.manifest.lock().unwrap().section(kind).clone())
    }

    async fn add_extension(
        &self,
        kind: ExtensionKind,
        name: &str,
        record: RawExtensionRecord,
    ) -> Result<bool> {
        let changed = {
            let mut manifest = self.manifest.lock().unwrap();
            let previous = manifest
                .section_mut(kind)
                .insert(name.to_string(), record.clone());
            previous.as_ref() != Some(&record)
        };
        if changed {
            self.write().await?;
        }
        Ok(changed)
    }

    async fn set_extension_data(&self, kind: ExtensionKind, data: RawRegistry) -> Result<()> {
        *self.manifest.lock().unwrap().section_mut(kind) = data;
        Ok(())
    }

    async fn write(&self) -> Result<()> {
        if *self.fail_writes.lock().unwrap() {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "manifest is read-only",
            )));
        }
        *self.writes.lock().unwrap() += 1;
        Ok(())
    }
}

/// Captures operator log output
#[derive(Clone, Default)]
pub struct LogCapture {
    lines: Arc<Mutex<Vec<String>>>,
}

impl LogCapture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log_fn(&self) -> LogFn {
        let lines = Arc::clone(&self.lines);
        Arc::new(move |line: &str| lines.lock().unwrap().push(line.to_string()))
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }

    /// Every logged line, split on newlines
    pub fn flat_lines(&self) -> Vec<String> {
        self.lines()
            .iter()
            .flat_map(|l| l.lines().map(str::to_string).collect::<Vec<_>>())
            .collect()
    }

    pub fn count_containing(&self, needle: &str) -> usize {
        self.flat_lines().iter().filter(|l| l.contains(needle)).count()
    }
}
