//! Extension config engine
//!
//! [`ExtensionConfig`] owns the working copy of one kind's installed
//! extensions. It validates records (dropping invalid ones from the active
//! set), writes every mutation through to the [`ManifestStore`], and
//! resolves where an extension lives and which class it exports.
//!
//! ```ignore
//! let store = Arc::new(FileManifestStore::from_config(&host).await?);
//! let registrar = Arc::new(JsonSchemaRegistry::new());
//! let mut drivers = DriverConfig::new(DriverKind, store, registrar, None).await?;
//! drivers.validate();
//! let class = drivers.load_main_class("fakeDriver")?;
//! ```

use crate::kinds::{DriverKind, ExtensionKindSpec, PluginKind};
use crate::loader::{
    CachedModuleLoader, LoaderConfig, MainClass, ModuleLoader, ModuleResolver, PackageResolver,
};
use crate::manifest::ManifestStore;
use crate::validator::{GenericValidator, SchemaValidator};
use extman_core::config::DEFAULT_PACKAGES_DIR;
use extman_core::types::{
    fields, ExtensionKind, ExtensionRecord, ExtensionRegistry, Problem, RawExtensionRecord,
    RawRegistry,
};
use extman_core::{Error, Result, SchemaRegistrar};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Receives operator-facing output lines
pub type LogFn = Arc<dyn Fn(&str) + Send + Sync>;

/// Engine for installed drivers
pub type DriverConfig = ExtensionConfig<DriverKind>;

/// Engine for installed plugins
pub type PluginConfig = ExtensionConfig<PluginKind>;

/// Problems found for one extension during validation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationReport {
    pub name: String,
    pub problems: Vec<Problem>,
}

/// Working copy of one kind's installed extensions
pub struct ExtensionConfig<K: ExtensionKindSpec> {
    spec: K,
    store: Arc<dyn ManifestStore>,
    registrar: Arc<dyn SchemaRegistrar>,
    resolver: Arc<dyn ModuleResolver>,
    loader: Arc<dyn ModuleLoader>,
    log: LogFn,
    packages_dir: String,
    installed: RawRegistry,
}

fn default_log() -> LogFn {
    Arc::new(|line: &str| info!("{}", line))
}

impl<K: ExtensionKindSpec> ExtensionConfig<K> {
    /// Load the installed records of `spec`'s kind from `store`
    ///
    /// Operator output goes to `log`, or to `tracing` when `None`.
    pub async fn new(
        spec: K,
        store: Arc<dyn ManifestStore>,
        registrar: Arc<dyn SchemaRegistrar>,
        log: Option<LogFn>,
    ) -> Result<Self> {
        let kind = spec.kind();
        let installed = store.extension_data(kind).await?;
        debug!("Loaded {} {} record(s)", installed.len(), kind);

        Ok(Self {
            spec,
            store,
            registrar,
            resolver: Arc::new(PackageResolver::default()),
            loader: Arc::new(CachedModuleLoader::new(LoaderConfig::default())),
            log: log.unwrap_or_else(default_log),
            packages_dir: DEFAULT_PACKAGES_DIR.to_string(),
            installed,
        })
    }

    /// Use a different module resolver
    pub fn with_resolver(mut self, resolver: Arc<dyn ModuleResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    /// Use a different (typically shared) module loader
    pub fn with_loader(mut self, loader: Arc<dyn ModuleLoader>) -> Self {
        self.loader = loader;
        self
    }

    /// Directory name packages are installed under (default `node_modules`)
    pub fn with_packages_dir(mut self, packages_dir: impl Into<String>) -> Self {
        self.packages_dir = packages_dir.into();
        self
    }

    pub fn kind(&self) -> ExtensionKind {
        self.spec.kind()
    }

    pub fn manifest_path(&self) -> &Path {
        self.store.manifest_path()
    }

    /// Raw records in the working copy
    pub fn installed(&self) -> &RawRegistry {
        &self.installed
    }

    /// Names in the working copy, sorted
    pub fn installed_names(&self) -> Vec<&str> {
        self.installed.keys().map(String::as_str).collect()
    }

    /// Check if an extension is installed
    pub fn is_installed(&self, name: &str) -> bool {
        self.installed.contains_key(name)
    }

    fn raw(&self, name: &str) -> Result<&RawExtensionRecord> {
        self.installed
            .get(name)
            .ok_or_else(|| Error::not_installed(self.kind(), name))
    }

    /// Typed record for an installed extension
    pub fn record(&self, name: &str) -> Result<ExtensionRecord> {
        let raw = self.raw(name)?;
        GenericValidator::new(self.kind())
            .validate(raw)
            .map_err(|problems| Error::InvalidRecord {
                kind: self.kind(),
                name: name.to_string(),
                problems: problems
                    .iter()
                    .map(|p| format!("  - {}", p))
                    .collect::<Vec<_>>()
                    .join("\n"),
            })
    }

    /// Run every validator over one record
    ///
    /// Generic, kind-specific and schema problems are concatenated. A
    /// declared schema is registered even if other fields are broken.
    pub fn check_record(
        &self,
        name: &str,
        record: &RawExtensionRecord,
    ) -> std::result::Result<ExtensionRecord, Vec<Problem>> {
        let kind = self.kind();
        let generic = GenericValidator::new(kind).validate(record);

        let mut problems = match &generic {
            Ok(_) => Vec::new(),
            Err(problems) => problems.clone(),
        };
        problems.extend(self.spec.kind_problems(record));

        let package_dir = self.package_dir_of(record);
        let schema_validator =
            SchemaValidator::new(kind, self.registrar.as_ref(), self.resolver.as_ref());
        problems.extend(schema_validator.validate(name, record, package_dir.as_deref()));

        match generic {
            Ok(typed) if problems.is_empty() => Ok(typed),
            _ => Err(problems),
        }
    }

    /// Validate `records`, removing every record with problems
    ///
    /// Problems are written to the operator log, one block per broken
    /// extension under a single header. Returns the surviving records and
    /// the reports for the removed ones.
    pub fn validate_records(
        &self,
        records: &mut RawRegistry,
    ) -> (ExtensionRegistry, Vec<ValidationReport>) {
        let kind = self.kind();
        let mut valid = ExtensionRegistry::new();
        let mut rejected = Vec::new();

        for (name, record) in records.iter() {
            match self.check_record(name, record) {
                Ok(typed) => {
                    debug!("{} {} is valid", kind, name);
                    valid.insert(name.clone(), typed);
                }
                Err(problems) => {
                    warn!(
                        "Removing {} {} from the active set: {} problem(s)",
                        kind,
                        name,
                        problems.len()
                    );
                    rejected.push(ValidationReport {
                        name: name.clone(),
                        problems,
                    });
                }
            }
        }

        for report in &rejected {
            records.remove(&report.name);
        }

        if !rejected.is_empty() {
            (self.log)(&self.problem_summary(&rejected));
        }

        (valid, rejected)
    }

    /// Validate the working copy in place; see [`validate_records`](Self::validate_records)
    ///
    /// Removal only affects the working copy; the manifest keeps the record.
    pub fn validate_with_reports(&mut self) -> (ExtensionRegistry, Vec<ValidationReport>) {
        let mut records = std::mem::take(&mut self.installed);
        let outcome = self.validate_records(&mut records);
        self.installed = records;
        outcome
    }

    /// Validate the working copy in place, returning the valid records
    pub fn validate(&mut self) -> ExtensionRegistry {
        self.validate_with_reports().0
    }

    fn problem_summary(&self, rejected: &[ValidationReport]) -> String {
        let kind = self.kind();
        let mut lines = vec![format!(
            "Encountered errors while validating the {} extension file ({}):",
            kind.section(),
            self.store.manifest_path().display()
        )];
        for report in rejected {
            lines.push(format!("- {} \"{}\" had errors:", kind.title(), report.name));
            for problem in &report.problems {
                lines.push(format!("  - {}", problem));
            }
        }
        lines.join("\n")
    }

    /// Record a newly installed extension
    ///
    /// Returns `true` if the manifest changed.
    pub async fn add_extension(&mut self, name: &str, record: RawExtensionRecord) -> Result<bool> {
        let changed = self
            .store
            .add_extension(self.kind(), name, record.clone())
            .await?;
        self.installed.insert(name.to_string(), record);
        Ok(changed)
    }

    /// Shallow-merge `patch` into an installed record and persist it
    ///
    /// The working copy only changes once the manifest write succeeds.
    pub async fn update_extension(&mut self, name: &str, patch: RawExtensionRecord) -> Result<()> {
        let kind = self.kind();
        let mut updated = self.raw(name)?.clone();
        updated.merge(patch);

        let previous = self.store.extension_data(kind).await?;
        let mut durable = previous.clone();
        durable.insert(name.to_string(), updated.clone());
        self.persist(kind, durable, previous).await?;

        self.installed.insert(name.to_string(), updated);
        info!("Updated {} {} in manifest", kind, name);
        Ok(())
    }

    /// Remove an extension from the working copy and the manifest
    ///
    /// Removing an unknown name is a no-op. Returns `true` if anything was
    /// removed. The working copy only changes once the manifest write
    /// succeeds.
    pub async fn remove_extension(&mut self, name: &str) -> Result<bool> {
        let kind = self.kind();

        let previous = self.store.extension_data(kind).await?;
        let removed_durable = previous.contains_key(name);
        if removed_durable {
            let mut durable = previous.clone();
            durable.remove(name);
            self.persist(kind, durable, previous).await?;
            info!("Removed {} {} from manifest", kind, name);
        } else {
            debug!("{} {} not in manifest; nothing to remove", kind, name);
        }

        let removed_local = self.installed.remove(name).is_some();
        Ok(removed_local || removed_durable)
    }

    /// Replace one kind's durable records and write them
    ///
    /// On failure the store is handed back `previous`.
    async fn persist(
        &self,
        kind: ExtensionKind,
        durable: RawRegistry,
        previous: RawRegistry,
    ) -> Result<()> {
        self.store.set_extension_data(kind, durable).await?;
        if let Err(e) = self.store.write().await {
            warn!("Manifest write failed for {}s: {}", kind, e);
            self.store.set_extension_data(kind, previous).await?;
            return Err(e);
        }
        Ok(())
    }

    fn home(&self) -> &Path {
        self.store.framework_home()
    }

    fn package_dir_of(&self, record: &RawExtensionRecord) -> Option<PathBuf> {
        record
            .get_str(fields::PACKAGE_NAME)
            .map(|package| self.home().join(&self.packages_dir).join(package))
    }

    /// Absolute install directory: `<home>/<installPath>`
    pub fn install_path(&self, name: &str) -> Result<PathBuf> {
        let raw = self.raw(name)?;
        let install_path = raw
            .get_str(fields::INSTALL_PATH)
            .ok_or_else(|| self.missing_field(name, fields::INSTALL_PATH))?;
        Ok(self.home().join(install_path))
    }

    /// Absolute package directory: `<home>/<packages dir>/<packageName>`
    pub fn require_path(&self, name: &str) -> Result<PathBuf> {
        let raw = self.raw(name)?;
        self.package_dir_of(raw)
            .ok_or_else(|| self.missing_field(name, fields::PACKAGE_NAME))
    }

    fn missing_field(&self, name: &str, field: &str) -> Error {
        Error::InvalidRecord {
            kind: self.kind(),
            name: name.to_string(),
            problems: format!("  - missing or non-string '{}'", field),
        }
    }

    /// Resolve and load the main class of an installed extension
    ///
    /// With force-reload enabled on the loader, the cached entry module is
    /// evicted first.
    pub fn load_main_class(&self, name: &str) -> Result<MainClass> {
        let record = self.record(name)?;
        let package_dir = self.require_path(name)?;
        let entry = self.resolver.resolve(&package_dir, ".")?;

        if self.loader.force_reload() && self.loader.evict(&entry) {
            debug!("Force reload: evicted {:?}", entry);
        }

        let module = self.loader.load(&entry)?;
        let class_name = module.export(&record.main_class_name)?;
        debug!(
            "Loaded {} {} main class {} from {:?}",
            self.kind(),
            name,
            class_name,
            module.path()
        );

        Ok(MainClass {
            name: class_name.to_string(),
            module_path: module.path().to_path_buf(),
            package_dir,
        })
    }

    /// One-line description of an installed extension
    pub fn describe(&self, name: &str) -> Result<String> {
        let record = self.record(name)?;
        self.spec.describe(name, &record)
    }

    /// Write an inventory of installed extensions to the operator log
    ///
    /// Names in `active_names` are marked `[active]`.
    pub fn list_installed(&self, active_names: Option<&[&str]>) -> Result<()> {
        let kind = self.kind();

        if self.installed.is_empty() {
            (self.log)(&format!(
                "No {}s have been installed. Use the \"extman {} install\" command to install the one(s) you want to use.",
                kind, kind
            ));
            return Ok(());
        }

        (self.log)(&format!("Available {}s:", kind));
        for name in self.installed.keys() {
            let description = match self.describe(name) {
                Ok(description) => description,
                Err(Error::InvalidRecord { .. }) => format!("{} (invalid manifest record)", name),
                Err(e) => return Err(e),
            };
            let active = active_names.is_some_and(|names| names.contains(&name.as_str()));
            if active {
                (self.log)(&format!("  - {} [active]", description));
            } else {
                (self.log)(&format!("  - {}", description));
            }
        }

        Ok(())
    }
}
