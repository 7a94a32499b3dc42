//! Extension management for extman
//!
//! This crate handles:
//! - The installed-extension manifest (load, write-through updates)
//! - Record validation (required fields, kind-specific fields, schemas)
//! - Schema registration during validation
//! - Install/require path resolution
//! - Module resolution and main-class loading

pub mod config;
pub mod kinds;
pub mod loader;
pub mod manifest;
pub mod validator;

pub use config::{DriverConfig, ExtensionConfig, LogFn, PluginConfig, ValidationReport};
pub use kinds::{DriverKind, ExtensionKindSpec, PluginKind};
pub use loader::{
    CachedModuleLoader, LoadedModule, LoaderConfig, MainClass, ModuleLoader, ModuleResolver,
    PackageResolver,
};
pub use manifest::{FileManifestStore, ManifestStore};
pub use validator::{GenericValidator, SchemaValidator};
