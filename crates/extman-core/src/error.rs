//! Error types for extman-core

use crate::types::ExtensionKind;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using extman-core's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for extman
///
/// Validation problems are not errors; they are collected as
/// [`Problem`](crate::types::Problem) values. These variants cover failures
/// raised at the point of use.
#[derive(Error, Debug)]
pub enum Error {
    /// Requested extension is not in the registry
    #[error("{kind} \"{name}\" is not installed")]
    NotInstalled { kind: ExtensionKind, name: String },

    /// Record exists but does not pass the required-field checks
    #[error("{kind} \"{name}\" has an invalid manifest record:\n{problems}")]
    InvalidRecord {
        kind: ExtensionKind,
        name: String,
        problems: String,
    },

    /// Module specifier could not be resolved from the base directory
    #[error("Cannot find module '{specifier}' from {}", base.display())]
    ModuleNotFound { specifier: String, base: PathBuf },

    /// Loaded module does not export the requested name
    #[error("Module {} does not export '{export}'", path.display())]
    ExportNotFound { export: String, path: PathBuf },

    /// Schema rejected by the registrar
    #[error("Cannot register schema for {kind} \"{name}\": {message}")]
    SchemaRegistration {
        kind: ExtensionKind,
        name: String,
        message: String,
    },

    /// A different schema is already registered under the same key
    #[error("A different schema is already registered for {kind} \"{name}\"")]
    SchemaConflict { kind: ExtensionKind, name: String },

    /// No schema registered for the key
    #[error("No schema registered for {kind} \"{name}\"")]
    SchemaNotFound { kind: ExtensionKind, name: String },

    /// Value failed validation against a registered schema
    #[error("Schema validation failed:\n{errors}")]
    SchemaValidation { errors: String },

    /// An extension kind is missing a required capability
    #[error("{kind} extensions do not implement '{operation}'")]
    NotImplemented {
        kind: ExtensionKind,
        operation: &'static str,
    },

    /// Invalid configuration
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    YamlParse(#[from] serde_yaml_ng::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a not installed error
    pub fn not_installed(kind: ExtensionKind, name: impl Into<String>) -> Self {
        Self::NotInstalled {
            kind,
            name: name.into(),
        }
    }

    /// Create a module not found error
    pub fn module_not_found(specifier: impl Into<String>, base: impl Into<PathBuf>) -> Self {
        Self::ModuleNotFound {
            specifier: specifier.into(),
            base: base.into(),
        }
    }

    /// Create an export not found error
    pub fn export_not_found(export: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self::ExportNotFound {
            export: export.into(),
            path: path.into(),
        }
    }

    /// Create a schema registration error
    pub fn schema_registration(
        kind: ExtensionKind,
        name: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::SchemaRegistration {
            kind,
            name: name.into(),
            message: message.into(),
        }
    }

    /// Create a schema validation error from a list of errors
    pub fn schema_validation(errors: Vec<String>) -> Self {
        Self::SchemaValidation {
            errors: errors.join("\n"),
        }
    }

    /// Create a not implemented error
    pub fn not_implemented(kind: ExtensionKind, operation: &'static str) -> Self {
        Self::NotImplemented { kind, operation }
    }

    /// Create an invalid config error
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Whether this error means the extension name is unknown
    pub fn is_not_installed(&self) -> bool {
        matches!(self, Self::NotInstalled { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_installed_message() {
        let err = Error::not_installed(ExtensionKind::Driver, "fakeDriver");
        assert!(err.is_not_installed());
        assert_eq!(err.to_string(), "driver \"fakeDriver\" is not installed");
    }

    #[test]
    fn test_export_not_found_message_names_path() {
        let err = Error::export_not_found("FakeDriver", "/tmp/fake/index.js");
        let msg = err.to_string();
        assert!(msg.contains("FakeDriver"));
        assert!(msg.contains("/tmp/fake/index.js"));
    }

    #[test]
    fn test_not_implemented_message() {
        let err = Error::not_implemented(ExtensionKind::Plugin, "describe");
        assert_eq!(
            err.to_string(),
            "plugin extensions do not implement 'describe'"
        );
    }
}
