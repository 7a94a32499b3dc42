//! Extension record validation
//!
//! Two validators run over every raw manifest record:
//! 1. [`GenericValidator`]: the fields every extension must carry
//! 2. [`SchemaValidator`]: the optional configuration schema, which is
//!    registered with the schema registrar as a side effect
//!
//! Kind-specific checks live in [`crate::kinds`]. None of the validators
//! fail; they return [`Problem`]s.

use crate::loader::ModuleResolver;
use extman_core::types::{
    fields, ExtensionKind, ExtensionRecord, InstallType, Problem, RawExtensionRecord, SchemaRef,
};
use extman_core::{Result, SchemaRegistrar};
use serde_json::Value;
use std::path::Path;
use tracing::debug;

/// Schema file extensions accepted in a record's `schema` field
pub const ALLOWED_SCHEMA_EXTENSIONS: &[&str] = &["json", "yaml", "yml"];

const KNOWN_FIELDS: &[&str] = &[
    fields::VERSION,
    fields::PACKAGE_NAME,
    fields::INSTALL_SPEC,
    fields::INSTALL_TYPE,
    fields::INSTALL_PATH,
    fields::MAIN_CLASS_NAME,
    fields::SCHEMA,
];

/// Checks the fields shared by every extension kind
#[derive(Debug, Clone, Copy)]
pub struct GenericValidator {
    kind: ExtensionKind,
}

impl GenericValidator {
    pub fn new(kind: ExtensionKind) -> Self {
        Self { kind }
    }

    /// Validate a raw record, returning the typed record or every problem found
    pub fn validate(
        &self,
        record: &RawExtensionRecord,
    ) -> std::result::Result<ExtensionRecord, Vec<Problem>> {
        let problems = self.problems(record);
        if !problems.is_empty() {
            return Err(problems);
        }

        let text = |field: &str| record.get_str(field).unwrap_or_default().to_string();
        let install_type = record
            .get_str(fields::INSTALL_TYPE)
            .and_then(|t| t.parse::<InstallType>().ok())
            .ok_or_else(|| vec![Problem::for_field(
                "Missing or incorrect install type",
                record.get(fields::INSTALL_TYPE),
            )])?;

        let schema = match record.get(fields::SCHEMA) {
            Some(Value::String(path)) => Some(SchemaRef::Path(path.clone())),
            Some(Value::Object(map)) => Some(SchemaRef::Inline(map.clone())),
            _ => None,
        };

        let extra = record
            .fields()
            .filter(|(key, _)| !KNOWN_FIELDS.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        Ok(ExtensionRecord {
            version: text(fields::VERSION),
            package_name: text(fields::PACKAGE_NAME),
            install_spec: text(fields::INSTALL_SPEC),
            install_type,
            install_path: text(fields::INSTALL_PATH),
            main_class_name: text(fields::MAIN_CLASS_NAME),
            schema,
            extra,
        })
    }

    /// All problems with the required fields of `record`
    pub fn problems(&self, record: &RawExtensionRecord) -> Vec<Problem> {
        let class_message = format!("Missing or incorrect {} class name", self.kind);
        let string_fields: [(&str, &str); 5] = [
            (fields::VERSION, "Missing or incorrect version"),
            (fields::PACKAGE_NAME, "Missing or incorrect package name"),
            (fields::INSTALL_SPEC, "Missing or incorrect installation spec"),
            (fields::INSTALL_PATH, "Missing or incorrect installation path"),
            (fields::MAIN_CLASS_NAME, class_message.as_str()),
        ];

        let mut problems: Vec<Problem> = string_fields
            .iter()
            .filter(|(field, _)| record.get_str(field).is_none())
            .map(|(field, message)| Problem::for_field(*message, record.get(field)))
            .collect();

        let install_type_ok = record
            .get_str(fields::INSTALL_TYPE)
            .is_some_and(|t| t.parse::<InstallType>().is_ok());
        if !install_type_ok {
            problems.push(Problem::for_field(
                "Missing or incorrect install type",
                record.get(fields::INSTALL_TYPE),
            ));
        }

        problems
    }
}

/// Whether a record declares a configuration schema
pub fn has_schema(record: &RawExtensionRecord) -> bool {
    matches!(
        record.get(fields::SCHEMA),
        Some(Value::String(_)) | Some(Value::Object(_))
    )
}

/// Whether `path` names a schema file type we can load
pub fn is_allowed_schema_file(path: &str) -> bool {
    Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            ALLOWED_SCHEMA_EXTENSIONS
                .iter()
                .any(|allowed| allowed.eq_ignore_ascii_case(ext))
        })
}

/// Read a schema file, parsing JSON or YAML by extension
pub fn read_schema_file(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path)?;
    let is_json = path
        .extension()
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));

    let value = if is_json {
        serde_json::from_str(&content)?
    } else {
        serde_yaml_ng::from_str(&content)?
    };
    Ok(value)
}

/// Resolves and registers extension configuration schemas
pub struct SchemaValidator<'a> {
    kind: ExtensionKind,
    registrar: &'a dyn SchemaRegistrar,
    resolver: &'a dyn ModuleResolver,
}

impl<'a> SchemaValidator<'a> {
    pub fn new(
        kind: ExtensionKind,
        registrar: &'a dyn SchemaRegistrar,
        resolver: &'a dyn ModuleResolver,
    ) -> Self {
        Self {
            kind,
            registrar,
            resolver,
        }
    }

    /// Check the schema declared by `record` and register it
    ///
    /// `package_dir` is the extension's installed package; schema paths are
    /// resolved relative to it. Records without a schema yield no problems
    /// and register nothing.
    pub fn validate(
        &self,
        name: &str,
        record: &RawExtensionRecord,
        package_dir: Option<&Path>,
    ) -> Vec<Problem> {
        if !has_schema(record) {
            return Vec::new();
        }

        match record.get(fields::SCHEMA) {
            Some(Value::String(schema_path)) => {
                if !is_allowed_schema_file(schema_path) {
                    return vec![Problem::new(
                        format!(
                            "Schema file has unsupported extension. Allowed: {}",
                            ALLOWED_SCHEMA_EXTENSIONS
                                .iter()
                                .map(|e| format!(".{}", e))
                                .collect::<Vec<_>>()
                                .join(", ")
                        ),
                        schema_path.as_str(),
                    )];
                }

                match self.register_file(name, schema_path, package_dir) {
                    Ok(()) => Vec::new(),
                    Err(e) => vec![Problem::new(
                        format!("Unable to register schema at path {}; {}", schema_path, e),
                        schema_path.as_str(),
                    )],
                }
            }
            Some(schema @ Value::Object(_)) => match self.registrar.register(self.kind, name, schema)
            {
                Ok(()) => {
                    debug!("Registered inline schema for {} {}", self.kind, name);
                    Vec::new()
                }
                Err(e) => vec![Problem::new(
                    format!("Unable to register schema; {}", e),
                    schema.clone(),
                )],
            },
            _ => Vec::new(),
        }
    }

    fn register_file(
        &self,
        name: &str,
        schema_path: &str,
        package_dir: Option<&Path>,
    ) -> Result<()> {
        let package_dir = package_dir.ok_or_else(|| {
            extman_core::Error::invalid_config("record does not name an installed package")
        })?;

        let specifier = if Path::new(schema_path).is_absolute()
            || schema_path.starts_with("./")
            || schema_path.starts_with("../")
        {
            schema_path.to_string()
        } else {
            format!("./{}", schema_path)
        };

        let resolved = self.resolver.resolve(package_dir, &specifier)?;
        debug!("Loading schema for {} {} from {:?}", self.kind, name, resolved);

        let schema = read_schema_file(&resolved)?;
        self.registrar.register(self.kind, name, &schema)
    }
}
