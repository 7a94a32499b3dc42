//! JSON Schema registration for extension configuration schemas
//!
//! Extensions may ship a schema describing the options they accept. During
//! validation each schema is handed to a [`SchemaRegistrar`], keyed by the
//! extension's kind and name.

use crate::error::{Error, Result};
use crate::types::ExtensionKind;
use jsonschema::Validator;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::RwLock;
use tracing::debug;

/// Receives configuration schemas declared by extensions
pub trait SchemaRegistrar: Send + Sync {
    /// Register `schema` for the extension `name` of `kind`
    ///
    /// Fails if the schema is structurally invalid.
    fn register(&self, kind: ExtensionKind, name: &str, schema: &Value) -> Result<()>;
}

struct RegisteredSchema {
    source: Value,
    compiled: Validator,
}

/// Schema registrar backed by compiled `jsonschema` validators
#[derive(Default)]
pub struct JsonSchemaRegistry {
    schemas: RwLock<HashMap<(ExtensionKind, String), RegisteredSchema>>,
}

impl std::fmt::Debug for JsonSchemaRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonSchemaRegistry")
            .field("registered", &self.registered())
            .finish()
    }
}

impl JsonSchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if a schema is registered for the extension
    pub fn is_registered(&self, kind: ExtensionKind, name: &str) -> bool {
        self.schemas
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .contains_key(&(kind, name.to_string()))
    }

    /// List registered (kind, name) pairs, sorted
    pub fn registered(&self) -> Vec<(ExtensionKind, String)> {
        let mut keys: Vec<_> = self
            .schemas
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .keys()
            .cloned()
            .collect();
        keys.sort();
        keys
    }

    /// Validate an extension's configuration against its registered schema
    pub fn validate(&self, kind: ExtensionKind, name: &str, value: &Value) -> Result<()> {
        let schemas = self.schemas.read().unwrap_or_else(|e| e.into_inner());
        let schema = schemas
            .get(&(kind, name.to_string()))
            .ok_or_else(|| Error::SchemaNotFound {
                kind,
                name: name.to_string(),
            })?;

        let errors: Vec<String> = schema
            .compiled
            .iter_errors(value)
            .map(|e| {
                let path = e.instance_path().to_string();
                if path.is_empty() {
                    format!("  - {}", e)
                } else {
                    format!("  - {}: {}", path, e)
                }
            })
            .collect();

        if !errors.is_empty() {
            return Err(Error::schema_validation(errors));
        }

        Ok(())
    }
}

impl SchemaRegistrar for JsonSchemaRegistry {
    fn register(&self, kind: ExtensionKind, name: &str, schema: &Value) -> Result<()> {
        if !schema.is_object() {
            return Err(Error::schema_registration(
                kind,
                name,
                "schema must be a JSON object",
            ));
        }

        let key = (kind, name.to_string());
        let mut schemas = self.schemas.write().unwrap_or_else(|e| e.into_inner());

        if let Some(existing) = schemas.get(&key) {
            if &existing.source == schema {
                debug!("Schema for {} {} already registered", kind, name);
                return Ok(());
            }
            return Err(Error::SchemaConflict {
                kind,
                name: name.to_string(),
            });
        }

        let compiled = jsonschema::validator_for(schema)
            .map_err(|e| Error::schema_registration(kind, name, e.to_string()))?;

        debug!("Registered schema for {} {}", kind, name);
        schemas.insert(
            key,
            RegisteredSchema {
                source: schema.clone(),
                compiled,
            },
        );

        Ok(())
    }
}
