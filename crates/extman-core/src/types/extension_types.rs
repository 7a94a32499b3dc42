//! Extension record types
//!
//! A record enters the system as a [`RawExtensionRecord`] (whatever the
//! manifest holds) and only becomes an [`ExtensionRecord`] once the required
//! fields have been checked.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Manifest field names shared by every extension kind
pub mod fields {
    pub const VERSION: &str = "version";
    pub const PACKAGE_NAME: &str = "packageName";
    pub const INSTALL_SPEC: &str = "installSpec";
    pub const INSTALL_TYPE: &str = "installType";
    pub const INSTALL_PATH: &str = "installPath";
    pub const MAIN_CLASS_NAME: &str = "mainClassName";
    pub const SCHEMA: &str = "schema";
}

/// Kind of extension managed by the host framework
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtensionKind {
    Driver,
    Plugin,
}

impl ExtensionKind {
    /// All known kinds
    pub const ALL: [ExtensionKind; 2] = [ExtensionKind::Driver, ExtensionKind::Plugin];

    /// Singular lowercase name (`driver`)
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtensionKind::Driver => "driver",
            ExtensionKind::Plugin => "plugin",
        }
    }

    /// Manifest section holding records of this kind (`drivers`)
    pub fn section(&self) -> &'static str {
        match self {
            ExtensionKind::Driver => "drivers",
            ExtensionKind::Plugin => "plugins",
        }
    }

    /// Capitalized name for operator-facing messages (`Driver`)
    pub fn title(&self) -> &'static str {
        match self {
            ExtensionKind::Driver => "Driver",
            ExtensionKind::Plugin => "Plugin",
        }
    }
}

impl fmt::Display for ExtensionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExtensionKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "driver" | "drivers" => Ok(ExtensionKind::Driver),
            "plugin" | "plugins" => Ok(ExtensionKind::Plugin),
            other => Err(format!("Unknown extension kind: {}", other)),
        }
    }
}

/// How an extension was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstallType {
    /// Package-manager registry
    Npm,
    /// Local filesystem path
    Local,
    /// Git URL
    Git,
    /// Hosted GitHub repository
    Github,
}

impl InstallType {
    pub const ALL: [InstallType; 4] = [
        InstallType::Npm,
        InstallType::Local,
        InstallType::Git,
        InstallType::Github,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            InstallType::Npm => "npm",
            InstallType::Local => "local",
            InstallType::Git => "git",
            InstallType::Github => "github",
        }
    }
}

impl fmt::Display for InstallType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InstallType {
    type Err = String;

    /// Install types are matched exactly; `NPM` is not `npm`.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        InstallType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("Unknown install type: {}", s))
    }
}

/// Configuration schema declared by an extension
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SchemaRef {
    /// Path to a schema file, relative to the extension's package
    Path(String),
    /// Schema object embedded in the manifest
    Inline(Map<String, Value>),
}

/// A validated extension record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtensionRecord {
    /// Semantic version of the extension
    pub version: String,

    /// Package providing the extension
    pub package_name: String,

    /// Specifier originally used to install it
    pub install_spec: String,

    /// How the extension was obtained
    pub install_type: InstallType,

    /// Install directory, relative to the framework home
    pub install_path: String,

    /// Export the host instantiates
    pub main_class_name: String,

    /// Optional configuration schema
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<SchemaRef>,

    /// Kind-specific fields (e.g. a driver's `automationName`)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ExtensionRecord {
    /// Look up a kind-specific string field
    pub fn extra_str(&self, field: &str) -> Option<&str> {
        self.extra.get(field).and_then(Value::as_str)
    }
}

/// An extension record as stored in the manifest, not yet validated
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawExtensionRecord(Map<String, Value>);

impl RawExtensionRecord {
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Get a field; `None` when absent
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Get a field only if it is a string
    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.0.get(field).and_then(Value::as_str)
    }

    /// Set a field, returning the previous value
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(field.into(), value.into())
    }

    /// Builder-style [`insert`](Self::insert)
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(field, value);
        self
    }

    /// Remove a field
    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.0.remove(field)
    }

    /// Shallow merge: every top-level field of `patch` replaces the same
    /// field here; fields not named by `patch` are kept.
    pub fn merge(&mut self, patch: RawExtensionRecord) {
        for (key, value) in patch.0 {
            self.0.insert(key, value);
        }
    }

    pub fn fields(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for RawExtensionRecord {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl TryFrom<Value> for RawExtensionRecord {
    type Error = Value;

    /// Only JSON objects are records; anything else is handed back.
    fn try_from(value: Value) -> std::result::Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(other),
        }
    }
}

impl From<&ExtensionRecord> for RawExtensionRecord {
    fn from(record: &ExtensionRecord) -> Self {
        match serde_json::to_value(record) {
            Ok(Value::Object(map)) => Self(map),
            // A struct with named fields always serializes to an object
            _ => Self::default(),
        }
    }
}

/// Name → raw record, for one extension kind
pub type RawRegistry = BTreeMap<String, RawExtensionRecord>;

/// Name → validated record, for one extension kind
pub type ExtensionRegistry = BTreeMap<String, ExtensionRecord>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fake_driver_json() -> Value {
        json!({
            "version": "1.0.0",
            "packageName": "fake-driver",
            "installSpec": "fake-driver@1.0.0",
            "installType": "npm",
            "installPath": "node_modules/fake-driver",
            "mainClassName": "FakeDriver",
            "automationName": "Fake",
            "platformNames": ["iOS", "Android"]
        })
    }

    #[test]
    fn test_record_deserializes_with_extra_fields() {
        let record: ExtensionRecord = serde_json::from_value(fake_driver_json()).unwrap();
        assert_eq!(record.package_name, "fake-driver");
        assert_eq!(record.install_type, InstallType::Npm);
        assert!(record.schema.is_none());
        assert_eq!(record.extra_str("automationName"), Some("Fake"));
        assert!(record.extra.contains_key("platformNames"));
    }

    #[test]
    fn test_schema_ref_untagged() {
        let path: SchemaRef = serde_json::from_value(json!("./schema.json")).unwrap();
        assert_eq!(path, SchemaRef::Path("./schema.json".to_string()));

        let inline: SchemaRef = serde_json::from_value(json!({"type": "object"})).unwrap();
        assert!(matches!(inline, SchemaRef::Inline(_)));
    }

    #[test]
    fn test_raw_from_typed_keeps_camel_case_names() {
        let record: ExtensionRecord = serde_json::from_value(fake_driver_json()).unwrap();
        let raw = RawExtensionRecord::from(&record);
        assert_eq!(raw.get_str(fields::MAIN_CLASS_NAME), Some("FakeDriver"));
        assert_eq!(raw.get_str("automationName"), Some("Fake"));
        assert!(raw.get(fields::SCHEMA).is_none());
    }

    #[test]
    fn test_merge_is_shallow() {
        let mut raw = RawExtensionRecord::try_from(fake_driver_json()).unwrap();
        raw.merge(
            RawExtensionRecord::new()
                .with("version", "2.0.0")
                .with("platformNames", json!(["Windows"])),
        );
        assert_eq!(raw.get_str("version"), Some("2.0.0"));
        assert_eq!(raw.get("platformNames"), Some(&json!(["Windows"])));
        assert_eq!(raw.get_str("packageName"), Some("fake-driver"));
    }

    #[test]
    fn test_install_type_parse_is_exact() {
        assert_eq!("github".parse::<InstallType>(), Ok(InstallType::Github));
        assert!("NPM".parse::<InstallType>().is_err());
        assert!("bogus".parse::<InstallType>().is_err());
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(ExtensionKind::Driver.section(), "drivers");
        assert_eq!(ExtensionKind::Plugin.title(), "Plugin");
        assert_eq!("plugins".parse::<ExtensionKind>(), Ok(ExtensionKind::Plugin));
    }
}
