//! On-disk manifest document (`extensions.yaml`)

use super::{ExtensionKind, RawRegistry};
use serde::{Deserialize, Serialize};

/// Current manifest schema revision
pub const CURRENT_SCHEMA_REV: u32 = 1;

/// Manifest of installed extensions, one section per kind
///
/// ```yaml
/// schemaRev: 1
/// drivers:
///   fakeDriver:
///     version: 1.0.0
///     packageName: fake-driver
/// plugins: {}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestFile {
    /// Manifest schema revision
    #[serde(default = "default_schema_rev")]
    pub schema_rev: u32,

    /// Installed drivers
    #[serde(default)]
    pub drivers: RawRegistry,

    /// Installed plugins
    #[serde(default)]
    pub plugins: RawRegistry,
}

fn default_schema_rev() -> u32 {
    CURRENT_SCHEMA_REV
}

impl Default for ManifestFile {
    fn default() -> Self {
        Self {
            schema_rev: CURRENT_SCHEMA_REV,
            drivers: RawRegistry::new(),
            plugins: RawRegistry::new(),
        }
    }
}

impl ManifestFile {
    /// Records of one kind
    pub fn section(&self, kind: ExtensionKind) -> &RawRegistry {
        match kind {
            ExtensionKind::Driver => &self.drivers,
            ExtensionKind::Plugin => &self.plugins,
        }
    }

    pub fn section_mut(&mut self, kind: ExtensionKind) -> &mut RawRegistry {
        match kind {
            ExtensionKind::Driver => &mut self.drivers,
            ExtensionKind::Plugin => &mut self.plugins,
        }
    }

    /// Whether the manifest needs migration
    pub fn needs_migration(&self) -> bool {
        self.schema_rev != CURRENT_SCHEMA_REV
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_sections_default_to_empty() {
        let manifest: ManifestFile = serde_yaml_ng::from_str("drivers: {}\n").unwrap();
        assert_eq!(manifest.schema_rev, CURRENT_SCHEMA_REV);
        assert!(manifest.section(ExtensionKind::Plugin).is_empty());
        assert!(!manifest.needs_migration());
    }

    #[test]
    fn test_sections_are_keyed_by_kind() {
        let yaml = r#"
schemaRev: 1
drivers:
  fakeDriver:
    version: 1.0.0
    installType: npm
plugins:
  fakePlugin:
    version: 0.1.0
"#;
        let manifest: ManifestFile = serde_yaml_ng::from_str(yaml).unwrap();
        let drivers = manifest.section(ExtensionKind::Driver);
        assert_eq!(drivers.len(), 1);
        assert_eq!(drivers["fakeDriver"].get_str("installType"), Some("npm"));
        assert!(manifest.section(ExtensionKind::Plugin).contains_key("fakePlugin"));
    }
}
