//! Extension kinds
//!
//! Each kind of extension the host supports contributes its own field checks
//! and a one-line description of an installed record. The engine depends only
//! on [`ExtensionKindSpec`].

use extman_core::types::{ExtensionKind, ExtensionRecord, Problem, RawExtensionRecord};
use extman_core::{Error, Result};
use serde_json::Value;

/// Kind-specific behavior plugged into the extension engine
pub trait ExtensionKindSpec: Send + Sync {
    /// Which kind this is
    fn kind(&self) -> ExtensionKind;

    /// Problems with fields only this kind requires
    fn kind_problems(&self, _record: &RawExtensionRecord) -> Vec<Problem> {
        Vec::new()
    }

    /// One-line description of an installed extension
    ///
    /// Every kind must provide one; the default fails.
    fn describe(&self, _name: &str, _record: &ExtensionRecord) -> Result<String> {
        Err(Error::not_implemented(self.kind(), "describe"))
    }
}

/// Automation drivers
///
/// Drivers declare the automation name clients request them by and the
/// platforms they support.
#[derive(Debug, Clone, Copy, Default)]
pub struct DriverKind;

impl DriverKind {
    pub const AUTOMATION_NAME: &'static str = "automationName";
    pub const PLATFORM_NAMES: &'static str = "platformNames";
}

impl ExtensionKindSpec for DriverKind {
    fn kind(&self) -> ExtensionKind {
        ExtensionKind::Driver
    }

    fn kind_problems(&self, record: &RawExtensionRecord) -> Vec<Problem> {
        let mut problems = Vec::new();

        // Both fields are optional; when present they must be well formed
        match record.get(Self::PLATFORM_NAMES) {
            None => {}
            Some(Value::Array(names)) if names.is_empty() => {
                problems.push(Problem::new("Empty platformNames list.", Value::Array(Vec::new())));
            }
            Some(Value::Array(names)) => {
                for name in names.iter().filter(|n| !n.is_string()) {
                    problems.push(Problem::new("Incorrectly formatted platformName.", name.clone()));
                }
            }
            other => problems.push(Problem::for_field(
                "Missing or incorrect supported platformNames list.",
                other,
            )),
        }

        match record.get(Self::AUTOMATION_NAME) {
            None | Some(Value::String(_)) => {}
            other => problems.push(Problem::for_field(
                "Missing or incorrect automationName",
                other,
            )),
        }

        problems
    }

    fn describe(&self, name: &str, record: &ExtensionRecord) -> Result<String> {
        let automation_name = record.extra_str(Self::AUTOMATION_NAME).unwrap_or("unknown");
        Ok(format!(
            "{}@{} (automationName '{}')",
            name, record.version, automation_name
        ))
    }
}

/// Server plugins; no fields beyond the common ones
#[derive(Debug, Clone, Copy, Default)]
pub struct PluginKind;

impl ExtensionKindSpec for PluginKind {
    fn kind(&self) -> ExtensionKind {
        ExtensionKind::Plugin
    }

    fn describe(&self, name: &str, record: &ExtensionRecord) -> Result<String> {
        Ok(format!("{}@{}", name, record.version))
    }
}
