//! Validation problems

use serde::Serialize;
use serde_json::Value;
use std::fmt;

/// A single validation finding: what is wrong, and the value that caused it
///
/// Problems are reported and used to drop records from the active registry;
/// they are never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Problem {
    /// Human-readable description
    pub message: String,

    /// Offending value (`null` when the field is missing)
    pub value: Value,
}

impl Problem {
    pub fn new(message: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            message: message.into(),
            value: value.into(),
        }
    }

    /// Problem for a value that may be absent from the record
    pub fn for_field(message: impl Into<String>, value: Option<&Value>) -> Self {
        Self::new(message, value.cloned().unwrap_or(Value::Null))
    }

    /// The offending value as compact JSON
    pub fn value_json(&self) -> String {
        serde_json::to_string(&self.value).unwrap_or_else(|_| "<unserializable>".to_string())
    }
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (value: {})", self.message, self.value_json())
    }
}
