//! Extension update command

use anyhow::{anyhow, Result};
use extman_core::types::RawExtensionRecord;
use extman_core::HostConfig;
use extman_extensions::ExtensionKindSpec;
use serde_json::Value;

use super::common::open_engine;
use crate::cli::ExtensionUpdateArgs;
use crate::output;

/// Shallow-merge `--set field=value` assignments into an installed record
///
/// Values that parse as JSON (`3`, `true`, `["iOS"]`) are stored as such;
/// anything else is stored as a string.
pub(super) async fn run<K: ExtensionKindSpec>(
    spec: K,
    args: ExtensionUpdateArgs,
    config: &HostConfig,
) -> Result<()> {
    let patch = parse_assignments(&args.assignments)?;
    let mut engine = open_engine(spec, config, None).await?;
    let kind = engine.kind();

    engine.update_extension(&args.name, patch).await?;
    output::success(&format!("Updated {} {}", kind, args.name));

    let record = engine
        .installed()
        .get(&args.name)
        .ok_or_else(|| extman_core::Error::not_installed(kind, &args.name))?;
    let problems = engine
        .check_record(&args.name, record)
        .err()
        .unwrap_or_default();
    for problem in &problems {
        output::warning(&problem.to_string());
    }

    Ok(())
}

fn parse_assignments(assignments: &[String]) -> Result<RawExtensionRecord> {
    let mut patch = RawExtensionRecord::new();
    for assignment in assignments {
        let (field, raw) = assignment
            .split_once('=')
            .ok_or_else(|| anyhow!("Invalid assignment '{}': expected FIELD=VALUE", assignment))?;
        let field = field.trim();
        if field.is_empty() {
            return Err(anyhow!("Invalid assignment '{}': empty field name", assignment));
        }
        let value = serde_json::from_str::<Value>(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
        patch.insert(field, value);
    }
    Ok(patch)
}
