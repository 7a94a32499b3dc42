//! Extension validate command

use anyhow::{Context, Result};
use extman_core::HostConfig;
use extman_extensions::ExtensionKindSpec;
use tabled::{settings::Style, Table, Tabled};

use super::common::open_engine;
use crate::cli::ExtensionValidateArgs;
use crate::output;

#[derive(Tabled)]
struct ProblemRow {
    extension: String,
    problem: String,
    value: String,
}

/// Validate every installed extension record
///
/// Invalid records are reported, not removed from the manifest. Exits with
/// an error when any record is invalid.
pub(super) async fn run<K: ExtensionKindSpec>(
    spec: K,
    args: ExtensionValidateArgs,
    config: &HostConfig,
) -> Result<()> {
    let kind = spec.kind();
    let mut engine = open_engine(spec, config, None).await?;
    let (valid, rejected) = engine.validate_with_reports();

    if args.json {
        let json = serde_json::to_string_pretty(&rejected)
            .context("Failed to serialize validation problems to JSON")?;
        println!("{}", json);
    } else if rejected.is_empty() {
        output::success(&format!("{} {}(s) valid", valid.len(), kind));
        return Ok(());
    } else {
        let rows: Vec<ProblemRow> = rejected
            .iter()
            .flat_map(|report| {
                report.problems.iter().map(|problem| ProblemRow {
                    extension: report.name.clone(),
                    problem: problem.message.clone(),
                    value: problem.value_json(),
                })
            })
            .collect();

        let mut table = Table::new(&rows);
        table.with(Style::sharp());
        println!("{}", table);
        output::warning(&format!(
            "{} of {} {}(s) invalid in {}",
            rejected.len(),
            valid.len() + rejected.len(),
            kind,
            engine.manifest_path().display()
        ));
    }

    if rejected.is_empty() {
        Ok(())
    } else {
        anyhow::bail!("{} invalid {} record(s)", rejected.len(), kind)
    }
}
