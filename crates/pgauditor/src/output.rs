//! Rendering a finished script for stdout.

use clap::ValueEnum;
use serde::Serialize;

use pgauditor_core::naming::GeneratedNames;
use pgauditor_core::script::DdlScript;
use pgauditor_core::synthesizer::DdlSynthesizer;

/// How the script is written to stdout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Plain SQL, one statement per line.
    #[default]
    Sql,
    /// A JSON report with the generated names and statements.
    Json,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Report<'a> {
    table: String,
    audit_table: &'a str,
    drop_mode: bool,
    names: &'a GeneratedNames,
    statements: &'a DdlScript,
}

/// Renders `script` in the requested format.
pub fn render(
    format: OutputFormat,
    synthesizer: &DdlSynthesizer,
    script: &DdlScript,
) -> serde_json::Result<String> {
    match format {
        OutputFormat::Sql => Ok(script.to_string()),
        OutputFormat::Json => {
            let report = Report {
                table: synthesizer.table().to_string(),
                audit_table: &synthesizer.names().audit_table,
                drop_mode: synthesizer.options().drop_mode,
                names: synthesizer.names(),
                statements: script,
            };
            let mut rendered = serde_json::to_string_pretty(&report)?;
            rendered.push('\n');
            Ok(rendered)
        }
    }
}
