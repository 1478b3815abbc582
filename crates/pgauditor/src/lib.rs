//! Change-auditing DDL for PostgreSQL tables.
//!
//! `pgauditor` connects to a database read-only, inspects one table and
//! prints the DDL that audits every INSERT, UPDATE and DELETE on it.
//! Nothing is executed: the script is meant to be reviewed and applied
//! by an operator.
//!
//! # Architecture
//!
//! - **Catalog** - a [`SchemaInspector`] over the PostgreSQL system catalogs
//! - **Config** - command-line flags and `PG*` environment variables
//! - **Output** - plain SQL or a JSON report
//!
//! Synthesis itself lives in `pgauditor-core`.
//!
//! # CLI Usage
//!
//! ```bash
//! # Audit public.account, recording the session user
//! pgauditor -U postgres -d shop -t account > audit_account.sql
//!
//! # Record an application-supplied user and the application name
//! pgauditor -U postgres -d shop -t sales.order -a application -n
//!
//! # Remove the triggers and trigger functions again
//! pgauditor -U postgres -d shop -t sales.order --drop
//! ```

use tracing::{debug, info};

use pgauditor_core::inspector::SchemaInspector;
use pgauditor_core::script::DdlScript;
use pgauditor_core::synthesizer::DdlSynthesizer;

pub mod catalog;
pub mod config;
pub mod error;
pub mod output;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::catalog::{ConnectionSettings, PgCatalog};
    pub use crate::config::Config;
    pub use crate::error::{CatalogError, Result};
    pub use crate::output::{render, OutputFormat};
}

/// Synthesizes the script for `config` and renders it.
///
/// On failure nothing is rendered and the error is returned for the
/// caller to report. Statements produced before the failure are logged at
/// debug level, marked incomplete.
pub async fn run<I: SchemaInspector>(
    config: &config::Config,
    inspector: &I,
) -> anyhow::Result<String> {
    let synthesizer = DdlSynthesizer::new(
        config.table.clone(),
        config.auth,
        config.synthesis_options(),
    );
    let mut script = DdlScript::new();

    if let Err(err) = synthesizer.synthesize_into(inspector, &mut script).await {
        if !script.is_empty() {
            debug!(
                statements = script.len(),
                "Incomplete script, do not apply:\n{script}"
            );
        }
        return Err(err.into());
    }

    info!(
        table = %config.table,
        statements = script.len(),
        drop_mode = config.drop_mode,
        "Script generated"
    );
    Ok(output::render(config.format, &synthesizer, &script)?)
}
