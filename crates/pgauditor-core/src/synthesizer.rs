//! The synthesis pass.
//!
//! [`DdlSynthesizer`] walks a fixed sequence of steps, asking the
//! [`SchemaInspector`] one question at a time and appending statements to
//! a [`DdlScript`]:
//!
//! 1. drop existing audit triggers,
//! 2. drop existing trigger functions,
//! 3. stop here in drop mode,
//! 4. create the settings helper, sequence and enum type when absent,
//! 5. create the audit table when absent, or verify it has not drifted,
//! 6. create the three trigger functions and their triggers.
//!
//! The audit table, sequence and enum type are never dropped.

use std::collections::HashMap;

use tracing::{debug, info, warn};

use crate::auth::AuthenticationStrategy;
use crate::capture::{
    old_holder, ChangeCaptureBuilder, APPLICATION_NAME_COLUMN, AUDIT_ID_COLUMN,
    CHANGED_AT_COLUMN, CHANGED_BY_COLUMN, OPERATION_COLUMN,
};
use crate::ddl;
use crate::error::{AuditError, Result};
use crate::inspector::SchemaInspector;
use crate::model::{
    AuditOperation, AuthenticationMode, ColumnDescriptor, SynthesisOptions, TableIdentity,
};
use crate::naming::{clip_identifier, GeneratedNames, MAX_IDENTIFIER_BYTES};
use crate::quote::quote_qualified;
use crate::script::DdlScript;

/// Produces the audit DDL for one table.
#[derive(Debug, Clone)]
pub struct DdlSynthesizer {
    table: TableIdentity,
    options: SynthesisOptions,
    names: GeneratedNames,
    auth: AuthenticationStrategy,
}

impl DdlSynthesizer {
    /// Creates a synthesizer for `table`.
    pub fn new(table: TableIdentity, mode: AuthenticationMode, options: SynthesisOptions) -> Self {
        let names = GeneratedNames::for_table(&table);
        let auth = AuthenticationStrategy::new(
            mode,
            options.config_property.clone(),
            quote_qualified(table.schema(), &names.settings_function),
        );
        Self {
            table,
            options,
            names,
            auth,
        }
    }

    /// Returns the audited table.
    #[must_use]
    pub fn table(&self) -> &TableIdentity {
        &self.table
    }

    /// Returns the generated object names.
    #[must_use]
    pub fn names(&self) -> &GeneratedNames {
        &self.names
    }

    /// Returns the options.
    #[must_use]
    pub fn options(&self) -> &SynthesisOptions {
        &self.options
    }

    /// Runs synthesis and returns the finished script.
    pub async fn synthesize<I: SchemaInspector>(&self, inspector: &I) -> Result<DdlScript> {
        let mut script = DdlScript::new();
        self.synthesize_into(inspector, &mut script).await?;
        Ok(script)
    }

    /// Runs synthesis, appending to `script`.
    ///
    /// On error, `script` keeps whatever was appended before the failing
    /// step. It is useful for diagnostics only and must not be applied.
    pub async fn synthesize_into<I: SchemaInspector>(
        &self,
        inspector: &I,
        script: &mut DdlScript,
    ) -> Result<()> {
        let schema = self.table.schema();
        let table = self.table.table();

        info!(
            table = %self.table,
            auth = %self.auth.mode(),
            drop = self.options.drop_mode,
            "Synthesizing audit DDL"
        );

        let columns = inspector
            .columns(schema, table)
            .await
            .map_err(AuditError::catalog)?
            .ok_or_else(|| AuditError::SchemaResolution {
                schema: schema.to_string(),
                table: table.to_string(),
            })?;
        debug!(count = columns.len(), "Fetched source columns");

        if self.names.audit_table.len() > MAX_IDENTIFIER_BYTES {
            warn!(
                audit_table = %self.names.audit_table,
                "Audit table name exceeds {} bytes and will be truncated by PostgreSQL",
                MAX_IDENTIFIER_BYTES
            );
        }

        for op in AuditOperation::ALL {
            let trigger = self.names.trigger(op);
            if inspector
                .trigger_exists(schema, table, trigger)
                .await
                .map_err(AuditError::catalog)?
            {
                debug!(trigger, "Dropping existing trigger");
                script.push(ddl::drop_trigger(&self.table, trigger));
            }
        }

        for op in AuditOperation::ALL {
            let function = self.names.function(op);
            if inspector
                .function_exists(schema, function)
                .await
                .map_err(AuditError::catalog)?
            {
                debug!(function, "Dropping existing trigger function");
                script.push(ddl::drop_function(schema, function));
            }
        }

        if self.options.drop_mode {
            info!(
                statements = script.len(),
                "Drop mode: audit table, sequence and enum type are kept"
            );
            return Ok(());
        }

        check_holder_names(&columns)?;

        let settings = &self.names.settings_function;
        if inspector
            .function_exists(schema, settings)
            .await
            .map_err(AuditError::catalog)?
        {
            debug!(function = %settings, "Settings helper exists");
        } else {
            script.push(ddl::create_settings_function(schema, settings));
        }

        let sequence = &self.names.sequence;
        if inspector
            .sequence_exists(schema, sequence)
            .await
            .map_err(AuditError::catalog)?
        {
            debug!(sequence = %sequence, "Sequence exists");
        } else {
            script.push(ddl::create_sequence(schema, sequence));
        }

        let enum_type = &self.names.enum_type;
        if inspector
            .enum_type_exists(schema, enum_type)
            .await
            .map_err(AuditError::catalog)?
        {
            debug!(enum_type = %enum_type, "Enum type exists");
        } else {
            script.push(ddl::create_enum_type(schema, enum_type));
        }

        // Looked up under the name PostgreSQL stored it as.
        let audit_table = clip_identifier(&self.names.audit_table);
        if inspector
            .table_exists(schema, audit_table)
            .await
            .map_err(AuditError::catalog)?
        {
            let existing = inspector
                .columns(schema, audit_table)
                .await
                .map_err(AuditError::catalog)?
                .unwrap_or_default();
            self.check_drift(&columns, &existing)?;
            debug!(audit_table = %audit_table, "Audit table exists and matches");
        } else {
            script.push(ddl::create_audit_table(
                &self.table,
                &self.names,
                &columns,
                self.options.capture_application_name,
            ));
        }

        for op in AuditOperation::ALL {
            let function =
                ChangeCaptureBuilder::new(op, &self.table, &columns, &self.names, &self.auth)
                    .capture_application_name(self.options.capture_application_name)
                    .build();
            script.push(function);
        }

        for op in AuditOperation::ALL {
            script.push(ddl::create_trigger(&self.table, &self.names, op));
        }

        info!(statements = script.len(), "Audit DDL synthesized");
        Ok(())
    }

    /// Fails when the existing audit table lacks a column the triggers
    /// would write, or declares it with another type.
    fn check_drift(
        &self,
        source: &[ColumnDescriptor],
        existing: &[ColumnDescriptor],
    ) -> Result<()> {
        let present: HashMap<&str, &str> = existing
            .iter()
            .map(|c| (c.name.as_str(), c.native_type.as_str()))
            .collect();

        let required = ddl::audit_data_columns(source, self.options.capture_application_name);
        let mut problems = Vec::new();
        for (name, native_type) in &required {
            match present.get(name.as_str()) {
                None => problems.push(format!("missing column {name} {native_type}")),
                Some(found) if *found != native_type.as_str() => problems.push(format!(
                    "column {name} has type {found}, expected {native_type}"
                )),
                Some(_) => {}
            }
        }

        let fixed = [
            AUDIT_ID_COLUMN,
            OPERATION_COLUMN,
            CHANGED_BY_COLUMN,
            CHANGED_AT_COLUMN,
            APPLICATION_NAME_COLUMN,
        ];
        for column in existing {
            let name = column.name.as_str();
            if !fixed.contains(&name) && !required.iter().any(|(r, _)| r == name) {
                warn!(
                    audit_table = %self.names.audit_table,
                    column = name,
                    "Audit column no longer has a source column; it will stay NULL"
                );
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(AuditError::AuditTableDrift {
                table: format!("{}.{}", self.table.schema(), self.names.audit_table),
                problems,
            })
        }
    }
}

/// Fails when two source columns end up with the same audit column once
/// cut to the identifier limit.
fn check_holder_names(columns: &[ColumnDescriptor]) -> Result<()> {
    let mut seen: HashMap<String, &str> = HashMap::new();
    for column in columns {
        let holder = old_holder(&column.name);
        if let Some(first) = seen.insert(holder.clone(), &column.name) {
            return Err(AuditError::AuditColumnCollision {
                first: first.to_string(),
                second: column.name.clone(),
                holder,
            });
        }
    }
    Ok(())
}
