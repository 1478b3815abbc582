//! Rendering of the individual PostgreSQL statements the synthesizer
//! emits. Trigger function bodies live in [`crate::capture`].

use crate::capture::{
    new_holder, old_holder, APPLICATION_NAME_COLUMN, AUDIT_ID_COLUMN, BODY_TAG, CHANGED_AT_COLUMN,
    CHANGED_BY_COLUMN, OPERATION_COLUMN,
};
use crate::model::{AuditOperation, ColumnDescriptor, TableIdentity};
use crate::naming::GeneratedNames;
use crate::quote::{quote_identifier, quote_literal, quote_qualified};

/// Generates `DROP TRIGGER IF EXISTS` for a trigger on the audited table.
#[must_use]
pub fn drop_trigger(table: &TableIdentity, trigger: &str) -> String {
    format!(
        "DROP TRIGGER IF EXISTS {} ON {};",
        quote_identifier(trigger),
        quote_qualified(table.schema(), table.table())
    )
}

/// Generates `DROP FUNCTION IF EXISTS` for a zero-argument function.
#[must_use]
pub fn drop_function(schema: &str, function: &str) -> String {
    format!(
        "DROP FUNCTION IF EXISTS {}();",
        quote_qualified(schema, function)
    )
}

/// Generates the settings lookup helper.
///
/// `current_setting` raises for unknown parameters; the helper turns that
/// into NULL so a missing parameter reads like an unset one.
#[must_use]
pub fn create_settings_function(schema: &str, function: &str) -> String {
    format!(
        "CREATE FUNCTION {}(setting_name text) RETURNS text AS {BODY_TAG}\n\
         BEGIN\n\
         \x20   RETURN current_setting(setting_name);\n\
         EXCEPTION WHEN OTHERS THEN\n\
         \x20   RETURN NULL;\n\
         END;\n\
         {BODY_TAG} LANGUAGE plpgsql STABLE;",
        quote_qualified(schema, function)
    )
}

/// Generates `CREATE SEQUENCE` for the audit id sequence.
#[must_use]
pub fn create_sequence(schema: &str, sequence: &str) -> String {
    format!("CREATE SEQUENCE {};", quote_qualified(schema, sequence))
}

/// Generates the operation enum type.
#[must_use]
pub fn create_enum_type(schema: &str, enum_type: &str) -> String {
    let labels: Vec<String> = AuditOperation::ALL
        .iter()
        .map(|op| quote_literal(op.label()))
        .collect();
    format!(
        "CREATE TYPE {} AS ENUM ({});",
        quote_qualified(schema, enum_type),
        labels.join(", ")
    )
}

/// Returns the `(name, native type)` pairs the audit table needs after its
/// fixed leading columns: the optional application name, then an
/// old/new pair per source column.
#[must_use]
pub fn audit_data_columns(
    columns: &[ColumnDescriptor],
    capture_application_name: bool,
) -> Vec<(String, String)> {
    let mut out = Vec::with_capacity(columns.len() * 2 + 1);
    if capture_application_name {
        out.push((APPLICATION_NAME_COLUMN.to_string(), "text".to_string()));
    }
    for column in columns {
        out.push((old_holder(&column.name), column.native_type.clone()));
        out.push((new_holder(&column.name), column.native_type.clone()));
    }
    out
}

/// Generates `CREATE TABLE` for the audit table.
#[must_use]
pub fn create_audit_table(
    table: &TableIdentity,
    names: &GeneratedNames,
    columns: &[ColumnDescriptor],
    capture_application_name: bool,
) -> String {
    let schema = table.schema();
    let sequence = quote_qualified(schema, &names.sequence);

    let mut defs = vec![
        format!(
            "{} bigint NOT NULL DEFAULT nextval({}) PRIMARY KEY",
            quote_identifier(AUDIT_ID_COLUMN),
            quote_literal(&sequence)
        ),
        format!(
            "{} {} NOT NULL",
            quote_identifier(OPERATION_COLUMN),
            quote_qualified(schema, &names.enum_type)
        ),
        format!("{} text", quote_identifier(CHANGED_BY_COLUMN)),
        format!(
            "{} timestamp with time zone NOT NULL DEFAULT now()",
            quote_identifier(CHANGED_AT_COLUMN)
        ),
    ];
    for (name, native_type) in audit_data_columns(columns, capture_application_name) {
        defs.push(format!("{} {}", quote_identifier(&name), native_type));
    }

    let body: Vec<String> = defs.iter().map(|d| format!("    {d}")).collect();
    format!(
        "CREATE TABLE {} (\n{}\n);",
        quote_qualified(schema, &names.audit_table),
        body.join(",\n")
    )
}

/// Generates the row-level AFTER trigger for one operation.
#[must_use]
pub fn create_trigger(table: &TableIdentity, names: &GeneratedNames, op: AuditOperation) -> String {
    format!(
        "CREATE TRIGGER {} AFTER {} ON {} FOR EACH ROW EXECUTE FUNCTION {}();",
        quote_identifier(names.trigger(op)),
        op.label(),
        quote_qualified(table.schema(), table.table()),
        quote_qualified(table.schema(), names.function(op))
    )
}
