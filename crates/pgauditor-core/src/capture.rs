//! Per-operation trigger function bodies.
//!
//! One builder serves INSERT, UPDATE and DELETE. What differs between
//! them is captured by [`Capture`]: which row images are copied into the
//! holder variables and whether a change counter gates the audit insert.

use crate::auth::{AuthenticationStrategy, CHANGED_BY_VARIABLE};
use crate::model::{AuditOperation, ColumnDescriptor, TableIdentity};
use crate::naming::{clip_identifier, GeneratedNames};
use crate::quote::{quote_identifier, quote_literal, quote_qualified};

/// Primary key of the audit table.
pub const AUDIT_ID_COLUMN: &str = "audit_id";
/// Operation enum column.
pub const OPERATION_COLUMN: &str = "operation";
/// Acting user column.
pub const CHANGED_BY_COLUMN: &str = "changed_by";
/// Change timestamp column.
pub const CHANGED_AT_COLUMN: &str = "changed_at";
/// Optional session application name column.
pub const APPLICATION_NAME_COLUMN: &str = "application_name";

/// Counter of changed columns in the UPDATE function.
pub const CHANGE_COUNT_VARIABLE: &str = "audit_change_count";

/// Dollar-quote tag wrapping generated function bodies.
pub const BODY_TAG: &str = "$pgauditor$";

/// Name of the audit column, and trigger variable, holding the pre-change
/// value of `column`. Cut to the identifier limit like PostgreSQL does.
#[must_use]
pub fn old_holder(column: &str) -> String {
    clip_identifier(&format!("old_{column}")).to_string()
}

/// Name of the audit column, and trigger variable, holding the
/// post-change value of `column`. Cut to the identifier limit like
/// PostgreSQL does.
#[must_use]
pub fn new_holder(column: &str) -> String {
    clip_identifier(&format!("new_{column}")).to_string()
}

/// What an operation copies and whether it may skip the audit row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capture {
    /// Copy `OLD` into the `old_` holders.
    pub old_row: bool,
    /// Copy `NEW` into the `new_` holders.
    pub new_row: bool,
    /// Only write an audit row when at least one column changed.
    pub gated: bool,
}

impl Capture {
    /// Returns the capture rules for an operation.
    #[must_use]
    pub const fn for_operation(op: AuditOperation) -> Self {
        match op {
            AuditOperation::Insert => Self {
                old_row: false,
                new_row: true,
                gated: false,
            },
            AuditOperation::Update => Self {
                old_row: true,
                new_row: true,
                gated: true,
            },
            AuditOperation::Delete => Self {
                old_row: true,
                new_row: false,
                gated: false,
            },
        }
    }
}

/// Builds the `CREATE FUNCTION` statement for one operation's trigger.
#[derive(Debug, Clone)]
pub struct ChangeCaptureBuilder<'a> {
    operation: AuditOperation,
    table: &'a TableIdentity,
    columns: &'a [ColumnDescriptor],
    names: &'a GeneratedNames,
    auth: &'a AuthenticationStrategy,
    capture_application_name: bool,
}

impl<'a> ChangeCaptureBuilder<'a> {
    /// Creates a builder.
    pub fn new(
        operation: AuditOperation,
        table: &'a TableIdentity,
        columns: &'a [ColumnDescriptor],
        names: &'a GeneratedNames,
        auth: &'a AuthenticationStrategy,
    ) -> Self {
        Self {
            operation,
            table,
            columns,
            names,
            auth,
            capture_application_name: false,
        }
    }

    /// Writes the session's `application_name` into every audit row.
    #[must_use]
    pub fn capture_application_name(mut self, enabled: bool) -> Self {
        self.capture_application_name = enabled;
        self
    }

    /// Returns the `DECLARE` section entries, one per line.
    #[must_use]
    pub fn declarations(&self) -> Vec<String> {
        let mut lines = vec![format!("{CHANGED_BY_VARIABLE} text;")];
        if Capture::for_operation(self.operation).gated {
            lines.push(format!("{CHANGE_COUNT_VARIABLE} integer := 0;"));
        }
        for column in self.columns {
            for holder in [old_holder(&column.name), new_holder(&column.name)] {
                lines.push(format!(
                    "{} {} := NULL;",
                    quote_identifier(&holder),
                    column.native_type
                ));
            }
        }
        lines
    }

    /// Returns the statements copying row values into the holders,
    /// indented for the function body.
    ///
    /// UPDATE compares the text forms of each column, since types such as
    /// `json`, `xml` or `point` have no equality operator.
    #[must_use]
    pub fn capture_logic(&self) -> String {
        let capture = Capture::for_operation(self.operation);
        let mut out = String::new();

        for column in self.columns {
            let field = quote_identifier(&column.name);
            let old = quote_identifier(&old_holder(&column.name));
            let new = quote_identifier(&new_holder(&column.name));

            if capture.gated {
                out.push_str(&format!(
                    "    IF OLD.{field}::text IS DISTINCT FROM NEW.{field}::text THEN\n"
                ));
                out.push_str(&format!("        {old} := OLD.{field};\n"));
                out.push_str(&format!("        {new} := NEW.{field};\n"));
                out.push_str(&format!(
                    "        {CHANGE_COUNT_VARIABLE} := {CHANGE_COUNT_VARIABLE} + 1;\n"
                ));
                out.push_str("    END IF;\n");
            } else {
                if capture.old_row {
                    out.push_str(&format!("    {old} := OLD.{field};\n"));
                }
                if capture.new_row {
                    out.push_str(&format!("    {new} := NEW.{field};\n"));
                }
            }
        }

        out
    }

    /// Returns the audit table columns written by the trigger, quoted.
    #[must_use]
    pub fn audit_columns(&self) -> Vec<String> {
        let mut columns: Vec<String> = [
            AUDIT_ID_COLUMN,
            OPERATION_COLUMN,
            CHANGED_BY_COLUMN,
            CHANGED_AT_COLUMN,
        ]
        .iter()
        .map(|c| quote_identifier(c))
        .collect();

        if self.capture_application_name {
            columns.push(quote_identifier(APPLICATION_NAME_COLUMN));
        }
        for column in self.columns {
            columns.push(quote_identifier(&old_holder(&column.name)));
            columns.push(quote_identifier(&new_holder(&column.name)));
        }
        columns
    }

    /// Returns the values matching [`Self::audit_columns`] one to one.
    #[must_use]
    pub fn audit_values(&self) -> Vec<String> {
        let schema = self.table.schema();
        let sequence = quote_qualified(schema, &self.names.sequence);
        let mut values = vec![
            format!("nextval({})", quote_literal(&sequence)),
            quote_literal(self.operation.label()),
            CHANGED_BY_VARIABLE.to_string(),
            "now()".to_string(),
        ];

        if self.capture_application_name {
            values.push(format!(
                "{}({})",
                quote_qualified(schema, &self.names.settings_function),
                quote_literal("application_name")
            ));
        }
        for column in self.columns {
            values.push(quote_identifier(&old_holder(&column.name)));
            values.push(quote_identifier(&new_holder(&column.name)));
        }
        values
    }

    /// Builds the complete `CREATE FUNCTION` statement.
    #[must_use]
    pub fn build(&self) -> String {
        let capture = Capture::for_operation(self.operation);
        let function = quote_qualified(self.table.schema(), self.names.function(self.operation));
        let audit_table = quote_qualified(self.table.schema(), &self.names.audit_table);

        let mut sql = format!("CREATE FUNCTION {function}() RETURNS trigger AS {BODY_TAG}\nDECLARE\n");
        for line in self.declarations() {
            sql.push_str("    ");
            sql.push_str(&line);
            sql.push('\n');
        }
        sql.push_str("BEGIN\n");
        sql.push_str(&self.auth.fragment());
        sql.push_str(&self.capture_logic());

        let indent = if capture.gated { "        " } else { "    " };
        let insert = format!(
            "{indent}INSERT INTO {audit_table} ({})\n{indent}VALUES ({});\n",
            self.audit_columns().join(", "),
            self.audit_values().join(", ")
        );
        if capture.gated {
            sql.push_str(&format!("    IF {CHANGE_COUNT_VARIABLE} > 0 THEN\n"));
            sql.push_str(&insert);
            sql.push_str("    END IF;\n");
        } else {
            sql.push_str(&insert);
        }

        sql.push_str("    RETURN NULL;\n");
        sql.push_str(&format!("END;\n{BODY_TAG} LANGUAGE plpgsql;"));
        sql
    }
}
