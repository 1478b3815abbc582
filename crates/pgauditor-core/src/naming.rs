//! Names of every object the generated script creates or drops.
//!
//! Triggers and trigger functions use four-byte prefixes (`tai_`, `fau_`,
//! ...) and are cut down to [`MAX_IDENTIFIER_BYTES`] so PostgreSQL never
//! truncates them on its own. The audit table name gets no such guard;
//! lookups use [`clip_identifier`] to find the name PostgreSQL stored.

use serde::Serialize;

use crate::model::{AuditOperation, TableIdentity};

/// PostgreSQL's `NAMEDATALEN - 1`.
pub const MAX_IDENTIFIER_BYTES: usize = 63;

/// Prefix of every audit table.
pub const AUDIT_TABLE_PREFIX: &str = "aud_";

/// Sequence feeding `audit_id` for every audit table in a schema, so ids
/// order changes across tables.
pub const SEQUENCE_NAME: &str = "pgauditor_audit_seq";

/// Enum type of the `operation` column.
pub const ENUM_TYPE_NAME: &str = "pgauditor_operation";

/// Helper that reads a configuration parameter and yields NULL on error.
pub const SETTINGS_FUNCTION_NAME: &str = "pgauditor_setting";

/// Every generated object name for one audited table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedNames {
    /// Audit table, `aud_<table>`.
    pub audit_table: String,
    /// Audit id sequence.
    pub sequence: String,
    /// Operation enum type.
    pub enum_type: String,
    /// Settings lookup helper.
    pub settings_function: String,
    /// Trigger fired after INSERT.
    pub insert_trigger: String,
    /// Trigger fired after UPDATE.
    pub update_trigger: String,
    /// Trigger fired after DELETE.
    pub delete_trigger: String,
    /// Function behind the INSERT trigger.
    pub insert_function: String,
    /// Function behind the UPDATE trigger.
    pub update_function: String,
    /// Function behind the DELETE trigger.
    pub delete_function: String,
}

impl GeneratedNames {
    /// Derives all names from the audited table.
    #[must_use]
    pub fn for_table(table: &TableIdentity) -> Self {
        let audit_table = format!("{AUDIT_TABLE_PREFIX}{}", table.table());
        let trigger = |op| fit_identifier(&trigger_prefix(op), &audit_table);
        let function = |op| fit_identifier(&function_prefix(op), table.table());

        Self {
            sequence: SEQUENCE_NAME.to_string(),
            enum_type: ENUM_TYPE_NAME.to_string(),
            settings_function: SETTINGS_FUNCTION_NAME.to_string(),
            insert_trigger: trigger(AuditOperation::Insert),
            update_trigger: trigger(AuditOperation::Update),
            delete_trigger: trigger(AuditOperation::Delete),
            insert_function: function(AuditOperation::Insert),
            update_function: function(AuditOperation::Update),
            delete_function: function(AuditOperation::Delete),
            audit_table,
        }
    }

    /// Returns the trigger name for an operation.
    #[must_use]
    pub fn trigger(&self, op: AuditOperation) -> &str {
        match op {
            AuditOperation::Insert => &self.insert_trigger,
            AuditOperation::Update => &self.update_trigger,
            AuditOperation::Delete => &self.delete_trigger,
        }
    }

    /// Returns the trigger function name for an operation.
    #[must_use]
    pub fn function(&self, op: AuditOperation) -> &str {
        match op {
            AuditOperation::Insert => &self.insert_function,
            AuditOperation::Update => &self.update_function,
            AuditOperation::Delete => &self.delete_function,
        }
    }
}

fn trigger_prefix(op: AuditOperation) -> String {
    format!("ta{}_", op.code())
}

fn function_prefix(op: AuditOperation) -> String {
    format!("fa{}_", op.code())
}

/// Returns the name PostgreSQL stores for `name`: at most
/// [`MAX_IDENTIFIER_BYTES`] bytes, cut at a character boundary.
#[must_use]
pub fn clip_identifier(name: &str) -> &str {
    let mut end = name.len().min(MAX_IDENTIFIER_BYTES);
    while !name.is_char_boundary(end) {
        end -= 1;
    }
    &name[..end]
}

/// Joins `prefix` and `base`, dropping trailing characters of `base`
/// until the result fits in [`MAX_IDENTIFIER_BYTES`].
fn fit_identifier(prefix: &str, base: &str) -> String {
    clip_identifier(&format!("{prefix}{base}")).to_string()
}
