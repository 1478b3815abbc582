#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

use pgauditor_core::capture::{
    APPLICATION_NAME_COLUMN, AUDIT_ID_COLUMN, CHANGED_AT_COLUMN, CHANGED_BY_COLUMN,
    OPERATION_COLUMN,
};
use pgauditor_core::ddl::audit_data_columns;
use pgauditor_core::inspector::SchemaInspector;
use pgauditor_core::model::{AuditOperation, ColumnDescriptor, TableIdentity};
use pgauditor_core::naming::{clip_identifier, GeneratedNames};
use pgauditor_core::script::DdlScript;

#[derive(Debug, thiserror::Error)]
#[error("injected failure in {0}")]
pub struct InjectedFailure(pub String);

/// In-memory catalog recording every question asked of it.
#[derive(Debug, Default)]
pub struct MemoryCatalog {
    tables: HashMap<(String, String), Vec<ColumnDescriptor>>,
    triggers: HashSet<(String, String, String)>,
    functions: HashSet<(String, String)>,
    sequences: HashSet<(String, String)>,
    enums: HashSet<(String, String)>,
    fail_on: Option<String>,
    calls: RefCell<Vec<String>>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(mut self, schema: &str, table: &str, columns: Vec<ColumnDescriptor>) -> Self {
        self.tables
            .insert((schema.to_string(), table.to_string()), columns);
        self
    }

    pub fn with_trigger(mut self, schema: &str, table: &str, name: &str) -> Self {
        self.triggers
            .insert((schema.to_string(), table.to_string(), name.to_string()));
        self
    }

    pub fn with_function(mut self, schema: &str, name: &str) -> Self {
        self.functions.insert((schema.to_string(), name.to_string()));
        self
    }

    pub fn with_sequence(mut self, schema: &str, name: &str) -> Self {
        self.sequences.insert((schema.to_string(), name.to_string()));
        self
    }

    pub fn with_enum(mut self, schema: &str, name: &str) -> Self {
        self.enums.insert((schema.to_string(), name.to_string()));
        self
    }

    /// Makes the first call whose log entry starts with `prefix` fail.
    pub fn failing(mut self, prefix: &str) -> Self {
        self.fail_on = Some(prefix.to_string());
        self
    }

    /// Returns every call made so far, e.g. `trigger_exists(tai_aud_user)`.
    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    fn record(&self, call: String) -> Result<(), InjectedFailure> {
        let fail = self
            .fail_on
            .as_deref()
            .is_some_and(|prefix| call.starts_with(prefix));
        self.calls.borrow_mut().push(call.clone());
        if fail {
            Err(InjectedFailure(call))
        } else {
            Ok(())
        }
    }

    fn key(schema: &str, name: &str) -> (String, String) {
        (schema.to_string(), name.to_string())
    }
}

impl SchemaInspector for MemoryCatalog {
    type Error = InjectedFailure;

    async fn columns(
        &self,
        schema: &str,
        table: &str,
    ) -> Result<Option<Vec<ColumnDescriptor>>, Self::Error> {
        self.record(format!("columns({table})"))?;
        Ok(self.tables.get(&Self::key(schema, table)).cloned())
    }

    async fn table_exists(&self, schema: &str, name: &str) -> Result<bool, Self::Error> {
        self.record(format!("table_exists({name})"))?;
        Ok(self.tables.contains_key(&Self::key(schema, name)))
    }

    async fn trigger_exists(
        &self,
        schema: &str,
        table: &str,
        name: &str,
    ) -> Result<bool, Self::Error> {
        self.record(format!("trigger_exists({name})"))?;
        Ok(self
            .triggers
            .contains(&(schema.to_string(), table.to_string(), name.to_string())))
    }

    async fn function_exists(&self, schema: &str, name: &str) -> Result<bool, Self::Error> {
        self.record(format!("function_exists({name})"))?;
        Ok(self.functions.contains(&Self::key(schema, name)))
    }

    async fn sequence_exists(&self, schema: &str, name: &str) -> Result<bool, Self::Error> {
        self.record(format!("sequence_exists({name})"))?;
        Ok(self.sequences.contains(&Self::key(schema, name)))
    }

    async fn enum_type_exists(&self, schema: &str, name: &str) -> Result<bool, Self::Error> {
        self.record(format!("enum_type_exists({name})"))?;
        Ok(self.enums.contains(&Self::key(schema, name)))
    }
}

pub fn user_columns() -> Vec<ColumnDescriptor> {
    vec![
        ColumnDescriptor::new("id", "bigint"),
        ColumnDescriptor::new("username", "text"),
    ]
}

/// Returns the audit table columns a previous run would have created.
pub fn audit_table_columns(
    columns: &[ColumnDescriptor],
    capture_application_name: bool,
    names: &GeneratedNames,
) -> Vec<ColumnDescriptor> {
    let mut out = vec![
        ColumnDescriptor::new(AUDIT_ID_COLUMN, "bigint"),
        ColumnDescriptor::new(OPERATION_COLUMN, names.enum_type.clone()),
        ColumnDescriptor::new(CHANGED_BY_COLUMN, "text"),
        ColumnDescriptor::new(CHANGED_AT_COLUMN, "timestamp with time zone"),
    ];
    out.extend(
        audit_data_columns(columns, capture_application_name)
            .into_iter()
            .map(|(name, ty)| ColumnDescriptor::new(name, ty)),
    );
    out
}

/// Returns a catalog in which a previous run's script has been applied to
/// `schema.table`.
pub fn fully_migrated(
    schema: &str,
    table: &str,
    columns: Vec<ColumnDescriptor>,
    capture_application_name: bool,
) -> MemoryCatalog {
    let names = GeneratedNames::for_table(&TableIdentity::new(schema, table).unwrap());
    let audit = audit_table_columns(&columns, capture_application_name, &names);

    let mut catalog = MemoryCatalog::new()
        .with_table(schema, table, columns)
        .with_table(schema, clip_identifier(&names.audit_table), audit)
        .with_function(schema, &names.settings_function)
        .with_sequence(schema, &names.sequence)
        .with_enum(schema, &names.enum_type);
    for op in AuditOperation::ALL {
        catalog = catalog
            .with_trigger(schema, table, names.trigger(op))
            .with_function(schema, names.function(op));
    }
    catalog
}

/// Returns the statement starting with `prefix`, panicking when absent.
pub fn statement<'a>(script: &'a DdlScript, prefix: &str) -> &'a str {
    script
        .statements()
        .iter()
        .find(|s| s.starts_with(prefix))
        .unwrap_or_else(|| panic!("no statement starting with {prefix}"))
}

/// Number of column definitions in a `CREATE TABLE` statement.
pub fn defined_columns(create_table: &str) -> usize {
    create_table
        .lines()
        .filter(|line| line.starts_with("    "))
        .count()
}

pub fn is_application_name_column(line: &str) -> bool {
    line.trim_start().starts_with(&format!("\"{APPLICATION_NAME_COLUMN}\""))
}
