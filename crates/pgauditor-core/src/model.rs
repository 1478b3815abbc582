//! Inputs to synthesis: the audited table, its columns, and the options
//! chosen by the operator.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{AuditError, Result};

/// Schema assumed when the table identifier carries no schema prefix.
pub const DEFAULT_SCHEMA: &str = "public";

/// Configuration parameter read under [`AuthenticationMode::Application`]
/// unless another one is configured.
pub const DEFAULT_CONFIG_PROPERTY: &str = "pgauditor.current_user";

/// The table being audited.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TableIdentity {
    schema: String,
    table: String,
}

impl TableIdentity {
    /// Creates an identity from an already split schema and table name.
    pub fn new(schema: impl Into<String>, table: impl Into<String>) -> Result<Self> {
        let schema = schema.into();
        let table = table.into();
        if schema.is_empty() || table.is_empty() {
            return Err(AuditError::InvalidTableName(format!("{schema}.{table}")));
        }
        Ok(Self { schema, table })
    }

    /// Parses `table` or `schema.table`.
    ///
    /// The input is split on its last `.`; without one the schema is
    /// [`DEFAULT_SCHEMA`].
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        match trimmed.rsplit_once('.') {
            Some((schema, table)) if !schema.is_empty() && !table.is_empty() => {
                Self::new(schema, table)
            }
            Some(_) => Err(AuditError::InvalidTableName(raw.to_string())),
            None if trimmed.is_empty() => Err(AuditError::InvalidTableName(raw.to_string())),
            None => Self::new(DEFAULT_SCHEMA, trimmed),
        }
    }

    /// Returns the schema name.
    #[must_use]
    pub fn schema(&self) -> &str {
        &self.schema
    }

    /// Returns the unqualified table name.
    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }
}

impl fmt::Display for TableIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.schema, self.table)
    }
}

impl FromStr for TableIdentity {
    type Err = AuditError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// One column of the audited table, in ordinal position order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    /// Column name as stored in the catalog.
    pub name: String,
    /// Type name as PostgreSQL formats it, e.g. `character varying(255)`.
    pub native_type: String,
}

impl ColumnDescriptor {
    /// Creates a column descriptor.
    pub fn new(name: impl Into<String>, native_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            native_type: native_type.into(),
        }
    }
}

/// How a trigger resolves who changed a row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthenticationMode {
    /// A configuration parameter set by the client application.
    Application,
    /// The database session user.
    #[default]
    Database,
    /// Nobody; `changed_by` stays NULL.
    Anonymous,
}

impl AuthenticationMode {
    /// Returns the lowercase name accepted on the command line.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Application => "application",
            Self::Database => "database",
            Self::Anonymous => "anonymous",
        }
    }
}

impl fmt::Display for AuthenticationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuthenticationMode {
    type Err = AuditError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "application" => Ok(Self::Application),
            "database" => Ok(Self::Database),
            "anonymous" => Ok(Self::Anonymous),
            _ => Err(AuditError::UnsupportedAuthenticationMode(s.to_string())),
        }
    }
}

/// Row-level operation captured by a trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuditOperation {
    /// Row inserted.
    Insert,
    /// Row updated.
    Update,
    /// Row deleted.
    Delete,
}

impl AuditOperation {
    /// All operations, in the order their objects are emitted.
    pub const ALL: [Self; 3] = [Self::Insert, Self::Update, Self::Delete];

    /// Enum label stored in the audit table, also the trigger event keyword.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Insert => "INSERT",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
        }
    }

    /// Single-letter code used in generated object prefixes.
    #[must_use]
    pub const fn code(self) -> char {
        match self {
            Self::Insert => 'i',
            Self::Update => 'u',
            Self::Delete => 'd',
        }
    }
}

impl fmt::Display for AuditOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Operator choices that shape the generated script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynthesisOptions {
    /// Adds an `application_name` column filled from the session.
    pub capture_application_name: bool,
    /// Only drop triggers and trigger functions.
    pub drop_mode: bool,
    /// Configuration parameter holding the application user. Only read
    /// under [`AuthenticationMode::Application`].
    pub config_property: String,
}

impl Default for SynthesisOptions {
    fn default() -> Self {
        Self {
            capture_application_name: false,
            drop_mode: false,
            config_property: DEFAULT_CONFIG_PROPERTY.to_string(),
        }
    }
}

impl SynthesisOptions {
    /// Creates options with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables or disables capture of the session's application name.
    #[must_use]
    pub fn capture_application_name(mut self, enabled: bool) -> Self {
        self.capture_application_name = enabled;
        self
    }

    /// Enables or disables drop mode.
    #[must_use]
    pub fn drop_mode(mut self, enabled: bool) -> Self {
        self.drop_mode = enabled;
        self
    }

    /// Sets the configuration parameter read under application mode.
    #[must_use]
    pub fn config_property(mut self, name: impl Into<String>) -> Self {
        self.config_property = name.into();
        self
    }
}
