//! Error types for audit DDL synthesis.

/// Errors that can occur while synthesizing audit DDL.
#[derive(Debug, thiserror::Error)]
pub enum AuditError {
    /// The user-supplied table identifier could not be split into a
    /// schema and a table name.
    #[error("Invalid table name '{0}': expected 'table' or 'schema.table'")]
    InvalidTableName(String),

    /// The table to audit does not exist.
    #[error("Table {schema}.{table} does not exist")]
    SchemaResolution {
        /// Schema that was searched.
        schema: String,
        /// Table that was not found.
        table: String,
    },

    /// A catalog round trip failed.
    #[error("Catalog query failed: {0}")]
    CatalogQuery(#[source] Box<dyn std::error::Error + Send + Sync + 'static>),

    /// The authentication mode is not one of `application`, `database`
    /// or `anonymous`.
    #[error("Unsupported authentication mode '{0}': expected application, database or anonymous")]
    UnsupportedAuthenticationMode(String),

    /// The audit table exists but no longer matches the audited table.
    #[error(
        "Audit table {table} has drifted from its source table and cannot be reconciled automatically:\n{}",
        .problems.iter().map(|p| format!("  - {}", p)).collect::<Vec<_>>().join("\n")
    )]
    AuditTableDrift {
        /// Qualified audit table name.
        table: String,
        /// One entry per missing or mistyped column.
        problems: Vec<String>,
    },

    /// Two source columns share an audit column name once cut to 63 bytes.
    #[error("Columns '{first}' and '{second}' would both be audited as '{holder}'")]
    AuditColumnCollision {
        /// Column seen first, in ordinal order.
        first: String,
        /// Column that collides with it.
        second: String,
        /// Audit column name both map to, without its `old_`/`new_` twin.
        holder: String,
    },
}

impl AuditError {
    /// Wraps an inspector failure, keeping it as the error source.
    pub fn catalog<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::CatalogQuery(Box::new(err))
    }
}

/// Result type for synthesis operations.
pub type Result<T> = std::result::Result<T, AuditError>;
