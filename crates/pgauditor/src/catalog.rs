//! PostgreSQL catalog access over a read-only sqlx connection.

use std::fmt;

use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use tracing::{debug, info};

use pgauditor_core::inspector::SchemaInspector;
use pgauditor_core::model::ColumnDescriptor;

use crate::error::{CatalogError, Result};

/// Value reported to the server as `application_name`.
pub const APPLICATION_NAME: &str = "pgauditor";

const TABLE_EXISTS: &str = "SELECT EXISTS (
    SELECT 1
    FROM pg_catalog.pg_class c
    JOIN pg_catalog.pg_namespace n ON c.relnamespace = n.oid
    WHERE n.nspname = $1 AND c.relname = $2
      AND c.relkind IN ('r', 'p'))";

const COLUMNS: &str = "SELECT a.attname::text, pg_catalog.format_type(a.atttypid, a.atttypmod)
    FROM pg_catalog.pg_attribute a
    JOIN pg_catalog.pg_class c ON a.attrelid = c.oid
    JOIN pg_catalog.pg_namespace n ON c.relnamespace = n.oid
    WHERE n.nspname = $1 AND c.relname = $2
      AND c.relkind IN ('r', 'p')
      AND a.attnum > 0
      AND NOT a.attisdropped
    ORDER BY a.attnum";

const TRIGGER_EXISTS: &str = "SELECT EXISTS (
    SELECT 1
    FROM pg_catalog.pg_trigger t
    JOIN pg_catalog.pg_class c ON t.tgrelid = c.oid
    JOIN pg_catalog.pg_namespace n ON c.relnamespace = n.oid
    WHERE n.nspname = $1 AND c.relname = $2 AND t.tgname = $3
      AND NOT t.tgisinternal)";

const FUNCTION_EXISTS: &str = "SELECT EXISTS (
    SELECT 1
    FROM pg_catalog.pg_proc p
    JOIN pg_catalog.pg_namespace n ON p.pronamespace = n.oid
    WHERE n.nspname = $1 AND p.proname = $2)";

const SEQUENCE_EXISTS: &str = "SELECT EXISTS (
    SELECT 1
    FROM pg_catalog.pg_class c
    JOIN pg_catalog.pg_namespace n ON c.relnamespace = n.oid
    WHERE n.nspname = $1 AND c.relname = $2
      AND c.relkind = 'S')";

const ENUM_TYPE_EXISTS: &str = "SELECT EXISTS (
    SELECT 1
    FROM pg_catalog.pg_type t
    JOIN pg_catalog.pg_namespace n ON t.typnamespace = n.oid
    WHERE n.nspname = $1 AND t.typname = $2
      AND t.typtype = 'e')";

/// Where and as whom to connect.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionSettings {
    /// Server host.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Role to connect as.
    pub username: String,
    /// Password, if the server asks for one.
    pub password: Option<String>,
    /// Database name.
    pub database: String,
}

impl fmt::Debug for ConnectionSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("database", &self.database)
            .finish()
    }
}

impl ConnectionSettings {
    /// Builds driver options for a session that can only read.
    #[must_use]
    pub fn connect_options(&self) -> PgConnectOptions {
        let mut options = PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.username)
            .database(&self.database)
            .application_name(APPLICATION_NAME)
            .options([("default_transaction_read_only", "on")]);
        if let Some(password) = &self.password {
            options = options.password(password);
        }
        options
    }
}

/// [`SchemaInspector`] backed by the PostgreSQL system catalogs.
///
/// Holds a single pooled connection. Every method runs one `SELECT`
/// against `pg_catalog`.
#[derive(Debug, Clone)]
pub struct PgCatalog {
    pool: PgPool,
}

impl PgCatalog {
    /// Wraps an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens a read-only single-connection pool.
    pub async fn connect(settings: &ConnectionSettings) -> Result<Self> {
        info!(
            host = %settings.host,
            port = settings.port,
            database = %settings.database,
            user = %settings.username,
            "Connecting"
        );
        let pool = PgPoolOptions::new()
            .max_connections(1)
            .connect_with(settings.connect_options())
            .await
            .map_err(|source| CatalogError::Connect {
                host: settings.host.clone(),
                port: settings.port,
                database: settings.database.clone(),
                source,
            })?;
        Ok(Self::new(pool))
    }

    /// Closes the underlying connection.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    async fn exists(&self, sql: &str, schema: &str, name: &str) -> Result<bool> {
        let found = sqlx::query_scalar::<_, bool>(sql)
            .bind(schema)
            .bind(name)
            .fetch_one(&self.pool)
            .await?;
        Ok(found)
    }
}

impl SchemaInspector for PgCatalog {
    type Error = CatalogError;

    async fn columns(&self, schema: &str, table: &str) -> Result<Option<Vec<ColumnDescriptor>>> {
        if !self.table_exists(schema, table).await? {
            debug!(schema, table, "Table not found");
            return Ok(None);
        }
        let rows = sqlx::query_as::<_, (String, String)>(COLUMNS)
            .bind(schema)
            .bind(table)
            .fetch_all(&self.pool)
            .await?;
        debug!(schema, table, count = rows.len(), "Read columns");
        Ok(Some(
            rows.into_iter()
                .map(|(name, native_type)| ColumnDescriptor::new(name, native_type))
                .collect(),
        ))
    }

    async fn table_exists(&self, schema: &str, name: &str) -> Result<bool> {
        self.exists(TABLE_EXISTS, schema, name).await
    }

    async fn trigger_exists(&self, schema: &str, table: &str, name: &str) -> Result<bool> {
        let found = sqlx::query_scalar::<_, bool>(TRIGGER_EXISTS)
            .bind(schema)
            .bind(table)
            .bind(name)
            .fetch_one(&self.pool)
            .await?;
        Ok(found)
    }

    async fn function_exists(&self, schema: &str, name: &str) -> Result<bool> {
        self.exists(FUNCTION_EXISTS, schema, name).await
    }

    async fn sequence_exists(&self, schema: &str, name: &str) -> Result<bool> {
        self.exists(SEQUENCE_EXISTS, schema, name).await
    }

    async fn enum_type_exists(&self, schema: &str, name: &str) -> Result<bool> {
        self.exists(ENUM_TYPE_EXISTS, schema, name).await
    }
}
