//! Error types for the PostgreSQL catalog adapter.

/// Errors raised while talking to the PostgreSQL catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// The connection could not be established.
    #[error("Could not connect to {host}:{port}/{database}: {source}")]
    Connect {
        /// Server host.
        host: String,
        /// Server port.
        port: u16,
        /// Database name.
        database: String,
        /// Underlying driver error.
        source: sqlx::Error,
    },

    /// A catalog query failed.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Result type for catalog operations.
pub type Result<T> = std::result::Result<T, CatalogError>;
