//! Read-only access to the catalog.
//!
//! Driver crates implement [`SchemaInspector`]; the core only consumes it,
//! so it stays independent of any database driver.

use crate::model::ColumnDescriptor;

/// Answers the catalog questions synthesis needs.
///
/// Every call is a single read-only round trip. Callers await them one at
/// a time.
#[allow(async_fn_in_trait)]
pub trait SchemaInspector {
    /// Error type for failed round trips.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Returns the columns of `schema.table` in ordinal position order, or
    /// `None` when the table does not exist.
    async fn columns(
        &self,
        schema: &str,
        table: &str,
    ) -> Result<Option<Vec<ColumnDescriptor>>, Self::Error>;

    /// Returns whether an ordinary table `schema.name` exists.
    async fn table_exists(&self, schema: &str, name: &str) -> Result<bool, Self::Error>;

    /// Returns whether trigger `name` exists on `schema.table`.
    async fn trigger_exists(
        &self,
        schema: &str,
        table: &str,
        name: &str,
    ) -> Result<bool, Self::Error>;

    /// Returns whether a function `schema.name` exists.
    async fn function_exists(&self, schema: &str, name: &str) -> Result<bool, Self::Error>;

    /// Returns whether a sequence `schema.name` exists.
    async fn sequence_exists(&self, schema: &str, name: &str) -> Result<bool, Self::Error>;

    /// Returns whether an enum type `schema.name` exists.
    async fn enum_type_exists(&self, schema: &str, name: &str) -> Result<bool, Self::Error>;
}
