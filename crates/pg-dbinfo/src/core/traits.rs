//! The catalog reader abstraction.
//!
//! A [`CatalogReader`] issues read-only metadata queries and yields normalized
//! rows. The assembler drives it one table at a time, so implementations must be
//! safe to call concurrently for different tables.

use async_trait::async_trait;

use crate::error::Result;

use super::rows::{ColumnRow, ForeignKeyRow, IndexRow, TableRow};

/// Read catalog metadata from a database.
#[async_trait]
pub trait CatalogReader: Send + Sync {
    /// Name of the connected database.
    async fn database_name(&self) -> Result<String>;

    /// List user tables, ordered by schema then name.
    ///
    /// An empty `schemas` slice means every non-system schema.
    async fn list_tables(&self, schemas: &[String]) -> Result<Vec<TableRow>>;

    /// Columns of a table, ordered by ordinal position.
    async fn load_columns(&self, schema: &str, table: &str) -> Result<Vec<ColumnRow>>;

    /// Non-primary indexes of a table.
    async fn load_indexes(&self, schema: &str, table: &str) -> Result<Vec<IndexRow>>;

    /// Foreign key constraints declared on a table.
    async fn load_foreign_keys(&self, schema: &str, table: &str) -> Result<Vec<ForeignKeyRow>>;

    /// Get the database type.
    fn db_type(&self) -> &str;

    /// Close all connections.
    async fn close(&self);
}
