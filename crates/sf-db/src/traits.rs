//! Warehouse trait definition

use crate::error::DbResult;
use async_trait::async_trait;
use sf_core::Table;

/// Relational sink abstraction for Starforge
///
/// Implementations must be Send + Sync for async operation.
#[async_trait]
pub trait Warehouse: Send + Sync {
    /// Execute SQL that modifies data, returns affected rows
    async fn execute(&self, sql: &str) -> DbResult<usize>;

    /// Execute multiple SQL statements
    async fn execute_batch(&self, sql: &str) -> DbResult<()>;

    /// Check if a table or view exists
    async fn table_exists(&self, name: &str) -> DbResult<bool>;

    /// Execute query returning row count
    async fn query_count(&self, sql: &str) -> DbResult<usize>;

    /// Read a whole table into memory
    async fn fetch_table(&self, name: &str) -> DbResult<Table>;

    /// Drop a table if it exists
    async fn drop_if_exists(&self, name: &str) -> DbResult<()>;

    /// Tables holding a foreign key that references the given table
    async fn referencing_tables(&self, name: &str) -> DbResult<Vec<String>>;

    /// Backend identifier for logging
    fn backend_type(&self) -> &'static str;
}
