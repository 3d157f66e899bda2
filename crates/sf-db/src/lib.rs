//! sf-db - Warehouse sink abstraction for Starforge
//!
//! Provides the `Warehouse` trait, the DuckDB backend, and the batched
//! loader with create/replace/append semantics.

pub mod duckdb;
pub mod error;
pub mod loader;
pub mod schema;
pub mod traits;

pub use duckdb::DuckDbWarehouse;
pub use error::{DbError, DbResult};
pub use loader::{Loader, WriteMode};
pub use schema::{ColumnDef, ColumnType, ForeignKeyDef, TableSchema};
pub use traits::Warehouse;
