//! DuckDB warehouse backend implementation

use crate::error::{DbError, DbResult};
use crate::traits::Warehouse;
use async_trait::async_trait;
use duckdb::types::ValueRef;
use duckdb::Connection;
use sf_core::{Table, Value};
use std::path::Path;
use std::sync::Mutex;

/// DuckDB warehouse backend
pub struct DuckDbWarehouse {
    conn: Mutex<Connection>,
}

impl DuckDbWarehouse {
    /// Create a new in-memory DuckDB connection
    pub fn in_memory() -> DbResult<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| DbError::ConnectionError(e.to_string()))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create a new DuckDB connection from a file path
    pub fn from_path(path: &Path) -> DbResult<Self> {
        let conn = Connection::open(path).map_err(|e| DbError::ConnectionError(e.to_string()))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create from path string (handles :memory: special case)
    pub fn new(path: &str) -> DbResult<Self> {
        if path == ":memory:" {
            Self::in_memory()
        } else {
            Self::from_path(Path::new(path))
        }
    }

    /// Execute SQL synchronously
    fn execute_sync(&self, sql: &str) -> DbResult<usize> {
        let conn = self.conn.lock().unwrap();
        conn.execute(sql, [])
            .map_err(|e| DbError::ExecutionError(format!("{}: {}", e, sql)))
    }

    /// Execute batch SQL synchronously
    fn execute_batch_sync(&self, sql: &str) -> DbResult<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute_batch(sql)
            .map_err(|e| DbError::ExecutionError(e.to_string()))
    }

    /// Query count synchronously
    fn query_count_sync(&self, sql: &str) -> DbResult<usize> {
        let conn = self.conn.lock().unwrap();
        let count: i64 = conn
            .query_row(&format!("SELECT COUNT(*) FROM ({})", sql), [], |row| {
                row.get(0)
            })
            .map_err(|e| DbError::ExecutionError(e.to_string()))?;
        Ok(count as usize)
    }

    /// Check if table exists synchronously
    fn table_exists_sync(&self, name: &str) -> DbResult<bool> {
        let conn = self.conn.lock().unwrap();

        // Handle schema-qualified names
        let (schema, table) = if let Some(pos) = name.rfind('.') {
            (&name[..pos], &name[pos + 1..])
        } else {
            ("main", name)
        };

        let sql = format!(
            "SELECT COUNT(*) FROM information_schema.tables WHERE table_schema = '{}' AND table_name = '{}'",
            schema, table
        );

        let count: i64 = conn
            .query_row(&sql, [], |row| row.get(0))
            .map_err(|e| DbError::ExecutionError(e.to_string()))?;

        Ok(count > 0)
    }

    /// List tables whose foreign keys reference the given table
    fn referencing_tables_sync(&self, name: &str) -> DbResult<Vec<String>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare(
                "SELECT DISTINCT table_name FROM duckdb_constraints() \
                 WHERE constraint_type = 'FOREIGN KEY' \
                 AND (constraint_text LIKE ? OR constraint_text LIKE ?)",
            )
            .map_err(|e| DbError::ExecutionError(e.to_string()))?;

        // constraint_text carries the referenced table inline, e.g.
        // FOREIGN KEY (time_sk) REFERENCES dim_time(time_sk)
        let rows = stmt
            .query_map(
                [
                    format!("%REFERENCES {}(%", name),
                    format!("%REFERENCES {} (%", name),
                ],
                |row| row.get::<_, String>(0),
            )
            .map_err(|e| DbError::ExecutionError(e.to_string()))?;

        let mut tables = Vec::new();
        for row in rows {
            tables.push(row.map_err(|e| DbError::ExecutionError(e.to_string()))?);
        }
        Ok(tables)
    }

    /// Read a whole table synchronously
    fn fetch_table_sync(&self, name: &str) -> DbResult<Table> {
        let conn = self.conn.lock().unwrap();
        let sql = format!("SELECT * FROM {}", name);

        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| DbError::ExecutionError(e.to_string()))?;

        let mut columns: Vec<String> = Vec::new();
        let mut data: Vec<Vec<Value>> = Vec::new();
        {
            let mut rows = stmt
                .query([])
                .map_err(|e| DbError::ExecutionError(e.to_string()))?;

            while let Some(row) = rows
                .next()
                .map_err(|e| DbError::ExecutionError(e.to_string()))?
            {
                if columns.is_empty() {
                    let st = row.as_ref();
                    for i in 0..st.column_count() {
                        columns.push(
                            st.column_name(i)
                                .map_err(|e| DbError::ExecutionError(e.to_string()))?
                                .to_string(),
                        );
                    }
                }
                let mut out = Vec::with_capacity(columns.len());
                for i in 0..columns.len() {
                    let cell = row
                        .get_ref(i)
                        .map_err(|e| DbError::ExecutionError(e.to_string()))?;
                    out.push(value_from_ref(cell));
                }
                data.push(out);
            }
        }

        if columns.is_empty() {
            // Table had no rows; fall back to statement metadata
            columns = stmt.column_names().iter().map(|s| s.to_string()).collect();
        }

        let mut table = Table::new(name, columns);
        table.rows = data;
        Ok(table)
    }
}

/// Map a DuckDB cell into the core value model
fn value_from_ref(cell: ValueRef<'_>) -> Value {
    match cell {
        ValueRef::Null => Value::Null,
        ValueRef::Boolean(b) => Value::Bool(b),
        ValueRef::TinyInt(n) => Value::Int(n as i64),
        ValueRef::SmallInt(n) => Value::Int(n as i64),
        ValueRef::Int(n) => Value::Int(n as i64),
        ValueRef::BigInt(n) => Value::Int(n),
        ValueRef::UTinyInt(n) => Value::Int(n as i64),
        ValueRef::USmallInt(n) => Value::Int(n as i64),
        ValueRef::UInt(n) => Value::Int(n as i64),
        ValueRef::UBigInt(n) => Value::Int(n as i64),
        ValueRef::Float(f) => Value::Float(f as f64),
        ValueRef::Double(f) => Value::Float(f),
        ValueRef::Text(bytes) => Value::Text(String::from_utf8_lossy(bytes).into_owned()),
        other => Value::Text(format!("{:?}", other)),
    }
}

#[async_trait]
impl Warehouse for DuckDbWarehouse {
    async fn execute(&self, sql: &str) -> DbResult<usize> {
        self.execute_sync(sql)
    }

    async fn execute_batch(&self, sql: &str) -> DbResult<()> {
        self.execute_batch_sync(sql)
    }

    async fn table_exists(&self, name: &str) -> DbResult<bool> {
        self.table_exists_sync(name)
    }

    async fn query_count(&self, sql: &str) -> DbResult<usize> {
        self.query_count_sync(sql)
    }

    async fn fetch_table(&self, name: &str) -> DbResult<Table> {
        self.fetch_table_sync(name)
    }

    async fn drop_if_exists(&self, name: &str) -> DbResult<()> {
        self.execute_sync(&format!("DROP TABLE IF EXISTS {}", name))?;
        Ok(())
    }

    async fn referencing_tables(&self, name: &str) -> DbResult<Vec<String>> {
        self.referencing_tables_sync(name)
    }

    fn backend_type(&self) -> &'static str {
        "duckdb"
    }
}
