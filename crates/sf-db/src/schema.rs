//! Target table schema description and DDL rendering

use sf_core::{Table, Value};

/// SQL column type used in generated DDL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Integer,
    Double,
    Varchar,
    Boolean,
    Timestamp,
}

impl ColumnType {
    pub fn sql(&self) -> &'static str {
        match self {
            ColumnType::Integer => "BIGINT",
            ColumnType::Double => "DOUBLE",
            ColumnType::Varchar => "VARCHAR",
            ColumnType::Boolean => "BOOLEAN",
            ColumnType::Timestamp => "TIMESTAMP",
        }
    }
}

/// A column in the target table
#[derive(Debug, Clone)]
pub struct ColumnDef {
    pub name: String,
    pub column_type: ColumnType,
}

/// A foreign-key reference to a dimension table
#[derive(Debug, Clone)]
pub struct ForeignKeyDef {
    /// Column in this table holding the surrogate key
    pub column: String,
    /// Referenced dimension table
    pub references_table: String,
    /// Referenced SK column
    pub references_column: String,
}

/// Schema for a persisted warehouse object
#[derive(Debug, Clone)]
pub struct TableSchema {
    pub name: String,
    pub columns: Vec<ColumnDef>,
    /// Primary-key column, if any
    pub primary_key: Option<String>,
    /// Declared only when the referenced dimension exists at load time
    pub foreign_keys: Vec<ForeignKeyDef>,
}

impl TableSchema {
    /// Infer a schema from in-memory data.
    ///
    /// A column is integral only if every non-null value is an Int;
    /// any Float makes it Double; mixed or textual data falls back to
    /// VARCHAR.
    pub fn infer(name: &str, table: &Table) -> Self {
        let columns = table
            .columns
            .iter()
            .enumerate()
            .map(|(idx, col)| ColumnDef {
                name: col.clone(),
                column_type: infer_column_type(table, idx),
            })
            .collect();

        Self {
            name: name.to_string(),
            columns,
            primary_key: None,
            foreign_keys: Vec::new(),
        }
    }

    pub fn with_primary_key(mut self, column: impl Into<String>) -> Self {
        self.primary_key = Some(column.into());
        self
    }

    pub fn with_foreign_key(
        mut self,
        column: impl Into<String>,
        references_table: impl Into<String>,
        references_column: impl Into<String>,
    ) -> Self {
        self.foreign_keys.push(ForeignKeyDef {
            column: column.into(),
            references_table: references_table.into(),
            references_column: references_column.into(),
        });
        self
    }

    /// Render the CREATE TABLE statement, keeping only the given
    /// subset of foreign keys (those whose dimension is present).
    pub fn create_ddl(&self, live_foreign_keys: &[ForeignKeyDef]) -> String {
        let mut parts: Vec<String> = self
            .columns
            .iter()
            .map(|c| {
                if self.primary_key.as_deref() == Some(c.name.as_str()) {
                    format!("{} {} PRIMARY KEY", c.name, c.column_type.sql())
                } else {
                    format!("{} {}", c.name, c.column_type.sql())
                }
            })
            .collect();

        for fk in live_foreign_keys {
            parts.push(format!(
                "CONSTRAINT fk_{}_{} FOREIGN KEY ({}) REFERENCES {}({})",
                self.name, fk.references_table, fk.column, fk.references_table, fk.references_column
            ));
        }

        format!("CREATE TABLE {} (\n    {}\n)", self.name, parts.join(",\n    "))
    }
}

fn infer_column_type(table: &Table, idx: usize) -> ColumnType {
    let mut saw_int = false;
    let mut saw_float = false;
    let mut saw_bool = false;

    for row in &table.rows {
        match &row[idx] {
            Value::Null => {}
            Value::Int(_) => saw_int = true,
            Value::Float(_) => saw_float = true,
            Value::Bool(_) => saw_bool = true,
            Value::Text(_) => return ColumnType::Varchar,
        }
    }

    match (saw_int, saw_float, saw_bool) {
        (_, true, false) => ColumnType::Double,
        (true, false, false) => ColumnType::Integer,
        (false, false, true) => ColumnType::Boolean,
        _ => ColumnType::Varchar,
    }
}

/// Render a value as a SQL literal
pub(crate) fn sql_literal(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
        Value::Int(n) => n.to_string(),
        Value::Float(f) => {
            if f.is_finite() {
                f.to_string()
            } else {
                "NULL".to_string()
            }
        }
        Value::Text(s) => format!("'{}'", s.replace('\'', "''")),
    }
}
