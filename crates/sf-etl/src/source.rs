//! File-backed extract sources
//!
//! Extracts yield an untyped `Table`; concrete pipelines own the typing
//! of their columns at the transform boundary. The CSV reader only
//! sniffs obvious scalars so downstream code is not stuck comparing
//! everything as text.

use crate::error::EtlResult;
use async_trait::async_trait;
use sf_core::{RunContext, Table, Value};
use std::path::{Path, PathBuf};

/// Anything that can be read into an in-memory table
#[async_trait]
pub trait Source: Send + Sync {
    async fn read(&self, ctx: &RunContext) -> EtlResult<Table>;
}

/// Header-driven CSV source
pub struct CsvSource {
    path: PathBuf,
    table_name: String,
}

impl CsvSource {
    pub fn new(path: impl Into<PathBuf>, table_name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            table_name: table_name.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Sniff a CSV field: integer, then float, then text; empty is null
fn sniff_value(field: &str) -> Value {
    let trimmed = field.trim();
    if trimmed.is_empty() {
        return Value::Null;
    }
    if let Ok(n) = trimmed.parse::<i64>() {
        return Value::Int(n);
    }
    if let Ok(f) = trimmed.parse::<f64>() {
        return Value::Float(f);
    }
    Value::Text(trimmed.to_string())
}

#[async_trait]
impl Source for CsvSource {
    async fn read(&self, ctx: &RunContext) -> EtlResult<Table> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(false)
            .from_path(&self.path)?;

        let columns: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let mut table = Table::new(self.table_name.clone(), columns);
        for record in reader.records() {
            let record = record?;
            let row: Vec<Value> = record.iter().map(sniff_value).collect();
            table.push_row(row)?;
            if let Some(limit) = ctx.limit {
                // Stop reading early instead of slicing afterwards
                if table.len() >= limit {
                    break;
                }
            }
        }

        log::info!(
            "Read {} rows from {}",
            table.len(),
            self.path.display()
        );
        Ok(table)
    }
}
