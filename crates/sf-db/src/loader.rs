//! Batched loading with create/replace/append semantics
//!
//! Rows are written as bounded multi-row INSERT statements to stay
//! under sink-side statement limits. A failed batch aborts the
//! remaining batches; the partially-written target is acceptable
//! because a replace run always starts from a fresh table.

use crate::error::{DbError, DbResult};
use crate::schema::{sql_literal, ForeignKeyDef, TableSchema};
use crate::traits::Warehouse;
use sf_core::Table;

/// What to do when the target table already exists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteMode {
    /// Error out if the target exists
    Fail,
    /// Drop and recreate the target (idempotent across runs)
    #[default]
    Replace,
    /// Keep the target and append rows
    Append,
}

impl std::fmt::Display for WriteMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WriteMode::Fail => write!(f, "fail"),
            WriteMode::Replace => write!(f, "replace"),
            WriteMode::Append => write!(f, "append"),
        }
    }
}

/// Batched persistence adapter
#[derive(Debug, Clone)]
pub struct Loader {
    batch_size: usize,
}

impl Default for Loader {
    fn default() -> Self {
        Self { batch_size: 500 }
    }
}

impl Loader {
    pub fn new(batch_size: usize) -> Self {
        Self {
            batch_size: batch_size.max(1),
        }
    }

    /// Load a table into the sink under the given write mode.
    ///
    /// Foreign keys on the schema are declared only when their
    /// referenced dimension table exists; a missing dimension degrades
    /// to an unconstrained column rather than failing the load.
    pub async fn load(
        &self,
        db: &dyn Warehouse,
        schema: &TableSchema,
        table: &Table,
        mode: WriteMode,
    ) -> DbResult<usize> {
        let target = &schema.name;
        let exists = db.table_exists(target).await?;

        match mode {
            WriteMode::Fail if exists => return Err(DbError::TableExists(target.clone())),
            WriteMode::Replace => {
                if exists {
                    // A fact table holding a foreign key on the target
                    // blocks the drop; remove it first. It is rebuilt
                    // later in registration order.
                    for dependent in db.referencing_tables(target).await? {
                        log::warn!(
                            "Dropping {} before replacing {}; it holds a foreign key on it",
                            dependent,
                            target
                        );
                        db.drop_if_exists(&dependent).await?;
                    }
                    db.drop_if_exists(target).await?;
                }
                let live_fks = self.live_foreign_keys(db, schema).await?;
                db.execute_batch(&schema.create_ddl(&live_fks)).await?;
            }
            WriteMode::Fail | WriteMode::Append => {
                if !exists {
                    let live_fks = self.live_foreign_keys(db, schema).await?;
                    db.execute_batch(&schema.create_ddl(&live_fks)).await?;
                }
            }
        }

        if table.is_empty() {
            log::warn!("No rows to load into {}", target);
            return Ok(0);
        }

        let column_list = table.columns.join(", ");
        let mut written = 0usize;

        for (batch_index, batch) in table.rows.chunks(self.batch_size).enumerate() {
            let values: Vec<String> = batch
                .iter()
                .map(|row| {
                    let literals: Vec<String> = row.iter().map(sql_literal).collect();
                    format!("({})", literals.join(", "))
                })
                .collect();

            let sql = format!(
                "INSERT INTO {} ({}) VALUES {}",
                target,
                column_list,
                values.join(", ")
            );

            db.execute(&sql).await.map_err(|e| DbError::BatchFailed {
                table: target.clone(),
                batch_index,
                message: e.to_string(),
            })?;
            written += batch.len();
        }

        log::info!(
            "Loaded {} rows into {} ({} mode, batches of {})",
            written,
            target,
            mode,
            self.batch_size
        );
        Ok(written)
    }

    /// Keep only foreign keys whose referenced dimension is present
    async fn live_foreign_keys(
        &self,
        db: &dyn Warehouse,
        schema: &TableSchema,
    ) -> DbResult<Vec<ForeignKeyDef>> {
        let mut live = Vec::new();
        for fk in &schema.foreign_keys {
            if db.table_exists(&fk.references_table).await? {
                live.push(fk.clone());
            } else {
                log::warn!(
                    "Dimension table {} not found; creating {} without that constraint",
                    fk.references_table,
                    schema.name
                );
            }
        }
        Ok(live)
    }
}
