//! Base pipeline lifecycle
//!
//! Stages run in strict sequence with no retry: a failure at any stage
//! propagates upward with stage context and the run terminates. Loads
//! that have already written batches leave partial state behind; the
//! next replace run starts from a fresh target.

use crate::error::{EtlError, EtlResult};
use async_trait::async_trait;
use sf_core::{RunContext, Table};
use sf_db::{Loader, TableSchema, Warehouse, WriteMode};
use std::fmt;

/// Pipeline category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    Raw,
    Dimension,
    Fact,
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Layer::Raw => write!(f, "raw"),
            Layer::Dimension => write!(f, "dimension"),
            Layer::Fact => write!(f, "fact"),
        }
    }
}

/// Lifecycle stage, used for error context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Extract,
    Transform,
    Validate,
    Load,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Extract => write!(f, "extract"),
            Stage::Transform => write!(f, "transform"),
            Stage::Validate => write!(f, "validate"),
            Stage::Load => write!(f, "load"),
        }
    }
}

/// The four-stage ETL lifecycle.
///
/// `extract` and `transform` are mandatory; `validate` defaults to a
/// no-op and `schema` to inference from the transformed data. The load
/// stage itself belongs to the [`Runner`], which writes through the
/// batched loader under the run's write mode.
#[async_trait]
pub trait Pipeline: Send + Sync {
    /// Pipeline name for logging
    fn name(&self) -> &str;

    /// Target table in the warehouse
    fn table_name(&self) -> &str;

    fn layer(&self) -> Layer {
        Layer::Raw
    }

    /// Schema for the persisted target, derived from transformed data
    fn schema(&self, table: &Table) -> TableSchema {
        TableSchema::infer(self.table_name(), table)
    }

    /// Pull raw records from the source
    async fn extract(&self, ctx: &RunContext) -> EtlResult<Table>;

    /// Shape raw records into the target model. Fact pipelines use the
    /// warehouse handle to resolve surrogate keys from dimensions.
    async fn transform(
        &self,
        table: Table,
        ctx: &RunContext,
        db: &dyn Warehouse,
    ) -> EtlResult<Table>;

    /// Domain validation; the base lifecycle assumes no rules
    async fn validate(&self, table: &Table, ctx: &RunContext) -> EtlResult<()> {
        let _ = (table, ctx);
        Ok(())
    }
}

/// Drives a pipeline through its lifecycle against a warehouse
pub struct Runner {
    loader: Loader,
    mode: WriteMode,
}

impl Default for Runner {
    fn default() -> Self {
        Self {
            loader: Loader::default(),
            mode: WriteMode::Replace,
        }
    }
}

impl Runner {
    pub fn new(loader: Loader, mode: WriteMode) -> Self {
        Self { loader, mode }
    }

    /// Execute extract → transform → validate → load in sequence.
    ///
    /// Returns the validated table; a dry run or skip-load stops after
    /// validate without touching the sink.
    pub async fn run(
        &self,
        pipeline: &dyn Pipeline,
        ctx: &RunContext,
        db: &dyn Warehouse,
    ) -> EtlResult<Table> {
        let name = pipeline.name();
        log::info!("Starting pipeline {} [{}]", name, pipeline.layer());

        let mut table = pipeline
            .extract(ctx)
            .await
            .map_err(|e| e.at_stage(name, Stage::Extract))?;
        log::info!("{}: extracted {} rows", name, table.len());

        if let Some(limit) = ctx.limit {
            log::info!("{}: applying limit={} to extracted set", name, limit);
            table.truncate(limit);
        }

        let table = pipeline
            .transform(table, ctx, db)
            .await
            .map_err(|e| e.at_stage(name, Stage::Transform))?;
        log::info!("{}: transformed into {} rows", name, table.len());

        pipeline
            .validate(&table, ctx)
            .await
            .map_err(|e| e.at_stage(name, Stage::Validate))?;

        if !ctx.should_load() {
            log::info!("{}: dry-run/skip-load set, load stage not executed", name);
            return Ok(table);
        }

        let schema = pipeline.schema(&table);
        self.loader
            .load(db, &schema, &table, self.mode)
            .await
            .map_err(|e| EtlError::from(e).at_stage(name, Stage::Load))?;

        log::info!("Pipeline {} finished", name);
        Ok(table)
    }
}

#[cfg(test)]
#[path = "pipeline_test.rs"]
mod tests;
