//! Dimension pipeline: surrogate-key assignment and rule validation

use crate::error::EtlResult;
use crate::pipeline::{Layer, Pipeline};
use async_trait::async_trait;
use chrono::Utc;
use sf_core::{
    CoreError, DimensionValidator, NamingRegistry, RunContext, Table, Value, ValidationRule,
    ValidationSummary,
};
use sf_db::{TableSchema, Warehouse};
use std::collections::HashSet;
use std::sync::Arc;

/// Dimension-specific extract and business transform.
///
/// Implementors produce a cleaned attribute table; the framework
/// handles deduplication, surrogate keys, the unknown row, and
/// validation.
#[async_trait]
pub trait DimensionSource: Send + Sync {
    /// Logical dimension name (registry key)
    fn dimension(&self) -> &str;

    /// Column holding the natural identifier used for deduplication
    fn business_key(&self) -> &str;

    /// Dimension-specific validation rules beyond the standard set
    fn extra_rules(&self) -> Vec<ValidationRule> {
        Vec::new()
    }

    async fn extract(&self, ctx: &RunContext) -> EtlResult<Table>;

    /// Map raw columns into the dimension's attribute set
    async fn transform(&self, table: Table, ctx: &RunContext) -> EtlResult<Table>;
}

/// Build the final dimension table from a cleaned attribute table:
/// deduplicate on the business key (first occurrence wins, blank keys
/// dropped), assign surrogate keys 1..n in input order, prepend the
/// SK=0 unknown row, and stamp created_at/updated_at.
pub fn build_dimension(
    table: Table,
    dimension: &str,
    business_key: &str,
    registry: &NamingRegistry,
) -> EtlResult<Table> {
    let key_idx = table
        .column_index(business_key)
        .ok_or_else(|| CoreError::MissingColumn {
            table: table.name.clone(),
            column: business_key.to_string(),
        })?;

    let sk_column = registry.sk_column(dimension);
    let mut columns = vec![sk_column];
    columns.extend(table.columns.iter().cloned());

    let mut out = Table::new(registry.dimension_table(dimension), columns);

    // Single timestamp per build so every row in a run agrees
    let now = Value::Text(Utc::now().format("%Y-%m-%d %H:%M:%S").to_string());

    let unknown = registry.unknown_row(dimension, &out.columns);
    out.push_row(unknown)?;

    let mut seen = HashSet::new();
    let mut next_sk: i64 = 1;
    let before = table.len();

    for row in table.rows {
        let key = row[key_idx].to_key_string().to_uppercase();
        if key.is_empty() || !seen.insert(key) {
            continue;
        }
        let mut full = Vec::with_capacity(out.columns.len());
        full.push(Value::Int(next_sk));
        full.extend(row);
        out.push_row(full)?;
        next_sk += 1;
    }

    if out.len() < before + 1 {
        log::info!(
            "{}: deduplicated {} source rows into {} entries",
            out.name,
            before,
            out.len() - 1
        );
    }

    out.add_column("created_at", now.clone());
    out.add_column("updated_at", now);
    Ok(out)
}

/// Validate a built dimension, aborting on ERROR-severity failures.
///
/// WARNING-only outcomes are logged and the run continues.
pub fn enforce_dimension_rules(
    table: &Table,
    dimension: &str,
    registry: &NamingRegistry,
    extra_rules: Vec<ValidationRule>,
) -> EtlResult<()> {
    let mut validator = DimensionValidator::new(dimension, registry);
    for rule in extra_rules {
        validator.add_rule(rule);
    }

    let results = validator.validate(table);
    let summary = ValidationSummary::from_results(&results);

    if summary.has_errors() {
        for result in results.iter().filter(|r| !r.passed) {
            log::error!(
                "{}: rule {} failed ({}/{} rows): {}",
                dimension,
                result.rule_name,
                result.failed_count,
                result.total_count,
                result.message
            );
        }
        return Err(CoreError::ValidationFailed {
            dimension: dimension.to_string(),
            error_count: summary.error_count,
            total_rules: summary.total_rules,
            results,
        }
        .into());
    }

    if summary.warning_count > 0 {
        log::warn!(
            "{}: validation finished with {} warning(s)",
            dimension,
            summary.warning_count
        );
    }
    Ok(())
}

/// Dimension specialization of the base pipeline
pub struct DimensionPipeline<S> {
    source: S,
    registry: Arc<NamingRegistry>,
    name: String,
    table_name: String,
}

impl<S: DimensionSource> DimensionPipeline<S> {
    pub fn dimension(&self) -> &str {
        self.source.dimension()
    }

    pub fn new(source: S, registry: Arc<NamingRegistry>) -> Self {
        let table_name = registry.dimension_table(source.dimension());
        let name = table_name.clone();
        Self {
            source,
            registry,
            name,
            table_name,
        }
    }
}

#[async_trait]
impl<S: DimensionSource> Pipeline for DimensionPipeline<S> {
    fn name(&self) -> &str {
        &self.name
    }

    fn table_name(&self) -> &str {
        &self.table_name
    }

    fn layer(&self) -> Layer {
        Layer::Dimension
    }

    fn schema(&self, table: &Table) -> TableSchema {
        TableSchema::infer(&self.table_name, table)
            .with_primary_key(self.registry.sk_column(self.source.dimension()))
    }

    async fn extract(&self, ctx: &RunContext) -> EtlResult<Table> {
        self.source.extract(ctx).await
    }

    async fn transform(
        &self,
        table: Table,
        ctx: &RunContext,
        _db: &dyn Warehouse,
    ) -> EtlResult<Table> {
        let cleaned = self.source.transform(table, ctx).await?;
        build_dimension(
            cleaned,
            self.source.dimension(),
            self.source.business_key(),
            &self.registry,
        )
    }

    async fn validate(&self, table: &Table, _ctx: &RunContext) -> EtlResult<()> {
        enforce_dimension_rules(
            table,
            self.source.dimension(),
            &self.registry,
            self.source.extra_rules(),
        )
    }
}

#[cfg(test)]
#[path = "dimension_test.rs"]
mod tests;
