//! Fact pipeline: business-key resolution into surrogate keys
//!
//! A fact row's business keys resolve against dimension lookups built
//! from the warehouse's current dimension snapshots. A miss is not an
//! error: the row degrades to the sentinel SK 0 and the miss is
//! tracked as a match-rate quality metric.

use crate::error::EtlResult;
use crate::pipeline::{Layer, Pipeline};
use async_trait::async_trait;
use sf_core::{NamingRegistry, RunContext, Table, Value, UNKNOWN_SK};
use sf_db::{TableSchema, Warehouse};
use std::collections::HashMap;
use std::sync::Arc;

/// Row count above which a zero match rate is flagged as suspicious
const MATCH_RATE_SMELL_THRESHOLD: usize = 100;

/// A fact's reference to one dimension
#[derive(Debug, Clone)]
pub struct DimensionRef {
    /// Logical dimension name (registry key)
    pub dimension: String,
    /// Candidate business-key columns in the dimension table; the
    /// first one present wins, tolerating heterogeneous schemas
    pub key_columns: Vec<String>,
}

impl DimensionRef {
    pub fn new(dimension: impl Into<String>, key_columns: &[&str]) -> Self {
        Self {
            dimension: dimension.into(),
            key_columns: key_columns.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Resolution counters for one dimension
#[derive(Debug, Clone, Copy, Default)]
pub struct MatchStats {
    pub resolved: usize,
    pub total: usize,
}

impl MatchStats {
    pub fn match_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.resolved as f64 / self.total as f64
        }
    }
}

/// business key → surrogate key lookup for one dimension
#[derive(Debug)]
pub struct KeyLookup {
    dimension: String,
    map: HashMap<String, i64>,
    stats: MatchStats,
}

/// Normalize a lookup key on both sides of the join: trim, uppercase,
/// and strip the trailing ".0" left by numeric-as-text round trips.
pub fn normalize_key(raw: &str) -> String {
    let mut key = raw.trim().to_uppercase();
    if let Some(stripped) = key.strip_suffix(".0") {
        if stripped.chars().all(|c| c.is_ascii_digit()) {
            key = stripped.to_string();
        }
    }
    key
}

impl KeyLookup {
    /// Build a lookup from the dimension's current warehouse rows.
    ///
    /// An absent dimension table yields an empty lookup (everything
    /// resolves to the sentinel) rather than an error, so fact loads
    /// degrade instead of failing when a dimension was never built.
    pub async fn from_dimension(
        db: &dyn Warehouse,
        dimension_ref: &DimensionRef,
        registry: &NamingRegistry,
    ) -> EtlResult<Self> {
        let dimension = dimension_ref.dimension.clone();
        let table_name = registry.dimension_table(&dimension);
        let sk_column = registry.sk_column(&dimension);

        if !db.table_exists(&table_name).await? {
            log::warn!(
                "Dimension table {} not found; all {} references will resolve to SK 0",
                table_name,
                dimension
            );
            return Ok(Self::empty(dimension));
        }

        let table = db.fetch_table(&table_name).await?;
        let Some(sk_idx) = table.column_index(&sk_column) else {
            log::warn!(
                "Dimension table {} has no {} column; lookup left empty",
                table_name,
                sk_column
            );
            return Ok(Self::empty(dimension));
        };

        // First registered candidate column present in the table wins
        let Some(key_idx) = dimension_ref
            .key_columns
            .iter()
            .find_map(|c| table.column_index(c))
        else {
            log::warn!(
                "Dimension table {} has none of the candidate key columns {:?}",
                table_name,
                dimension_ref.key_columns
            );
            return Ok(Self::empty(dimension));
        };

        let mut map = HashMap::new();
        for row in &table.rows {
            let Some(sk) = row[sk_idx].as_i64() else {
                continue;
            };
            if sk <= UNKNOWN_SK {
                continue;
            }
            let key = normalize_key(&row[key_idx].to_key_string());
            if !key.is_empty() {
                map.entry(key).or_insert(sk);
            }
        }

        log::info!("Loaded {} lookup entries from {}", map.len(), table_name);
        Ok(Self {
            dimension,
            map,
            stats: MatchStats::default(),
        })
    }

    fn empty(dimension: String) -> Self {
        Self {
            dimension,
            map: HashMap::new(),
            stats: MatchStats::default(),
        }
    }

    pub fn dimension(&self) -> &str {
        &self.dimension
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Resolve a business key; a miss yields the sentinel SK 0
    pub fn resolve(&mut self, key: &Value) -> i64 {
        self.stats.total += 1;
        let normalized = normalize_key(&key.to_key_string());
        match self.map.get(&normalized) {
            Some(sk) => {
                self.stats.resolved += 1;
                *sk
            }
            None => UNKNOWN_SK,
        }
    }

    pub fn stats(&self) -> MatchStats {
        self.stats
    }

    /// Log the match rate; a 0% rate over a large row count is a
    /// correctness smell worth surfacing, but never stops the run.
    pub fn log_match_rate(&self) {
        let stats = self.stats;
        if stats.total == 0 {
            return;
        }
        log::info!(
            "{}: resolved {} of {} references ({:.2}%)",
            self.dimension,
            stats.resolved,
            stats.total,
            stats.match_rate() * 100.0
        );
        if stats.resolved == 0 && stats.total >= MATCH_RATE_SMELL_THRESHOLD {
            log::warn!(
                "{}: 0% match rate across {} rows, check business-key columns",
                self.dimension,
                stats.total
            );
        }
    }
}

/// Drop duplicate rows on the natural grain (all columns when the
/// grain is empty), keeping the first occurrence.
pub fn dedupe_rows(table: Table, grain: &[String]) -> Table {
    let indices: Vec<usize> = if grain.is_empty() {
        (0..table.columns.len()).collect()
    } else {
        grain
            .iter()
            .filter_map(|c| table.column_index(c))
            .collect()
    };

    let mut seen = std::collections::HashSet::new();
    let mut out = Table::new(table.name.clone(), table.columns.clone());
    let before = table.len();

    for row in table.rows {
        let key: Vec<String> = indices.iter().map(|&i| row[i].to_key_string()).collect();
        if seen.insert(key.join("\u{1f}")) {
            out.rows.push(row);
        }
    }

    if out.len() < before {
        log::info!(
            "{}: dropped {} duplicate rows on the fact grain",
            out.name,
            before - out.len()
        );
    }
    out
}

/// Fact-specific extract and key-mapping transform
#[async_trait]
pub trait FactSource: Send + Sync {
    /// Target fact table name
    fn fact_table(&self) -> &str;

    /// Dimensions this fact references
    fn dimension_refs(&self) -> Vec<DimensionRef>;

    /// Columns defining the fact's natural grain for deduplication;
    /// empty means the full row
    fn grain(&self) -> Vec<String> {
        Vec::new()
    }

    async fn extract(&self, ctx: &RunContext) -> EtlResult<Table>;

    /// Map business keys to surrogate keys through the lookups and
    /// shape the measure columns. Every foreign-key column must come
    /// out as a typed integer (0 for unresolved references).
    async fn transform(
        &self,
        table: Table,
        lookups: &mut HashMap<String, KeyLookup>,
        ctx: &RunContext,
    ) -> EtlResult<Table>;
}

/// Fact specialization of the base pipeline
pub struct FactPipeline<S> {
    source: S,
    registry: Arc<NamingRegistry>,
}

impl<S: FactSource> FactPipeline<S> {
    pub fn new(source: S, registry: Arc<NamingRegistry>) -> Self {
        Self { source, registry }
    }
}

#[async_trait]
impl<S: FactSource> Pipeline for FactPipeline<S> {
    fn name(&self) -> &str {
        self.source.fact_table()
    }

    fn table_name(&self) -> &str {
        self.source.fact_table()
    }

    fn layer(&self) -> Layer {
        Layer::Fact
    }

    /// Declares a foreign key per referenced dimension; the loader
    /// drops constraints whose dimension is absent at load time.
    fn schema(&self, table: &Table) -> TableSchema {
        let mut schema = TableSchema::infer(self.source.fact_table(), table);
        for dim_ref in self.source.dimension_refs() {
            let sk_column = self.registry.sk_column(&dim_ref.dimension);
            if table.column_index(&sk_column).is_some() {
                schema = schema.with_foreign_key(
                    sk_column.clone(),
                    self.registry.dimension_table(&dim_ref.dimension),
                    sk_column,
                );
            }
        }
        schema
    }

    async fn extract(&self, ctx: &RunContext) -> EtlResult<Table> {
        self.source.extract(ctx).await
    }

    async fn transform(
        &self,
        table: Table,
        ctx: &RunContext,
        db: &dyn Warehouse,
    ) -> EtlResult<Table> {
        let mut lookups = HashMap::new();
        for dim_ref in self.source.dimension_refs() {
            let lookup = KeyLookup::from_dimension(db, &dim_ref, &self.registry).await?;
            lookups.insert(dim_ref.dimension.clone(), lookup);
        }

        let mapped = self.source.transform(table, &mut lookups, ctx).await?;

        for lookup in lookups.values() {
            lookup.log_match_rate();
        }

        Ok(dedupe_rows(mapped, &self.source.grain()))
    }

    async fn validate(&self, table: &Table, _ctx: &RunContext) -> EtlResult<()> {
        if table.is_empty() {
            log::warn!("{}: fact table came out empty", self.source.fact_table());
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "fact_test.rs"]
mod tests;
