//! Publication fact fed from a CSV extract
//!
//! Each input row is one publication/author pairing. Business keys
//! resolve against the institution, time and researcher dimensions;
//! unresolved references land on the SK 0 sentinel row.

use async_trait::async_trait;
use sf_core::{Config, CoreError, NamingRegistry, RunContext, Table, Value};
use sf_etl::{CsvSource, DimensionRef, EtlResult, FactPipeline, FactSource, KeyLookup, Source};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

const SOURCE_FILE: &str = "publications.csv";

const INPUT_COLUMNS: [&str; 8] = [
    "publication_id",
    "title",
    "year",
    "month",
    "institution_code",
    "person_id",
    "author_order",
    "citation_count",
];

pub(crate) struct PublicationSource {
    csv: CsvSource,
}

#[async_trait]
impl FactSource for PublicationSource {
    fn fact_table(&self) -> &str {
        "fact_publication"
    }

    fn dimension_refs(&self) -> Vec<DimensionRef> {
        vec![
            DimensionRef::new("institution", &["institution_code"]),
            DimensionRef::new("time", &["time_code"]),
            DimensionRef::new("researcher", &["person_id"]),
        ]
    }

    fn grain(&self) -> Vec<String> {
        vec!["publication_id".to_string(), "author_order".to_string()]
    }

    async fn extract(&self, ctx: &RunContext) -> EtlResult<Table> {
        self.csv.read(ctx).await
    }

    async fn transform(
        &self,
        table: Table,
        lookups: &mut HashMap<String, KeyLookup>,
        _ctx: &RunContext,
    ) -> EtlResult<Table> {
        let mut idx = HashMap::new();
        for column in INPUT_COLUMNS {
            let position = table
                .column_index(column)
                .ok_or_else(|| CoreError::MissingColumn {
                    table: table.name.clone(),
                    column: column.to_string(),
                })?;
            idx.insert(column, position);
        }

        let mut out = Table::new(
            self.fact_table(),
            vec![
                "publication_id".to_string(),
                "title".to_string(),
                "institution_sk".to_string(),
                "time_sk".to_string(),
                "researcher_sk".to_string(),
                "author_order".to_string(),
                "citation_count".to_string(),
            ],
        );

        for row in &table.rows {
            let institution_sk = resolve(lookups, "institution", &row[idx["institution_code"]]);

            // The time business key is YYYYMM derived from year/month
            let time_key = match (row[idx["year"]].as_i64(), row[idx["month"]].as_i64()) {
                (Some(year), Some(month)) => Value::Int(year * 100 + month),
                _ => Value::Null,
            };
            let time_sk = resolve(lookups, "time", &time_key);
            let researcher_sk = resolve(lookups, "researcher", &row[idx["person_id"]]);

            out.push_row(vec![
                row[idx["publication_id"]].clone(),
                row[idx["title"]].clone(),
                Value::Int(institution_sk),
                Value::Int(time_sk),
                Value::Int(researcher_sk),
                row[idx["author_order"]].clone(),
                row[idx["citation_count"]].clone(),
            ])?;
        }
        Ok(out)
    }
}

fn resolve(lookups: &mut HashMap<String, KeyLookup>, dimension: &str, key: &Value) -> i64 {
    lookups
        .get_mut(dimension)
        .map(|l| l.resolve(key))
        .unwrap_or(sf_core::UNKNOWN_SK)
}

pub(crate) fn publication_pipeline(
    config: &Config,
    root: &Path,
    registry: Arc<NamingRegistry>,
) -> FactPipeline<PublicationSource> {
    let path = super::source_file(config, root, SOURCE_FILE);
    let source = PublicationSource {
        csv: CsvSource::new(path, "raw_publications"),
    };
    FactPipeline::new(source, registry)
}
