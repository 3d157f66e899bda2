//! Institution dimension fed from a CSV extract

use async_trait::async_trait;
use sf_core::{Config, CoreError, NamingRegistry, RunContext, Table, Value};
use sf_etl::{CsvSource, DimensionPipeline, DimensionSource, EtlResult, Source};
use std::path::Path;
use std::sync::Arc;

const SOURCE_FILE: &str = "institutions.csv";

pub(crate) struct InstitutionSource {
    csv: CsvSource,
}

#[async_trait]
impl DimensionSource for InstitutionSource {
    fn dimension(&self) -> &str {
        "institution"
    }

    fn business_key(&self) -> &str {
        "institution_code"
    }

    async fn extract(&self, ctx: &RunContext) -> EtlResult<Table> {
        self.csv.read(ctx).await
    }

    /// Project the extract down to the dimension's attribute columns,
    /// normalizing acronyms to uppercase.
    async fn transform(&self, table: Table, _ctx: &RunContext) -> EtlResult<Table> {
        let mut indices = Vec::with_capacity(3);
        for column in ["institution_code", "acronym", "name"] {
            let idx = table
                .column_index(column)
                .ok_or_else(|| CoreError::MissingColumn {
                    table: table.name.clone(),
                    column: column.to_string(),
                })?;
            indices.push(idx);
        }

        let mut out = Table::new(
            table.name.clone(),
            vec![
                "institution_code".to_string(),
                "acronym".to_string(),
                "name".to_string(),
            ],
        );
        for row in &table.rows {
            let acronym = match &row[indices[1]] {
                Value::Text(s) => Value::Text(s.trim().to_uppercase()),
                other => other.clone(),
            };
            out.push_row(vec![row[indices[0]].clone(), acronym, row[indices[2]].clone()])?;
        }
        Ok(out)
    }
}

pub(crate) fn institution_pipeline(
    config: &Config,
    root: &Path,
    registry: Arc<NamingRegistry>,
) -> DimensionPipeline<InstitutionSource> {
    let path = super::source_file(config, root, SOURCE_FILE);
    let source = InstitutionSource {
        csv: CsvSource::new(path, "raw_institutions"),
    };
    DimensionPipeline::new(source, registry)
}
