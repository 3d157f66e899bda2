//! Calendar dimension synthesized in memory
//!
//! No source file: the extract enumerates year/month combinations for
//! the configured span. `time_code` (YYYYMM) is the business key used
//! by facts to resolve the time surrogate key.

use async_trait::async_trait;
use chrono::{Datelike, Utc};
use sf_core::{NamingRegistry, RunContext, Table, Value};
use sf_etl::{DimensionPipeline, DimensionSource, EtlResult};
use std::sync::Arc;

const DEFAULT_START_YEAR: i64 = 2000;

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

pub(crate) struct TimeSource;

impl TimeSource {
    fn year_span(ctx: &RunContext) -> (i64, i64) {
        let current_year = Utc::now().year() as i64;
        let start = ctx
            .params
            .get("start_year")
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_START_YEAR);
        let end = ctx
            .params
            .get("end_year")
            .and_then(|v| v.parse().ok())
            .unwrap_or(current_year);
        (start, end.max(start))
    }
}

#[async_trait]
impl DimensionSource for TimeSource {
    fn dimension(&self) -> &str {
        "time"
    }

    fn business_key(&self) -> &str {
        "time_code"
    }

    async fn extract(&self, ctx: &RunContext) -> EtlResult<Table> {
        let (start, end) = Self::year_span(ctx);
        let mut table = Table::new(
            "raw_calendar",
            vec![
                "time_code".to_string(),
                "year".to_string(),
                "month".to_string(),
                "month_name".to_string(),
                "quarter".to_string(),
                "semester".to_string(),
            ],
        );

        for year in start..=end {
            for month in 1..=12i64 {
                table.push_row(vec![
                    Value::Int(year * 100 + month),
                    Value::Int(year),
                    Value::Int(month),
                    Value::from(MONTH_NAMES[(month - 1) as usize]),
                    Value::Int((month - 1) / 3 + 1),
                    Value::Int(if month <= 6 { 1 } else { 2 }),
                ])?;
            }
        }
        Ok(table)
    }

    async fn transform(&self, table: Table, _ctx: &RunContext) -> EtlResult<Table> {
        Ok(table)
    }
}

pub(crate) fn time_pipeline(registry: Arc<NamingRegistry>) -> DimensionPipeline<TimeSource> {
    DimensionPipeline::new(TimeSource, registry)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn extract_covers_the_configured_span() {
        let ctx = RunContext::new()
            .with_param("start_year", "2020")
            .with_param("end_year", "2021");
        let table = TimeSource.extract(&ctx).await.unwrap();

        assert_eq!(table.len(), 24);
        assert_eq!(table.get(0, "time_code"), Some(&Value::Int(202001)));
        assert_eq!(table.get(0, "quarter"), Some(&Value::Int(1)));
        assert_eq!(table.get(23, "time_code"), Some(&Value::Int(202112)));
        assert_eq!(table.get(23, "semester"), Some(&Value::Int(2)));
    }

    #[tokio::test]
    async fn inverted_span_collapses_to_start_year() {
        let ctx = RunContext::new()
            .with_param("start_year", "2021")
            .with_param("end_year", "2019");
        let table = TimeSource.extract(&ctx).await.unwrap();
        assert_eq!(table.len(), 12);
    }
}
