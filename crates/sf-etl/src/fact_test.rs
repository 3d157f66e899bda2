use super::*;
use crate::error::EtlResult;
use crate::pipeline::{Runner, Stage};
use sf_core::{NamingRegistry, RunContext, Table, Value};
use sf_db::DuckDbWarehouse;

async fn seed_institution_dim(db: &DuckDbWarehouse) {
    db.execute_batch(
        "CREATE TABLE dim_institution (
            institution_sk BIGINT PRIMARY KEY,
            institution_code BIGINT,
            acronym VARCHAR,
            name VARCHAR
        );
        INSERT INTO dim_institution VALUES
            (0, 0, 'XX', 'UNKNOWN'),
            (1, 1001, 'UA', 'University A'),
            (2, 1002, 'UB', 'University B');",
    )
    .await
    .unwrap();
}

fn institution_ref() -> DimensionRef {
    DimensionRef::new("institution", &["institution_code"])
}

#[test]
fn normalize_key_trims_and_uppercases() {
    assert_eq!(normalize_key("  abc-12 "), "ABC-12");
}

#[test]
fn normalize_key_strips_float_artifact() {
    assert_eq!(normalize_key("177173.0"), "177173");
    // Only a pure numeric prefix qualifies
    assert_eq!(normalize_key("v1.0"), "V1.0");
}

#[tokio::test]
async fn lookup_resolves_registered_keys() {
    let db = DuckDbWarehouse::in_memory().unwrap();
    seed_institution_dim(&db).await;
    let registry = NamingRegistry::standard();

    let mut lookup = KeyLookup::from_dimension(&db, &institution_ref(), &registry)
        .await
        .unwrap();

    assert_eq!(lookup.len(), 2);
    assert_eq!(lookup.resolve(&Value::Int(1001)), 1);
    assert_eq!(lookup.resolve(&Value::Text("1002.0".into())), 2);
}

#[tokio::test]
async fn unresolved_key_yields_sentinel_and_is_counted() {
    let db = DuckDbWarehouse::in_memory().unwrap();
    seed_institution_dim(&db).await;
    let registry = NamingRegistry::standard();

    let mut lookup = KeyLookup::from_dimension(&db, &institution_ref(), &registry)
        .await
        .unwrap();

    assert_eq!(lookup.resolve(&Value::Int(1001)), 1);
    assert_eq!(lookup.resolve(&Value::Int(9999)), 0);
    assert_eq!(lookup.resolve(&Value::Null), 0);

    let stats = lookup.stats();
    assert_eq!(stats.total, 3);
    assert_eq!(stats.resolved, 1);
    assert!((stats.match_rate() - 1.0 / 3.0).abs() < 1e-9);
}

#[tokio::test]
async fn unknown_row_is_excluded_from_lookup() {
    let db = DuckDbWarehouse::in_memory().unwrap();
    seed_institution_dim(&db).await;
    let registry = NamingRegistry::standard();

    // The SK=0 row's business key (0) must not resolve to itself
    let mut lookup = KeyLookup::from_dimension(&db, &institution_ref(), &registry)
        .await
        .unwrap();
    assert_eq!(lookup.resolve(&Value::Int(0)), 0);
    assert_eq!(lookup.stats().resolved, 0);
}

#[tokio::test]
async fn missing_dimension_table_yields_empty_lookup() {
    let db = DuckDbWarehouse::in_memory().unwrap();
    let registry = NamingRegistry::standard();

    let mut lookup = KeyLookup::from_dimension(&db, &institution_ref(), &registry)
        .await
        .unwrap();

    assert!(lookup.is_empty());
    assert_eq!(lookup.resolve(&Value::Int(1001)), 0);
}

#[tokio::test]
async fn first_candidate_key_column_wins() {
    let db = DuckDbWarehouse::in_memory().unwrap();
    seed_institution_dim(&db).await;
    let registry = NamingRegistry::standard();

    let dim_ref = DimensionRef::new("institution", &["legacy_code", "institution_code"]);
    let mut lookup = KeyLookup::from_dimension(&db, &dim_ref, &registry)
        .await
        .unwrap();
    assert_eq!(lookup.resolve(&Value::Int(1001)), 1);
}

#[test]
fn dedupe_keeps_first_occurrence_on_grain() {
    let mut table = Table::new(
        "fact_publication",
        vec!["publication_id".into(), "author_order".into(), "score".into()],
    );
    table
        .push_row(vec![Value::Int(1), Value::Int(1), Value::Float(1.0)])
        .unwrap();
    table
        .push_row(vec![Value::Int(1), Value::Int(1), Value::Float(9.0)])
        .unwrap();
    table
        .push_row(vec![Value::Int(1), Value::Int(2), Value::Float(2.0)])
        .unwrap();

    let out = dedupe_rows(table, &["publication_id".into(), "author_order".into()]);
    assert_eq!(out.len(), 2);
    // First duplicate wins
    assert_eq!(out.get(0, "score"), Some(&Value::Float(1.0)));
}

#[test]
fn empty_grain_dedupes_on_full_row() {
    let mut table = Table::new("fact_x", vec!["a".into(), "b".into()]);
    table.push_row(vec![Value::Int(1), Value::Int(2)]).unwrap();
    table.push_row(vec![Value::Int(1), Value::Int(2)]).unwrap();
    table.push_row(vec![Value::Int(1), Value::Int(3)]).unwrap();

    let out = dedupe_rows(table, &[]);
    assert_eq!(out.len(), 2);
}

struct PublicationFacts {
    rows: Vec<(i64, i64)>,
}

#[async_trait]
impl FactSource for PublicationFacts {
    fn fact_table(&self) -> &str {
        "fact_publication"
    }

    fn dimension_refs(&self) -> Vec<DimensionRef> {
        vec![institution_ref()]
    }

    fn grain(&self) -> Vec<String> {
        vec!["publication_id".into(), "institution_sk".into()]
    }

    async fn extract(&self, _ctx: &RunContext) -> EtlResult<Table> {
        let mut table = Table::new(
            "raw_publications",
            vec!["publication_id".into(), "institution_code".into()],
        );
        for (id, code) in &self.rows {
            table.push_row(vec![Value::Int(*id), Value::Int(*code)])?;
        }
        Ok(table)
    }

    async fn transform(
        &self,
        table: Table,
        lookups: &mut HashMap<String, KeyLookup>,
        _ctx: &RunContext,
    ) -> EtlResult<Table> {
        let lookup = lookups.get_mut("institution").unwrap();
        let code_idx = table.column_index("institution_code").unwrap();

        let mut out = Table::new(
            self.fact_table(),
            vec!["publication_id".into(), "institution_sk".into()],
        );
        for row in &table.rows {
            let sk = lookup.resolve(&row[code_idx]);
            out.push_row(vec![row[0].clone(), Value::Int(sk)])?;
        }
        Ok(out)
    }
}

#[tokio::test]
async fn fact_pipeline_maps_keys_and_loads() {
    let db = DuckDbWarehouse::in_memory().unwrap();
    seed_institution_dim(&db).await;

    let source = PublicationFacts {
        // 9999 has no dimension row and must land on SK 0
        rows: vec![(1, 1001), (2, 1002), (3, 9999)],
    };
    let pipeline = FactPipeline::new(source, Arc::new(NamingRegistry::standard()));

    let runner = Runner::default();
    let table = runner.run(&pipeline, &RunContext::new(), &db).await.unwrap();

    assert_eq!(table.len(), 3);
    assert_eq!(table.get(0, "institution_sk"), Some(&Value::Int(1)));
    assert_eq!(table.get(2, "institution_sk"), Some(&Value::Int(0)));

    assert_eq!(db.query_count("SELECT * FROM fact_publication").await.unwrap(), 3);
    // The institution FK is live because dim_institution exists
    let loaded = db.fetch_table("fact_publication").await.unwrap();
    assert!(loaded.column_index("institution_sk").is_some());
}

#[tokio::test]
async fn fact_pipeline_survives_absent_dimension() {
    let db = DuckDbWarehouse::in_memory().unwrap();

    let source = PublicationFacts {
        rows: vec![(1, 1001)],
    };
    let pipeline = FactPipeline::new(source, Arc::new(NamingRegistry::standard()));

    let runner = Runner::default();
    let table = runner.run(&pipeline, &RunContext::new(), &db).await.unwrap();

    // Everything degrades to the sentinel instead of failing
    assert_eq!(table.get(0, "institution_sk"), Some(&Value::Int(0)));
    assert_eq!(db.query_count("SELECT * FROM fact_publication").await.unwrap(), 1);
}

#[tokio::test]
async fn fact_schema_declares_dimension_foreign_key() {
    let source = PublicationFacts { rows: vec![] };
    let pipeline = FactPipeline::new(source, Arc::new(NamingRegistry::standard()));

    let mut table = Table::new(
        "fact_publication",
        vec!["publication_id".into(), "institution_sk".into()],
    );
    table.push_row(vec![Value::Int(1), Value::Int(1)]).unwrap();

    let schema = pipeline.schema(&table);
    assert_eq!(schema.foreign_keys.len(), 1);
    assert_eq!(schema.foreign_keys[0].references_table, "dim_institution");
}

#[test]
fn stage_labels_are_stable() {
    assert_eq!(Stage::Transform.to_string(), "transform");
}
