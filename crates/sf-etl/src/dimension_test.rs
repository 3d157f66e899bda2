use super::*;
use crate::error::EtlError;
use crate::pipeline::Runner;
use sf_core::{RuleKind, RunContext, Severity, UNKNOWN_SK};
use sf_db::DuckDbWarehouse;

fn institution_rows(rows: &[(i64, &str, &str)]) -> Table {
    let mut table = Table::new(
        "clean_institutions",
        vec![
            "institution_code".to_string(),
            "acronym".to_string(),
            "name".to_string(),
        ],
    );
    for (code, acronym, name) in rows {
        table
            .push_row(vec![
                Value::Int(*code),
                Value::from(*acronym),
                Value::from(*name),
            ])
            .unwrap();
    }
    table
}

#[test]
fn build_prepends_unknown_row_and_assigns_sequential_sks() {
    let registry = NamingRegistry::standard();
    let table = institution_rows(&[(1001, "UA", "University A"), (1002, "UB", "University B")]);

    let dim = build_dimension(table, "institution", "institution_code", &registry).unwrap();

    assert_eq!(dim.name, "dim_institution");
    assert_eq!(dim.len(), 3);
    assert_eq!(dim.get(0, "institution_sk"), Some(&Value::Int(UNKNOWN_SK)));
    assert_eq!(dim.get(0, "acronym"), Some(&Value::from("XX")));
    assert_eq!(dim.get(1, "institution_sk"), Some(&Value::Int(1)));
    assert_eq!(dim.get(2, "institution_sk"), Some(&Value::Int(2)));
    // Input order is preserved
    assert_eq!(dim.get(1, "name"), Some(&Value::from("University A")));
}

#[test]
fn build_stamps_one_timestamp_for_the_whole_run() {
    let registry = NamingRegistry::standard();
    let table = institution_rows(&[(1001, "UA", "University A")]);

    let dim = build_dimension(table, "institution", "institution_code", &registry).unwrap();

    let created = dim.get(0, "created_at").cloned().unwrap();
    assert_eq!(dim.get(1, "created_at"), Some(&created));
    assert_eq!(dim.get(1, "updated_at"), Some(&created));
}

#[test]
fn duplicate_business_keys_keep_first_occurrence() {
    let registry = NamingRegistry::standard();
    let table = institution_rows(&[
        (1001, "UA", "University A"),
        (1001, "UA2", "University A Again"),
        (1002, "UB", "University B"),
    ]);

    let dim = build_dimension(table, "institution", "institution_code", &registry).unwrap();

    assert_eq!(dim.len(), 3);
    assert_eq!(dim.get(1, "acronym"), Some(&Value::from("UA")));
}

#[test]
fn blank_business_keys_are_dropped() {
    let registry = NamingRegistry::standard();
    let mut table = institution_rows(&[(1001, "UA", "University A")]);
    table
        .push_row(vec![Value::Null, Value::from("??"), Value::from("No key")])
        .unwrap();

    let dim = build_dimension(table, "institution", "institution_code", &registry).unwrap();
    assert_eq!(dim.len(), 2);
}

#[test]
fn missing_business_key_column_is_an_error() {
    let registry = NamingRegistry::standard();
    let table = Table::new("clean_institutions", vec!["name".to_string()]);

    let err = build_dimension(table, "institution", "institution_code", &registry).unwrap_err();
    assert!(matches!(
        err,
        EtlError::Core(CoreError::MissingColumn { .. })
    ));
}

#[test]
fn built_dimension_passes_standard_rules() {
    let registry = NamingRegistry::standard();
    let table = institution_rows(&[(1001, "UA", "University A")]);
    let dim = build_dimension(table, "institution", "institution_code", &registry).unwrap();

    enforce_dimension_rules(&dim, "institution", &registry, Vec::new()).unwrap();
}

#[test]
fn error_severity_failure_aborts() {
    let registry = NamingRegistry::standard();
    // Hand-built table with a NULL surrogate key
    let mut dim = Table::new(
        "dim_institution",
        vec!["institution_sk".to_string(), "name".to_string()],
    );
    dim.push_row(vec![Value::Null, Value::from("Broken")]).unwrap();

    let err = enforce_dimension_rules(&dim, "institution", &registry, Vec::new()).unwrap_err();
    let results = err.validation_results().unwrap();
    assert!(results.iter().any(|r| r.rule_name == "sk_not_null" && !r.passed));
}

#[test]
fn warning_severity_failure_continues() {
    let registry = NamingRegistry::standard();
    // "A" is shorter than the advisory minimum name length
    let table = institution_rows(&[(1001, "UA", "A")]);
    let dim = build_dimension(table, "institution", "institution_code", &registry).unwrap();

    enforce_dimension_rules(&dim, "institution", &registry, Vec::new()).unwrap();
}

#[test]
fn extra_rules_participate_in_gating() {
    let registry = NamingRegistry::standard();
    let table = institution_rows(&[(1001, "very-long-acronym", "University A")]);
    let dim = build_dimension(table, "institution", "institution_code", &registry).unwrap();

    let rule = ValidationRule::new(
        "acronym_length",
        "acronym",
        RuleKind::Length {
            min_length: Some(1),
            max_length: Some(8),
        },
        Severity::Error,
    );
    let err = enforce_dimension_rules(&dim, "institution", &registry, vec![rule]).unwrap_err();
    assert!(err.validation_results().is_some());
}

/// sk/business-key pairs in key order, ignoring run timestamps
fn key_pairs(table: &Table) -> Vec<(i64, i64)> {
    let sk = table.column_index("institution_sk").unwrap();
    let code = table.column_index("institution_code").unwrap();
    let mut pairs: Vec<(i64, i64)> = table
        .rows
        .iter()
        .map(|r| (r[sk].as_i64().unwrap(), r[code].as_i64().unwrap()))
        .collect();
    pairs.sort_unstable();
    pairs
}

struct InstitutionSource {
    rows: Vec<(i64, &'static str, &'static str)>,
}

#[async_trait]
impl DimensionSource for InstitutionSource {
    fn dimension(&self) -> &str {
        "institution"
    }

    fn business_key(&self) -> &str {
        "institution_code"
    }

    async fn extract(&self, _ctx: &RunContext) -> EtlResult<Table> {
        Ok(institution_rows(&self.rows))
    }

    async fn transform(&self, table: Table, _ctx: &RunContext) -> EtlResult<Table> {
        Ok(table)
    }
}

#[tokio::test]
async fn dimension_pipeline_loads_and_is_idempotent() {
    let db = DuckDbWarehouse::in_memory().unwrap();
    let registry = Arc::new(NamingRegistry::standard());
    let pipeline = DimensionPipeline::new(
        InstitutionSource {
            rows: vec![
                (1001, "UA", "University A"),
                (1001, "UA", "University A"),
                (1002, "UB", "University B"),
            ],
        },
        registry,
    );

    let runner = Runner::default();
    let ctx = RunContext::new();

    runner.run(&pipeline, &ctx, &db).await.unwrap();
    assert_eq!(db.query_count("SELECT * FROM dim_institution").await.unwrap(), 3);
    let first = db.fetch_table("dim_institution").await.unwrap();

    // Rerunning with unchanged input reassigns identical keys
    runner.run(&pipeline, &ctx, &db).await.unwrap();
    let second = db.fetch_table("dim_institution").await.unwrap();
    assert_eq!(second.len(), 3);
    assert_eq!(key_pairs(&first), key_pairs(&second));
}

#[tokio::test]
async fn dimension_pipeline_dry_run_skips_the_sink() {
    let db = DuckDbWarehouse::in_memory().unwrap();
    let registry = Arc::new(NamingRegistry::standard());
    let pipeline = DimensionPipeline::new(
        InstitutionSource {
            rows: vec![(1001, "UA", "University A")],
        },
        registry,
    );

    let table = Runner::default()
        .run(&pipeline, &RunContext::new().dry_run(), &db)
        .await
        .unwrap();

    assert_eq!(table.len(), 2);
    assert!(!db.table_exists("dim_institution").await.unwrap());
}
