use super::*;

fn table_of(columns: &[&str], rows: Vec<Vec<Value>>) -> Table {
    let mut t = Table::new("t", columns.iter().map(|c| c.to_string()).collect());
    for row in rows {
        t.push_row(row).unwrap();
    }
    t
}

#[test]
fn missing_column_is_a_failed_result() {
    let t = table_of(&["a"], vec![vec![Value::Int(1)]]);
    let rules = [ValidationRule::new(
        "b_not_null",
        "b",
        RuleKind::NotNull,
        Severity::Error,
    )];
    let results = validate(&t, &rules);

    assert_eq!(results.len(), 1);
    assert!(!results[0].passed);
    assert!(results[0].message.contains("not found"));
}

#[test]
fn not_null_counts_blanks() {
    let t = table_of(
        &["name"],
        vec![
            vec![Value::from("a")],
            vec![Value::Null],
            vec![Value::from("  ")],
        ],
    );
    let rules = [ValidationRule::new(
        "name_not_null",
        "name",
        RuleKind::NotNull,
        Severity::Error,
    )];
    let results = validate(&t, &rules);

    assert!(!results[0].passed);
    assert_eq!(results[0].failed_count, 2);
    assert_eq!(results[0].total_count, 3);
}

#[test]
fn unique_counts_beyond_first_occurrence() {
    let t = table_of(
        &["id"],
        vec![
            vec![Value::Int(1)],
            vec![Value::Int(1)],
            vec![Value::Int(1)],
            vec![Value::Int(2)],
        ],
    );
    let rules = [ValidationRule::new(
        "id_unique",
        "id",
        RuleKind::Unique,
        Severity::Error,
    )];
    let results = validate(&t, &rules);

    assert_eq!(results[0].failed_count, 2);
}

#[test]
fn range_is_open_ended_and_coerces_text() {
    let t = table_of(
        &["n"],
        vec![
            vec![Value::from("5")],
            vec![Value::Int(-1)],
            vec![Value::from("abc")],
            vec![Value::Null],
        ],
    );
    let rules = [ValidationRule::new(
        "n_nonnegative",
        "n",
        RuleKind::Range {
            min: Some(0.0),
            max: None,
        },
        Severity::Error,
    )];
    let results = validate(&t, &rules);

    // -1 out of range, "abc" not coercible; null passes
    assert_eq!(results[0].failed_count, 2);
}

#[test]
fn format_matches_pattern() {
    let t = table_of(
        &["state"],
        vec![
            vec![Value::from("SP")],
            vec![Value::from("sp")],
            vec![Value::from("XXX")],
        ],
    );
    let rules = [ValidationRule::new(
        "state_format",
        "state",
        RuleKind::Format {
            pattern: "^[A-Z]{2}$".to_string(),
        },
        Severity::Error,
    )];
    let results = validate(&t, &rules);

    assert_eq!(results[0].failed_count, 2);
}

#[test]
fn allowed_values_rejects_outsiders() {
    let t = table_of(
        &["kind"],
        vec![vec![Value::from("A")], vec![Value::from("Z")]],
    );
    let rules = [ValidationRule::new(
        "kind_allowed",
        "kind",
        RuleKind::AllowedValues {
            values: vec!["A".to_string(), "B".to_string()],
        },
        Severity::Warning,
    )];
    let results = validate(&t, &rules);

    assert_eq!(results[0].failed_count, 1);
    assert_eq!(results[0].severity, Severity::Warning);
}

#[test]
fn empty_allowed_set_is_a_rule_error() {
    let t = table_of(&["kind"], vec![vec![Value::from("A")]]);
    let rules = [ValidationRule::new(
        "kind_allowed",
        "kind",
        RuleKind::AllowedValues { values: vec![] },
        Severity::Warning,
    )];
    let results = validate(&t, &rules);

    assert!(!results[0].passed);
    assert_eq!(results[0].severity, Severity::Error);
}

#[test]
fn length_bounds() {
    let t = table_of(
        &["name"],
        vec![
            vec![Value::from("ab")],
            vec![Value::from("a")],
            vec![Value::from("abcdef")],
        ],
    );
    let rules = [ValidationRule::new(
        "name_length",
        "name",
        RuleKind::Length {
            min_length: Some(2),
            max_length: Some(5),
        },
        Severity::Warning,
    )];
    let results = validate(&t, &rules);

    assert_eq!(results[0].failed_count, 2);
}

#[test]
fn summary_aggregates_by_severity() {
    let t = table_of(
        &["id"],
        vec![vec![Value::Int(1)], vec![Value::Int(1)]],
    );
    let rules = [
        ValidationRule::new("id_not_null", "id", RuleKind::NotNull, Severity::Error),
        ValidationRule::new("id_unique", "id", RuleKind::Unique, Severity::Error),
        ValidationRule::new(
            "id_small",
            "id",
            RuleKind::Range {
                min: None,
                max: Some(0.0),
            },
            Severity::Warning,
        ),
    ];
    let results = validate(&t, &rules);
    let summary = ValidationSummary::from_results(&results);

    assert_eq!(summary.total_rules, 3);
    assert_eq!(summary.passed, 1);
    assert_eq!(summary.failed, 2);
    assert_eq!(summary.error_count, 1);
    assert_eq!(summary.warning_count, 1);
    assert!(summary.has_errors());
    assert!((summary.success_rate - 1.0 / 3.0).abs() < 1e-9);
}

#[test]
fn dimension_validator_standard_rules() {
    let registry = NamingRegistry::standard();
    let validator = DimensionValidator::new("time", &registry);

    let names: Vec<&str> = validator.rules().iter().map(|r| r.name.as_str()).collect();
    assert!(names.contains(&"sk_not_null"));
    assert!(names.contains(&"sk_unique"));
    assert!(names.contains(&"sk_range"));
    assert!(names.contains(&"month_range"));
}

#[test]
fn dimension_validator_requires_name_when_standard() {
    let registry = NamingRegistry::standard();

    // institution's standard columns include "name"; time's do not
    let institution = DimensionValidator::new("institution", &registry);
    let names: Vec<&str> = institution.rules().iter().map(|r| r.name.as_str()).collect();
    assert!(names.contains(&"name_not_null"));

    let time = DimensionValidator::new("time", &registry);
    assert!(!time.rules().iter().any(|r| r.name == "name_not_null"));

    let t = table_of(
        &["institution_sk", "institution_code", "acronym", "name"],
        vec![
            vec![Value::Int(1), Value::Int(1001), Value::from("UA"), Value::Null],
        ],
    );
    let results = institution.validate(&t);
    assert!(results
        .iter()
        .any(|r| r.rule_name == "name_not_null" && !r.passed && r.severity == Severity::Error));
}

#[test]
fn dimension_validator_passes_clean_dimension() {
    let registry = NamingRegistry::standard();
    let validator = DimensionValidator::new("researcher", &registry);

    let t = table_of(
        &["researcher_sk", "person_id", "name"],
        vec![
            vec![Value::Int(0), Value::Int(0), Value::from("UNKNOWN")],
            vec![Value::Int(1), Value::Int(42), Value::from("Ada")],
        ],
    );
    let results = validator.validate(&t);
    let summary = ValidationSummary::from_results(&results);

    assert!(!summary.has_errors());
    assert_eq!(summary.failed, 0);
}
