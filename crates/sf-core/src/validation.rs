//! Declarative data-quality rule engine
//!
//! Rules are stateless and reusable across runs. A missing target
//! column is reported as a failed result, not a framework error:
//! absence of a field is a data-quality fact about the table.

use crate::registry::NamingRegistry;
use crate::table::{Table, Value};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Severity attached to a rule and carried into its result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "ERROR"),
            Severity::Warning => write!(f, "WARNING"),
            Severity::Info => write!(f, "INFO"),
        }
    }
}

/// What a rule checks
#[derive(Debug, Clone, PartialEq)]
pub enum RuleKind {
    /// Missing values (NULL or blank text) are failures
    NotNull,
    /// Rows beyond the first occurrence of a duplicated value are failures
    Unique,
    /// Values coerced to numeric must fall inside the (open-ended) range
    Range { min: Option<f64>, max: Option<f64> },
    /// Values must match the regex pattern
    Format { pattern: String },
    /// Values must belong to the fixed set
    AllowedValues { values: Vec<String> },
    /// String length must fall inside [min_length, max_length]
    Length {
        min_length: Option<usize>,
        max_length: Option<usize>,
    },
}

/// A single validation rule bound to one column
#[derive(Debug, Clone)]
pub struct ValidationRule {
    pub name: String,
    pub column: String,
    pub kind: RuleKind,
    pub severity: Severity,
}

impl ValidationRule {
    pub fn new(
        name: impl Into<String>,
        column: impl Into<String>,
        kind: RuleKind,
        severity: Severity,
    ) -> Self {
        Self {
            name: name.into(),
            column: column.into(),
            kind,
            severity,
        }
    }
}

/// Outcome of evaluating one rule against one table
#[derive(Debug, Clone, Serialize)]
pub struct ValidationResult {
    pub rule_name: String,
    pub column: String,
    pub passed: bool,
    pub failed_count: usize,
    pub total_count: usize,
    pub message: String,
    pub severity: Severity,
}

impl ValidationResult {
    fn failed_with(rule: &ValidationRule, total: usize, message: String) -> Self {
        Self {
            rule_name: rule.name.clone(),
            column: rule.column.clone(),
            passed: false,
            failed_count: 0,
            total_count: total,
            message,
            severity: Severity::Error,
        }
    }

    fn counted(rule: &ValidationRule, failed: usize, total: usize, message: String) -> Self {
        Self {
            rule_name: rule.name.clone(),
            column: rule.column.clone(),
            passed: failed == 0,
            failed_count: failed,
            total_count: total,
            message,
            severity: rule.severity,
        }
    }
}

/// Aggregate view of a rule run
#[derive(Debug, Clone, Serialize)]
pub struct ValidationSummary {
    pub total_rules: usize,
    pub passed: usize,
    pub failed: usize,
    pub error_count: usize,
    pub warning_count: usize,
    pub success_rate: f64,
}

impl ValidationSummary {
    pub fn from_results(results: &[ValidationResult]) -> Self {
        let total_rules = results.len();
        let passed = results.iter().filter(|r| r.passed).count();
        let error_count = results
            .iter()
            .filter(|r| !r.passed && r.severity == Severity::Error)
            .count();
        let warning_count = results
            .iter()
            .filter(|r| !r.passed && r.severity == Severity::Warning)
            .count();

        Self {
            total_rules,
            passed,
            failed: total_rules - passed,
            error_count,
            warning_count,
            success_rate: if total_rules > 0 {
                passed as f64 / total_rules as f64
            } else {
                0.0
            },
        }
    }

    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }
}

/// Evaluate every rule against the table
pub fn validate(table: &Table, rules: &[ValidationRule]) -> Vec<ValidationResult> {
    rules.iter().map(|rule| evaluate(table, rule)).collect()
}

fn evaluate(table: &Table, rule: &ValidationRule) -> ValidationResult {
    let total = table.len();

    let Some(idx) = table.column_index(&rule.column) else {
        return ValidationResult::failed_with(
            rule,
            total,
            format!("Column '{}' not found", rule.column),
        );
    };

    let values = table.rows.iter().map(move |row| &row[idx]);

    match &rule.kind {
        RuleKind::NotNull => {
            let failed = values.filter(|v| v.is_null()).count();
            ValidationResult::counted(
                rule,
                failed,
                total,
                format!("Found {} null values in {}", failed, rule.column),
            )
        }
        RuleKind::Unique => {
            let mut seen = HashSet::new();
            let failed = values.filter(|v| !seen.insert(v.to_key_string())).count();
            ValidationResult::counted(
                rule,
                failed,
                total,
                format!("Found {} duplicate values in {}", failed, rule.column),
            )
        }
        RuleKind::Range { min, max } => {
            let failed = values
                .filter(|v| match v.as_f64() {
                    // Nulls pass; non-coercible values fail the check
                    None => !v.is_null(),
                    Some(n) => {
                        min.map(|m| n < m).unwrap_or(false) || max.map(|m| n > m).unwrap_or(false)
                    }
                })
                .count();
            let range = match (min, max) {
                (Some(lo), Some(hi)) => format!("[{}, {}]", lo, hi),
                (Some(lo), None) => format!(">= {}", lo),
                (None, Some(hi)) => format!("<= {}", hi),
                (None, None) => "(unbounded)".to_string(),
            };
            ValidationResult::counted(
                rule,
                failed,
                total,
                format!(
                    "Found {} values outside range {} in {}",
                    failed, range, rule.column
                ),
            )
        }
        RuleKind::Format { pattern } => {
            let re = match Regex::new(pattern) {
                Ok(re) => re,
                Err(e) => {
                    return ValidationResult::failed_with(
                        rule,
                        total,
                        format!("Invalid pattern '{}': {}", pattern, e),
                    )
                }
            };
            let failed = values.filter(|v| !re.is_match(&v.to_key_string())).count();
            ValidationResult::counted(
                rule,
                failed,
                total,
                format!(
                    "Found {} values not matching pattern '{}' in {}",
                    failed, pattern, rule.column
                ),
            )
        }
        RuleKind::AllowedValues { values: allowed } => {
            if allowed.is_empty() {
                return ValidationResult::failed_with(
                    rule,
                    total,
                    "No allowed values provided for validation".to_string(),
                );
            }
            let set: HashSet<&str> = allowed.iter().map(String::as_str).collect();
            let failed = values
                .filter(|v| !set.contains(v.to_key_string().as_str()))
                .count();
            ValidationResult::counted(
                rule,
                failed,
                total,
                format!(
                    "Found {} values outside the allowed set in {}",
                    failed, rule.column
                ),
            )
        }
        RuleKind::Length {
            min_length,
            max_length,
        } => {
            let failed = values
                .filter(|v| {
                    let len = v.to_key_string().chars().count();
                    min_length.map(|m| len < m).unwrap_or(false)
                        || max_length.map(|m| len > m).unwrap_or(false)
                })
                .count();
            ValidationResult::counted(
                rule,
                failed,
                total,
                format!(
                    "Found {} values with length outside [{}, {}] in {}",
                    failed,
                    min_length.map(|m| m.to_string()).unwrap_or_default(),
                    max_length
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| "inf".to_string()),
                    rule.column
                ),
            )
        }
    }
}

/// Composes the standard rule set for a dimension table
#[derive(Debug, Clone)]
pub struct DimensionValidator {
    dimension: String,
    rules: Vec<ValidationRule>,
}

impl DimensionValidator {
    /// Standard rules: SK not-null, SK unique, SK >= 0, a name
    /// not-null check when the dimension's standard columns include
    /// one, plus dimension-specific rules for registered dimensions.
    pub fn new(dimension: &str, registry: &NamingRegistry) -> Self {
        let sk = registry.sk_column(dimension);
        let mut rules = vec![
            ValidationRule::new("sk_not_null", &sk, RuleKind::NotNull, Severity::Error),
            ValidationRule::new("sk_unique", &sk, RuleKind::Unique, Severity::Error),
            ValidationRule::new(
                "sk_range",
                &sk,
                RuleKind::Range {
                    min: Some(0.0),
                    max: None,
                },
                Severity::Error,
            ),
        ];

        // Dimensions whose standard column set carries a descriptive
        // name also require it to be populated
        if registry
            .standard_columns(dimension)
            .iter()
            .any(|c| c == "name")
        {
            rules.push(ValidationRule::new(
                "name_not_null",
                "name",
                RuleKind::NotNull,
                Severity::Error,
            ));
        }

        match dimension.trim().to_lowercase().as_str() {
            "time" => {
                rules.push(ValidationRule::new(
                    "month_range",
                    "month",
                    RuleKind::Range {
                        min: Some(0.0),
                        max: Some(12.0),
                    },
                    Severity::Error,
                ));
                rules.push(ValidationRule::new(
                    "year_range",
                    "year",
                    RuleKind::Range {
                        min: Some(0.0),
                        max: Some(2100.0),
                    },
                    Severity::Warning,
                ));
            }
            "location" => {
                rules.push(ValidationRule::new(
                    "state_format",
                    "state",
                    RuleKind::Format {
                        pattern: "^[A-Z]{2}$".to_string(),
                    },
                    Severity::Error,
                ));
                rules.push(ValidationRule::new(
                    "region_code_allowed",
                    "region_code",
                    RuleKind::AllowedValues {
                        values: ["N", "NE", "SE", "S", "CW", "XX"]
                            .iter()
                            .map(|s| s.to_string())
                            .collect(),
                    },
                    Severity::Warning,
                ));
            }
            "institution" => {
                rules.push(ValidationRule::new(
                    "name_length",
                    "name",
                    RuleKind::Length {
                        min_length: Some(2),
                        max_length: Some(255),
                    },
                    Severity::Warning,
                ));
            }
            _ => {}
        }

        Self {
            dimension: dimension.trim().to_lowercase(),
            rules,
        }
    }

    pub fn dimension(&self) -> &str {
        &self.dimension
    }

    /// Append a dimension-specific rule
    pub fn add_rule(&mut self, rule: ValidationRule) -> &mut Self {
        self.rules.push(rule);
        self
    }

    pub fn rules(&self) -> &[ValidationRule] {
        &self.rules
    }

    pub fn validate(&self, table: &Table) -> Vec<ValidationResult> {
        validate(table, &self.rules)
    }
}

#[cfg(test)]
#[path = "validation_test.rs"]
mod tests;
