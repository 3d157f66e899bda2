//! Dimension naming and surrogate-key registry
//!
//! Canonical mapping from a dimension's logical name to its SK column
//! and to the reserved SK=0 "unknown" row template. The registry is
//! built once at startup and shared by reference; it is never mutated
//! at runtime.

use crate::table::Value;
use std::collections::HashMap;

/// Reserved surrogate key for the unknown/not-applicable row
pub const UNKNOWN_SK: i64 = 0;

/// Generic placeholder for descriptive fields on the unknown row
const UNKNOWN_TEXT: &str = "UNKNOWN";

/// Immutable lookup table for dimension naming conventions
#[derive(Debug, Clone)]
pub struct NamingRegistry {
    sk_columns: HashMap<String, String>,
    standard_columns: HashMap<String, Vec<String>>,
    unknown_templates: HashMap<String, HashMap<String, Value>>,
}

impl NamingRegistry {
    /// Build the registry for the standard warehouse dimensions
    pub fn standard() -> Self {
        let mut sk_columns = HashMap::new();
        for dim in [
            "time",
            "location",
            "institution",
            "program",
            "researcher",
            "topic",
            "publication",
        ] {
            sk_columns.insert(dim.to_string(), format!("{}_sk", dim));
        }

        let mut standard_columns = HashMap::new();
        standard_columns.insert(
            "time".to_string(),
            cols(&["time_sk", "year", "month", "month_name", "quarter", "semester"]),
        );
        standard_columns.insert(
            "location".to_string(),
            cols(&["location_sk", "state", "name", "municipality", "region", "region_code"]),
        );
        standard_columns.insert(
            "institution".to_string(),
            cols(&["institution_sk", "institution_code", "acronym", "name"]),
        );
        standard_columns.insert(
            "program".to_string(),
            cols(&["program_sk", "program_code", "name", "institution_code"]),
        );
        standard_columns.insert(
            "researcher".to_string(),
            cols(&["researcher_sk", "person_id", "name"]),
        );
        standard_columns.insert(
            "topic".to_string(),
            cols(&["topic_sk", "topic_id", "topic_name", "macro_topic_id", "macro_topic_name"]),
        );
        standard_columns.insert(
            "publication".to_string(),
            cols(&["publication_sk", "publication_id", "title"]),
        );

        let mut unknown_templates: HashMap<String, HashMap<String, Value>> = HashMap::new();
        unknown_templates.insert(
            "time".to_string(),
            template(&[
                ("time_code", Value::Int(0)),
                ("year", Value::Int(0)),
                ("month", Value::Int(0)),
                ("month_name", Value::from(UNKNOWN_TEXT)),
                ("quarter", Value::Int(0)),
                ("semester", Value::Int(0)),
            ]),
        );
        unknown_templates.insert(
            "location".to_string(),
            template(&[
                ("state", Value::from("XX")),
                ("region_code", Value::from("XX")),
                ("municipality", Value::Null),
                ("latitude", Value::Null),
                ("longitude", Value::Null),
            ]),
        );
        unknown_templates.insert(
            "institution".to_string(),
            template(&[
                ("institution_code", Value::Int(0)),
                ("acronym", Value::from("XX")),
            ]),
        );
        unknown_templates.insert(
            "topic".to_string(),
            template(&[
                ("topic_id", Value::Int(0)),
                ("macro_topic_id", Value::Int(0)),
            ]),
        );
        unknown_templates.insert(
            "publication".to_string(),
            template(&[
                ("publication_id", Value::Int(0)),
                ("publication_year", Value::Int(0)),
            ]),
        );
        unknown_templates.insert(
            "researcher".to_string(),
            template(&[("person_id", Value::Int(0))]),
        );

        Self {
            sk_columns,
            standard_columns,
            unknown_templates,
        }
    }

    /// Canonical SK column for a dimension.
    ///
    /// Unregistered names fall back to the deterministic `<name>_sk`
    /// convention; this lookup never fails.
    pub fn sk_column(&self, dimension: &str) -> String {
        let key = dimension.trim().to_lowercase();
        self.sk_columns
            .get(&key)
            .cloned()
            .unwrap_or_else(|| format!("{}_sk", key))
    }

    /// Whether the dimension is explicitly registered
    pub fn is_registered(&self, dimension: &str) -> bool {
        self.sk_columns.contains_key(&dimension.trim().to_lowercase())
    }

    /// Expected column set for a registered dimension (empty if unregistered)
    pub fn standard_columns(&self, dimension: &str) -> Vec<String> {
        self.standard_columns
            .get(&dimension.trim().to_lowercase())
            .cloned()
            .unwrap_or_default()
    }

    /// Conventional target table name for a dimension
    pub fn dimension_table(&self, dimension: &str) -> String {
        format!("dim_{}", dimension.trim().to_lowercase())
    }

    /// Build the SK=0 unknown row for the exact column set given.
    ///
    /// The SK column gets 0, template columns get their dimension
    /// placeholder, everything else gets the generic text placeholder
    /// so the row's shape always matches real rows.
    pub fn unknown_row(&self, dimension: &str, columns: &[String]) -> Vec<Value> {
        let key = dimension.trim().to_lowercase();
        let sk_column = self.sk_column(&key);
        let template = self.unknown_templates.get(&key);

        columns
            .iter()
            .map(|col| {
                if *col == sk_column {
                    Value::Int(UNKNOWN_SK)
                } else if let Some(value) = template.and_then(|t| t.get(col)) {
                    value.clone()
                } else {
                    Value::from(UNKNOWN_TEXT)
                }
            })
            .collect()
    }
}

impl Default for NamingRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

fn cols(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

fn template(entries: &[(&str, Value)]) -> HashMap<String, Value> {
    entries
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

#[cfg(test)]
#[path = "registry_test.rs"]
mod tests;
