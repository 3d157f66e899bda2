//! Error types for sf-core

use crate::validation::ValidationResult;
use thiserror::Error;

/// Core error type for Starforge
#[derive(Error, Debug)]
pub enum CoreError {
    /// E001: Configuration file not found
    #[error("[E001] Config file not found: {path}")]
    ConfigNotFound { path: String },

    /// E002: Failed to parse configuration file
    #[error("[E002] Failed to parse config: {message}")]
    ConfigParseError { message: String },

    /// E003: Invalid configuration value
    #[error("[E003] Invalid config: {message}")]
    ConfigInvalid { message: String },

    /// E004: Source extraction failed
    #[error("[E004] Extraction failed for {pipeline}: {message}")]
    ExtractionFailed { pipeline: String, message: String },

    /// E005: Transform produced an unexpected shape
    #[error("[E005] Transformation failed for {pipeline}: {message}")]
    TransformationFailed { pipeline: String, message: String },

    /// E006: Referenced column is absent from the table
    #[error("[E006] Column '{column}' not found in table '{table}'")]
    MissingColumn { table: String, column: String },

    /// E007: Row arity does not match the table's column count
    #[error("[E007] Row has {actual} values, table '{table}' has {expected} columns")]
    RowArityMismatch {
        table: String,
        expected: usize,
        actual: usize,
    },

    /// E008: Validation rules produced ERROR-severity failures
    #[error("[E008] Validation failed for dimension '{dimension}': {error_count} error(s) across {total_rules} rule(s)")]
    ValidationFailed {
        dimension: String,
        error_count: usize,
        total_rules: usize,
        results: Vec<ValidationResult>,
    },

    /// E009: IO error
    #[error("[E009] IO error: {0}")]
    Io(#[from] std::io::Error),

    /// E010: YAML parse error
    #[error("[E010] Config parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),
}

/// Result type alias for CoreError
pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_codes_are_stable() {
        let err = CoreError::ConfigNotFound {
            path: "starforge.yml".to_string(),
        };
        assert!(err.to_string().starts_with("[E001]"));

        let err = CoreError::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert!(err.to_string().starts_with("[E009]"));

        let yaml = serde_yaml::from_str::<usize>("[").unwrap_err();
        assert!(CoreError::from(yaml).to_string().starts_with("[E010]"));
    }
}
