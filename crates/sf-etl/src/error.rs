//! Error types for sf-etl

use crate::pipeline::Stage;
use sf_core::CoreError;
use sf_db::DbError;
use thiserror::Error;

/// Pipeline error type for Starforge
#[derive(Error, Debug)]
pub enum EtlError {
    /// A lifecycle stage failed; the run terminates
    #[error("{stage} stage failed in pipeline '{pipeline}': {source}")]
    Stage {
        pipeline: String,
        stage: Stage,
        #[source]
        source: Box<EtlError>,
    },

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Db(#[from] DbError),

    #[error("CSV read error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl EtlError {
    /// Wrap an error with the stage it occurred in
    pub fn at_stage(self, pipeline: &str, stage: Stage) -> Self {
        EtlError::Stage {
            pipeline: pipeline.to_string(),
            stage,
            source: Box::new(self),
        }
    }

    /// The validation results carried by a validation failure, if any
    pub fn validation_results(&self) -> Option<&[sf_core::ValidationResult]> {
        match self {
            EtlError::Core(CoreError::ValidationFailed { results, .. }) => Some(results),
            EtlError::Stage { source, .. } => source.validation_results(),
            _ => None,
        }
    }
}

/// Result type alias for EtlError
pub type EtlResult<T> = Result<T, EtlError>;
