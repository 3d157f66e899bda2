//! sf-etl - Pipeline lifecycle for Starforge
//!
//! The extract → transform → validate → load lifecycle, the dimension
//! builder with surrogate-key assignment, the fact-side key resolver,
//! and the source readers feeding raw extracts into pipelines.

pub mod dimension;
pub mod error;
pub mod fact;
pub mod pipeline;
pub mod source;

pub use dimension::{build_dimension, DimensionPipeline, DimensionSource};
pub use error::{EtlError, EtlResult};
pub use fact::{dedupe_rows, DimensionRef, FactPipeline, FactSource, KeyLookup, MatchStats};
pub use pipeline::{Layer, Pipeline, Runner, Stage};
pub use source::{CsvSource, Source};
