//! sf-core - Core library for Starforge
//!
//! This crate provides the in-memory table model, the dimension naming
//! and surrogate-key registry, the declarative validation engine, and
//! the run context shared across all Starforge components.

pub mod config;
pub mod context;
pub mod error;
pub mod registry;
pub mod table;
pub mod validation;

pub use config::{Config, CONFIG_FILE};
pub use context::RunContext;
pub use error::{CoreError, CoreResult};
pub use registry::{NamingRegistry, UNKNOWN_SK};
pub use table::{Table, Value};
pub use validation::{
    validate, DimensionValidator, RuleKind, Severity, ValidationResult, ValidationRule,
    ValidationSummary,
};
