//! Run-scoped execution context

use std::collections::HashMap;

/// Options for a single pipeline invocation.
///
/// Created once per run and never shared across concurrent runs.
#[derive(Debug, Clone, Default)]
pub struct RunContext {
    /// Run extract/transform/validate only, skip the load stage
    pub dry_run: bool,

    /// Cap the extracted row count before transform (debugging aid)
    pub limit: Option<usize>,

    /// Skip persistence even when not a dry run
    pub skip_load: bool,

    /// Pipeline-specific extension parameters
    pub params: HashMap<String, String>,
}

impl RunContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dry_run(mut self) -> Self {
        self.dry_run = true;
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_skip_load(mut self, skip: bool) -> Self {
        self.skip_load = skip;
        self
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Whether the load stage should run at all
    pub fn should_load(&self) -> bool {
        !self.dry_run && !self.skip_load
    }
}
