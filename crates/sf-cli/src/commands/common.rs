//! Shared utilities for CLI commands

use anyhow::{Context, Result};
use sf_core::{Config, NamingRegistry};
use sf_db::DuckDbWarehouse;
use sf_etl::Pipeline;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::cli::GlobalArgs;
use crate::pipelines;

/// Error type representing a non-zero process exit code.
///
/// Use `return Err(ExitCode(N).into())` instead of `std::process::exit(N)`
/// so that RAII destructors run and cleanup happens properly.
#[derive(Debug)]
pub(crate) struct ExitCode(pub(crate) i32);

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Intentionally empty: ExitCode is a control-flow mechanism, not a
        // user-facing error. If anyhow's Display chain ever reaches this
        // (e.g. downcast_ref fails in main.rs), we don't want "exit code N"
        // leaking into stderr.
        write!(f, "")
    }
}

impl std::error::Error for ExitCode {}

/// Loaded project state shared by commands
pub(crate) struct ProjectContext {
    pub(crate) config: Config,
    pub(crate) root: PathBuf,
    pub(crate) registry: Arc<NamingRegistry>,
}

impl ProjectContext {
    pub(crate) fn load(global: &GlobalArgs) -> Result<Self> {
        let root = PathBuf::from(&global.project_dir);
        let config = Config::load(&root).context("Failed to load project configuration")?;
        Ok(Self {
            config,
            root,
            registry: Arc::new(NamingRegistry::standard()),
        })
    }

    /// Open the configured warehouse database
    pub(crate) fn open_warehouse(&self) -> Result<DuckDbWarehouse> {
        let path = &self.config.warehouse.path;
        let db = if path == ":memory:" {
            DuckDbWarehouse::in_memory()
        } else {
            DuckDbWarehouse::from_path(&self.root.join(path))
        };
        db.with_context(|| format!("Failed to open warehouse at {}", path))
    }

    pub(crate) fn pipelines(&self) -> Vec<Box<dyn Pipeline>> {
        pipelines::build_pipelines(&self.config, &self.root, Arc::clone(&self.registry))
    }
}

/// Filter pipelines by a comma-separated name list, preserving
/// registration order. Unknown names are an error rather than a
/// silent no-op.
pub(crate) fn select_pipelines(
    pipelines: Vec<Box<dyn Pipeline>>,
    selection: Option<&str>,
) -> Result<Vec<Box<dyn Pipeline>>> {
    let Some(selection) = selection else {
        return Ok(pipelines);
    };

    let wanted: Vec<&str> = selection
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();

    for name in &wanted {
        if !pipelines.iter().any(|p| p.name() == *name) {
            anyhow::bail!("Unknown pipeline: {}", name);
        }
    }

    Ok(pipelines
        .into_iter()
        .filter(|p| wanted.contains(&p.name()))
        .collect())
}

/// Resolve the configured warehouse file for display
pub(crate) fn warehouse_display_path(config: &Config, root: &Path) -> String {
    if config.warehouse.path == ":memory:" {
        config.warehouse.path.clone()
    } else {
        root.join(&config.warehouse.path).display().to_string()
    }
}
