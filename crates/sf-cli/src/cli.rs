//! CLI argument definitions using clap derive API

use clap::{Args, Parser, Subcommand, ValueEnum};
use sf_db::WriteMode;

/// Starforge - dimensional ETL pipelines over DuckDB
#[derive(Parser, Debug)]
#[command(name = "sf")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all commands
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to project directory
    #[arg(short = 'p', long, global = true, default_value = ".")]
    pub project_dir: String,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Execute pipelines against the warehouse
    Run(RunArgs),

    /// List registered pipelines
    Ls(LsArgs),

    /// Run pipelines through validation without loading
    Validate(ValidateArgs),
}

/// Arguments for the run command
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Pipeline names to run (comma-separated, default: all)
    #[arg(short = 'P', long)]
    pub pipelines: Option<String>,

    /// Extract, transform and validate only; never touch the warehouse
    #[arg(long)]
    pub dry_run: bool,

    /// Cap the extracted row count per pipeline
    #[arg(long, value_name = "N")]
    pub limit: Option<usize>,

    /// Skip the load stage while still running validation
    #[arg(long)]
    pub no_load: bool,

    /// Behavior when the target table already exists
    #[arg(long, value_enum, default_value = "replace")]
    pub if_exists: IfExists,
}

/// Write disposition for existing target tables
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum IfExists {
    /// Abort if the target table exists
    Fail,
    /// Drop and recreate the target table
    Replace,
    /// Insert into the existing table
    Append,
}

impl From<IfExists> for WriteMode {
    fn from(mode: IfExists) -> Self {
        match mode {
            IfExists::Fail => WriteMode::Fail,
            IfExists::Replace => WriteMode::Replace,
            IfExists::Append => WriteMode::Append,
        }
    }
}

/// Arguments for the ls command
#[derive(Args, Debug)]
pub struct LsArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub output: LsOutput,
}

/// List output formats
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LsOutput {
    /// Aligned columns
    Table,
    /// JSON output
    Json,
}

/// Arguments for the validate command
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Pipeline names to validate (comma-separated, default: all)
    #[arg(short = 'P', long)]
    pub pipelines: Option<String>,
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
