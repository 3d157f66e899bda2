//! Validate command implementation
//!
//! Runs the selected pipelines through extract, transform and
//! validate without ever writing to the warehouse. Dimension lookups
//! for facts still read from the warehouse's current state.

use anyhow::Result;
use sf_core::RunContext;
use sf_etl::Runner;
use std::time::Instant;

use crate::cli::{GlobalArgs, ValidateArgs};
use crate::commands::common::{select_pipelines, ExitCode, ProjectContext};

/// Execute the validate command
pub async fn execute(args: &ValidateArgs, global: &GlobalArgs) -> Result<()> {
    let start_time = Instant::now();
    let project = ProjectContext::load(global)?;
    let db = project.open_warehouse()?;

    let pipelines = select_pipelines(project.pipelines(), args.pipelines.as_deref())?;
    let ctx = RunContext::new().dry_run();
    let runner = Runner::default();

    println!("Validating {} pipelines...\n", pipelines.len());

    let mut failure_count = 0;
    for pipeline in &pipelines {
        match runner.run(pipeline.as_ref(), &ctx, &db).await {
            Ok(table) => {
                println!("  ✓ {} ({} rows)", pipeline.name(), table.len());
            }
            Err(e) => {
                failure_count += 1;
                match e.validation_results() {
                    Some(results) => {
                        println!("  ✗ {}", pipeline.name());
                        for result in results.iter().filter(|r| !r.passed) {
                            println!(
                                "      {} {} on {}: {} ({}/{} rows)",
                                result.severity,
                                result.rule_name,
                                result.column,
                                result.message,
                                result.failed_count,
                                result.total_count
                            );
                        }
                    }
                    None => {
                        println!("  ✗ {}: {}", pipeline.name(), e);
                    }
                }
            }
        }
    }

    println!();
    println!(
        "{} passed, {} failed ({}ms)",
        pipelines.len() - failure_count,
        failure_count,
        start_time.elapsed().as_millis()
    );

    if failure_count > 0 {
        return Err(ExitCode(1).into());
    }
    Ok(())
}
