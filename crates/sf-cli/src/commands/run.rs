//! Run command implementation

use anyhow::Result;
use sf_core::RunContext;
use sf_db::{Loader, WriteMode};
use sf_etl::Runner;
use std::time::Instant;

use crate::cli::{GlobalArgs, RunArgs};
use crate::commands::common::{select_pipelines, warehouse_display_path, ExitCode, ProjectContext};

/// Execute the run command
pub async fn execute(args: &RunArgs, global: &GlobalArgs) -> Result<()> {
    let start_time = Instant::now();
    let project = ProjectContext::load(global)?;
    let db = project.open_warehouse()?;

    let pipelines = select_pipelines(project.pipelines(), args.pipelines.as_deref())?;
    if pipelines.is_empty() {
        println!("No pipelines selected");
        return Ok(());
    }

    let mode = WriteMode::from(args.if_exists);
    let runner = Runner::new(Loader::new(project.config.batch_size), mode);

    let ctx = RunContext {
        dry_run: args.dry_run,
        limit: args.limit,
        skip_load: args.no_load,
        ..RunContext::new()
    };

    if global.verbose {
        eprintln!(
            "[verbose] Running {} pipelines against {} (mode={}, dry_run={})",
            pipelines.len(),
            warehouse_display_path(&project.config, &project.root),
            mode,
            ctx.dry_run
        );
    }

    println!("Running {} pipelines...\n", pipelines.len());

    let mut failure_count = 0;
    for pipeline in &pipelines {
        let pipeline_start = Instant::now();
        match runner.run(pipeline.as_ref(), &ctx, &db).await {
            Ok(table) => {
                println!(
                    "  ✓ {} [{}] {} rows ({}ms)",
                    pipeline.name(),
                    pipeline.layer(),
                    table.len(),
                    pipeline_start.elapsed().as_millis()
                );
            }
            Err(e) => {
                failure_count += 1;
                println!("  ✗ {} [{}]: {}", pipeline.name(), pipeline.layer(), e);
                if let Some(results) = e.validation_results() {
                    for result in results.iter().filter(|r| !r.passed) {
                        println!(
                            "      {} {} on {}: {}",
                            result.severity, result.rule_name, result.column, result.message
                        );
                    }
                }
            }
        }
    }

    println!();
    println!(
        "Completed {} of {} pipelines",
        pipelines.len() - failure_count,
        pipelines.len()
    );
    println!("Total time: {}ms", start_time.elapsed().as_millis());

    if failure_count > 0 {
        return Err(ExitCode(1).into());
    }
    Ok(())
}
