//! List command implementation

use anyhow::Result;
use serde::Serialize;

use crate::cli::{GlobalArgs, LsArgs, LsOutput};
use crate::commands::common::ProjectContext;

#[derive(Debug, Serialize)]
struct PipelineInfo {
    name: String,
    layer: String,
    table: String,
}

/// Execute the ls command
pub async fn execute(args: &LsArgs, global: &GlobalArgs) -> Result<()> {
    let project = ProjectContext::load(global)?;

    let info: Vec<PipelineInfo> = project
        .pipelines()
        .iter()
        .map(|p| PipelineInfo {
            name: p.name().to_string(),
            layer: p.layer().to_string(),
            table: p.table_name().to_string(),
        })
        .collect();

    match args.output {
        LsOutput::Json => {
            println!("{}", serde_json::to_string_pretty(&info)?);
        }
        LsOutput::Table => {
            let name_width = info
                .iter()
                .map(|i| i.name.len())
                .max()
                .unwrap_or(4)
                .max("NAME".len());

            println!("{:<name_width$}  {:<10}  TABLE", "NAME", "LAYER");
            for entry in &info {
                println!(
                    "{:<name_width$}  {:<10}  {}",
                    entry.name, entry.layer, entry.table
                );
            }
            println!("\n{} pipeline(s)", info.len());
        }
    }
    Ok(())
}
