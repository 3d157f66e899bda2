//! Starforge CLI - dimensional ETL pipelines over DuckDB

use clap::Parser;

mod cli;
mod commands;
mod pipelines;

use cli::Cli;
use commands::{ls, run, validate};

#[tokio::main]
async fn main() -> std::process::ExitCode {
    let cli = Cli::parse();

    let result = match &cli.command {
        cli::Commands::Run(args) => run::execute(args, &cli.global).await,
        cli::Commands::Ls(args) => ls::execute(args, &cli.global).await,
        cli::Commands::Validate(args) => validate::execute(args, &cli.global).await,
    };

    match result {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(err) => match err.downcast_ref::<commands::common::ExitCode>() {
            // Structured exit: the command already reported its failure
            Some(code) => std::process::ExitCode::from(code.0 as u8),
            None => {
                eprintln!("Error: {:#}", err);
                std::process::ExitCode::FAILURE
            }
        },
    }
}
