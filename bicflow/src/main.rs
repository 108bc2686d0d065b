// bicflow/src/main.rs

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // RUST_LOG=debug bicflow ingest ... to see the per-stage details.
    // Logs go to stderr: stdout carries the JSON response.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Ingest {
            input,
            config,
            db,
            commit_policy,
            output,
            dry_run,
        } => {
            commands::ingest::execute(commands::ingest::IngestArgs {
                input,
                config,
                db,
                commit_policy,
                output,
                dry_run,
            })
            .await
        }
        Commands::Check { input, config } => commands::check::execute(input, config),
        Commands::Inspect { db, limit } => commands::inspect::execute(db, limit).await,
    };

    if let Err(err) = result {
        std::process::exit(commands::report_failure(err));
    }
}
