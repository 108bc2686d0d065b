// bicflow/src/cli.rs
//
// Single source of truth for all CLI definitions (Clap structs).

use bicflow_core::domain::configuration::CommitPolicy;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "bicflow")]
#[command(about = "Change-record ingestion: validation, feature normalization and paired persistence", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 📥 Ingests a CSV upload (or every .csv of a directory) into the store
    Ingest {
        /// CSV file, or a directory of CSV files
        #[arg(long, short)]
        input: PathBuf,

        /// Pipeline configuration (default: ./bicflow.yaml if present)
        #[arg(long)]
        config: Option<PathBuf>,

        /// DuckDB database file (overrides config and BICFLOW_DATABASE)
        #[arg(long)]
        db: Option<String>,

        /// per-row | batch
        #[arg(long)]
        commit_policy: Option<CommitPolicy>,

        /// Write the JSON response to this file instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Run against an in-memory store; nothing is written to disk
        #[arg(long, default_value = "false")]
        dry_run: bool,
    },

    /// 🔎 Validates and normalizes a CSV upload without writing anything
    Check {
        #[arg(long, short)]
        input: PathBuf,

        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// 🔍 Shows raw/derived pairing counts and the latest derived rows
    Inspect {
        /// DuckDB database file (default: from config)
        #[arg(long)]
        db: Option<String>,

        /// Number of sample rows to display
        #[arg(long, default_value = "5")]
        limit: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{Result, bail};
    use clap::Parser;

    #[test]
    fn test_cli_parse_ingest_defaults() -> Result<()> {
        let args = Cli::parse_from(["bicflow", "ingest", "--input", "uploads/"]);
        match args.command {
            Commands::Ingest {
                input,
                config,
                db,
                commit_policy,
                output,
                dry_run,
            } => {
                assert_eq!(input.to_string_lossy(), "uploads/");
                assert_eq!(config, None);
                assert_eq!(db, None);
                assert_eq!(commit_policy, None);
                assert_eq!(output, None);
                assert!(!dry_run);
                Ok(())
            }
            _ => bail!("Expected Ingest command"),
        }
    }

    #[test]
    fn test_cli_parse_ingest_policy() -> Result<()> {
        let args = Cli::parse_from([
            "bicflow",
            "ingest",
            "-i",
            "changes.csv",
            "--commit-policy",
            "batch",
            "--db",
            "/tmp/x.duckdb",
            "--dry-run",
        ]);
        match args.command {
            Commands::Ingest {
                commit_policy,
                db,
                dry_run,
                ..
            } => {
                assert_eq!(commit_policy, Some(CommitPolicy::Batch));
                assert_eq!(db.as_deref(), Some("/tmp/x.duckdb"));
                assert!(dry_run);
                Ok(())
            }
            _ => bail!("Expected Ingest command"),
        }
    }

    #[test]
    fn test_cli_rejects_unknown_policy() {
        let res = Cli::try_parse_from([
            "bicflow",
            "ingest",
            "-i",
            "changes.csv",
            "--commit-policy",
            "sometimes",
        ]);
        assert!(res.is_err());
    }

    #[test]
    fn test_cli_parse_inspect() -> Result<()> {
        let args = Cli::parse_from(["bicflow", "inspect", "--limit", "10"]);
        match args.command {
            Commands::Inspect { db, limit } => {
                assert_eq!(limit, 10);
                assert_eq!(db, None);
                Ok(())
            }
            _ => bail!("Expected Inspect command"),
        }
    }
}
