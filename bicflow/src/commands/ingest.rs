// bicflow/src/commands/ingest.rs
//
// USE CASE: Ingest one upload, or every CSV of a directory (one batch per file).

use anyhow::Context;
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;

use bicflow_core::BicflowError;
use bicflow_core::application::IngestPipeline;
use bicflow_core::domain::configuration::CommitPolicy;
use bicflow_core::infrastructure::adapters::{DuckDbGateway, InMemoryGateway};
use bicflow_core::infrastructure::fs::{atomic_write, discover_uploads};
use bicflow_core::infrastructure::reader::read_table_file;
use bicflow_core::ports::PersistenceGateway;

use super::resolve_config;

pub struct IngestArgs {
    pub input: PathBuf,
    pub config: Option<PathBuf>,
    pub db: Option<String>,
    pub commit_policy: Option<CommitPolicy>,
    pub output: Option<PathBuf>,
    pub dry_run: bool,
}

pub async fn execute(args: IngestArgs) -> anyhow::Result<()> {
    let start = Instant::now();

    // A. Config: file / env, then flags on top.
    let mut config = resolve_config(args.config.as_ref())?;
    if let Some(db) = args.db {
        config.persistence.database = db;
    }
    if let Some(policy) = args.commit_policy {
        config.persistence.commit_policy = policy;
    }

    // B. Uploads. A missing input is a caller mistake and fails before any
    // store file is created.
    let uploads = discover_uploads(&args.input).map_err(BicflowError::from)?;
    info!(input = ?args.input, uploads = uploads.len(), "Uploads discovered");
    if uploads.is_empty() {
        eprintln!("⚠️  No CSV upload found in {}", args.input.display());
    }

    // C. Store
    let gateway: Box<dyn PersistenceGateway> = if args.dry_run {
        eprintln!("🧪 Dry run: in-memory store");
        Box::new(InMemoryGateway::new())
    } else {
        let db_path = config.persistence.database.clone();
        eprintln!("🦆 Store: {}", db_path);
        Box::new(
            DuckDbGateway::open(&db_path)
                .with_context(|| format!("Failed to initialize DuckDB at {}", db_path))?,
        )
    };

    let pipeline = IngestPipeline::new(config)?;

    // D. One upload per file. The first failure stops the run; earlier
    // uploads stay committed.
    let single = args.input.is_file();
    let mut outcomes = Vec::with_capacity(uploads.len());
    for path in &uploads {
        eprintln!("📥 {}", path.display());
        let table = read_table_file(path).map_err(BicflowError::from)?;
        let response = pipeline
            .ingest(&table, gateway.as_ref())
            .await
            .with_context(|| format!("Upload {} failed", path.display()))?;
        eprintln!("   ✅ {} records", response.total_records);

        let mut value = serde_json::to_value(&response)?;
        if !single && let Some(obj) = value.as_object_mut() {
            obj.insert(
                "file".to_string(),
                serde_json::Value::String(path.display().to_string()),
            );
        }
        outcomes.push(value);
    }

    // E. Response: the object itself for a file, an array for a directory.
    let body = if single {
        outcomes.pop().unwrap_or(serde_json::Value::Null)
    } else {
        serde_json::Value::Array(outcomes)
    };
    let json = serde_json::to_string_pretty(&body)?;

    match args.output {
        Some(path) => {
            atomic_write(&path, json.as_bytes())
                .with_context(|| format!("Failed to write response to {}", path.display()))?;
            eprintln!("📝 Response written to {}", path.display());
        }
        None => println!("{}", json),
    }

    eprintln!("✨ Done in {:.2?}", start.elapsed());
    Ok(())
}
