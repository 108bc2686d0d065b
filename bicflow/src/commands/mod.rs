// bicflow/src/commands/mod.rs

pub mod check;
pub mod ingest;
pub mod inspect;

use anyhow::Context;
use bicflow_core::domain::configuration::PipelineConfig;
use bicflow_core::infrastructure::config::{load_or_default, load_pipeline_config_file};
use bicflow_core::{BicflowError, ErrorClass};
use std::path::{Path, PathBuf};

/// `--config` when given, otherwise `./bicflow.yaml` or the defaults.
pub fn resolve_config(config: Option<&PathBuf>) -> anyhow::Result<PipelineConfig> {
    match config {
        Some(path) => load_pipeline_config_file(path)
            .with_context(|| format!("Failed to load configuration from {:?}", path)),
        None => load_or_default(Path::new("."))
            .context("Failed to load configuration from the working directory"),
    }
}

/// Prints the failure on stderr (diagnostic, then a JSON line) and returns
/// the exit code: 2 for client errors, 1 for server errors.
pub fn report_failure(err: anyhow::Error) -> i32 {
    let class = err
        .downcast_ref::<BicflowError>()
        .map(BicflowError::class)
        .unwrap_or(ErrorClass::Server);
    let detail = format!("{:#}", err);

    match err.downcast::<BicflowError>() {
        Ok(core) => eprintln!("{:?}", miette::Report::new(core)),
        Err(other) => eprintln!("❌ {:#}", other),
    }

    let body = serde_json::json!({ "detail": detail, "class": class });
    eprintln!("{}", body);

    match class {
        ErrorClass::Client => 2,
        ErrorClass::Server => 1,
    }
}
