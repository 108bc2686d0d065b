// bicflow/src/commands/check.rs
//
// USE CASE: Validate and normalize an upload without touching a store.

use std::path::PathBuf;

use bicflow_core::BicflowError;
use bicflow_core::application::IngestPipeline;
use bicflow_core::infrastructure::reader::read_table_file;

use super::resolve_config;

pub fn execute(input: PathBuf, config: Option<PathBuf>) -> anyhow::Result<()> {
    let config = resolve_config(config.as_ref())?;
    let pipeline = IngestPipeline::new(config)?;

    let table = read_table_file(&input).map_err(BicflowError::from)?;
    let batch = pipeline.prepare(&table)?;
    eprintln!("🔎 {}: {} rows valid", input.display(), batch.rows.len());

    println!("{}", serde_json::to_string_pretty(&batch)?);
    Ok(())
}
