// bicflow-core/src/infrastructure/reader.rs

use std::fs;
use std::path::Path;
use tracing::{debug, instrument};

use crate::domain::record::RawTable;
use crate::infrastructure::error::InfrastructureError;

/// Parses an uploaded comma-delimited table. The first record is the header.
/// Short rows are kept (absent cells read as missing); rows wider than the
/// header are a format error.
pub fn read_table(bytes: &[u8]) -> Result<RawTable, InfrastructureError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(bytes);

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    if headers.iter().all(|h| h.trim().is_empty()) {
        return Err(InfrastructureError::InputFormat(
            "No columns to parse from file".to_string(),
        ));
    }

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        if record.len() > headers.len() {
            // Quoted fields may span lines, so the row index is not the line.
            let line = record.position().map_or(0, |pos| pos.line());
            return Err(InfrastructureError::InputFormat(format!(
                "Expected {} fields in line {}, saw {}",
                headers.len(),
                line,
                record.len()
            )));
        }
        rows.push(record.iter().map(str::to_string).collect());
    }

    Ok(RawTable::new(headers, rows))
}

#[instrument]
pub fn read_table_file(path: &Path) -> Result<RawTable, InfrastructureError> {
    let bytes = fs::read(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => {
            InfrastructureError::InputNotFound(path.display().to_string())
        }
        _ => InfrastructureError::Io(e),
    })?;
    let table = read_table(&bytes)?;
    debug!(columns = table.headers.len(), rows = table.len(), "Upload parsed");
    Ok(table)
}
