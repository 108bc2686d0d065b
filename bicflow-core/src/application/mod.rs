// bicflow-core/src/application/mod.rs

pub mod pipeline;

// --- RE-EXPORTS (FACADE PATTERN) ---
// `use bicflow_core::application::IngestPipeline;` without knowing the file layout.
pub use pipeline::{IngestPipeline, IngestResponse, PreparedBatch, PreparedRow, RowAck, UploadStage};
