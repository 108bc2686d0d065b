// bicflow-core/src/application/pipeline.rs

use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::error::BicflowError;

// Domain
use crate::domain::configuration::{CommitPolicy, PipelineConfig};
use crate::domain::numeric::{BatchBounds, NumericNormalizer};
use crate::domain::record::{DerivedFeatureRecord, RawTable, RecordId, ValidatedRecord};
use crate::domain::schema::SchemaValidator;
use crate::domain::text::TextNormalizer;

// Ports
use crate::infrastructure::adapters::PlaceholderPredictor;
use crate::ports::persistence::{PersistenceGateway, Transaction};
use crate::ports::predictor::{Prediction, Predictor};

/// Lifecycle of one upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UploadStage {
    Received,
    Validated,
    Normalized,
    Persisting,
    Committed,
    Failed,
}

impl fmt::Display for UploadStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Received => "received",
            Self::Validated => "validated",
            Self::Normalized => "normalized",
            Self::Persisting => "persisting",
            Self::Committed => "committed",
            Self::Failed => "failed",
        };
        write!(f, "{}", s)
    }
}

/// A row ready to be written: what was submitted plus its features.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreparedRow {
    pub row: usize,
    pub record: ValidatedRecord,
    pub features: DerivedFeatureRecord,
}

/// Output of the pure stages. Bounds are kept for reporting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreparedBatch {
    pub bounds: BatchBounds,
    pub rows: Vec<PreparedRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowAck {
    pub row: usize,
    pub accepted: bool,
    pub raw_id: RecordId,
    #[serde(flatten)]
    pub prediction: Prediction,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IngestResponse {
    pub total_records: usize,
    pub results: Vec<RowAck>,
}

/// Validation -> normalization -> paired persistence.
///
/// Owns its configuration; two pipelines never share state. The prediction
/// attached to each acknowledgment comes from the configured `Predictor`,
/// which defaults to `PlaceholderPredictor`: a fixed answer, not an inference.
pub struct IngestPipeline {
    config: PipelineConfig,
    text: TextNormalizer,
    predictor: Arc<dyn Predictor>,
}

impl IngestPipeline {
    pub fn new(config: PipelineConfig) -> Result<Self, BicflowError> {
        config.check()?;
        let text = TextNormalizer::new(&config.text);
        Ok(Self {
            config,
            text,
            predictor: Arc::new(PlaceholderPredictor),
        })
    }

    pub fn with_predictor(mut self, predictor: Arc<dyn Predictor>) -> Self {
        self.predictor = predictor;
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Stages a to c. Pure: touches no store, fails before any write.
    #[instrument(skip_all, fields(rows = table.len()))]
    pub fn prepare(&self, table: &RawTable) -> Result<PreparedBatch, BicflowError> {
        info!(stage = %UploadStage::Received, columns = table.headers.len(), "Upload received");

        let records = SchemaValidator::new(&self.config.columns).validate(table)?;
        info!(stage = %UploadStage::Validated, records = records.len(), "Schema validated");

        // Row-wise text cleaning, then the batch-wide numeric barrier.
        let texts: Vec<String> = records
            .iter()
            .map(|record| self.text.normalize_record(record))
            .collect();
        let (bounds, numeric) = NumericNormalizer::normalize_batch(&records);

        let rows = records
            .into_iter()
            .zip(texts)
            .zip(numeric)
            .enumerate()
            .map(|(row, ((record, clean_text), scaled))| {
                let features = DerivedFeatureRecord::assemble(clean_text, &scaled, record.label.clone());
                PreparedRow {
                    row,
                    record,
                    features,
                }
            })
            .collect();

        info!(stage = %UploadStage::Normalized, "Features computed");
        Ok(PreparedBatch { bounds, rows })
    }

    /// The whole upload. Dropping the returned future rolls back the open
    /// transaction, if any.
    pub async fn ingest(
        &self,
        table: &RawTable,
        gateway: &dyn PersistenceGateway,
    ) -> Result<IngestResponse, BicflowError> {
        let batch = self.prepare(table)?;
        self.persist(&batch, gateway).await
    }

    /// Stage d, under the configured commit policy.
    #[instrument(skip_all, fields(rows = batch.rows.len(), engine = gateway.engine_name(), policy = %self.config.persistence.commit_policy))]
    pub async fn persist(
        &self,
        batch: &PreparedBatch,
        gateway: &dyn PersistenceGateway,
    ) -> Result<IngestResponse, BicflowError> {
        info!(stage = %UploadStage::Persisting, "Writing raw/derived pairs");

        let written = match self.config.persistence.commit_policy {
            CommitPolicy::PerRow => persist_per_row(batch, gateway).await,
            CommitPolicy::Batch => persist_as_one(batch, gateway).await,
        };

        let ids = match written {
            Ok(ids) => ids,
            Err(e) => {
                warn!(stage = %UploadStage::Failed, error = %e, "Upload failed");
                return Err(e);
            }
        };
        info!(stage = %UploadStage::Committed, committed = ids.len(), "Upload committed");

        let results = batch
            .rows
            .iter()
            .zip(ids)
            .map(|(row, raw_id)| RowAck {
                row: row.row,
                accepted: true,
                raw_id,
                prediction: self.predictor.predict(&row.features),
            })
            .collect::<Vec<_>>();

        Ok(IngestResponse {
            total_records: results.len(),
            results,
        })
    }
}

// One transaction per pair. Earlier pairs stay committed when a later one fails.
async fn persist_per_row(
    batch: &PreparedBatch,
    gateway: &dyn PersistenceGateway,
) -> Result<Vec<RecordId>, BicflowError> {
    let mut ids = Vec::with_capacity(batch.rows.len());

    for row in &batch.rows {
        let mut tx = gateway
            .begin()
            .await
            .map_err(|e| persistence_error(row.row, ids.len(), e))?;

        match write_pair(tx.as_mut(), row).await {
            Ok(id) => {
                tx.commit()
                    .await
                    .map_err(|e| persistence_error(row.row, ids.len(), e))?;
                ids.push(id);
            }
            Err(e) => {
                rollback(tx).await;
                return Err(persistence_error(row.row, ids.len(), e));
            }
        }
    }
    Ok(ids)
}

// One transaction around every pair: all rows or none.
async fn persist_as_one(
    batch: &PreparedBatch,
    gateway: &dyn PersistenceGateway,
) -> Result<Vec<RecordId>, BicflowError> {
    let Some(last) = batch.rows.last() else {
        return Ok(Vec::new());
    };

    let mut tx = gateway
        .begin()
        .await
        .map_err(|e| persistence_error(0, 0, e))?;

    let mut ids = Vec::with_capacity(batch.rows.len());
    for row in &batch.rows {
        match write_pair(tx.as_mut(), row).await {
            Ok(id) => ids.push(id),
            Err(e) => {
                rollback(tx).await;
                return Err(persistence_error(row.row, 0, e));
            }
        }
    }

    tx.commit()
        .await
        .map_err(|e| persistence_error(last.row, 0, e))?;
    Ok(ids)
}

// The raw id must exist before the derived record can reference it.
async fn write_pair(tx: &mut dyn Transaction, row: &PreparedRow) -> Result<RecordId, BicflowError> {
    let id = tx.insert_raw(&row.record).await?;
    tx.insert_derived(id, &row.features).await?;
    Ok(id)
}

async fn rollback(tx: Box<dyn Transaction>) {
    if let Err(e) = tx.rollback().await {
        warn!(error = %e, "Rollback failed");
    }
}

fn persistence_error(row: usize, committed_rows: usize, source: BicflowError) -> BicflowError {
    BicflowError::Persistence {
        row,
        committed_rows,
        message: source.to_string(),
    }
}
