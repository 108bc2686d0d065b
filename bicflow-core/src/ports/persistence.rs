// bicflow-core/src/ports/persistence.rs

// What the pipeline needs from a store: a transaction in which a raw record
// and its derived features are written as one unit. Nothing here knows about
// tables or SQL.

use async_trait::async_trait;
use serde::Serialize;

use crate::domain::record::{DerivedFeatureRecord, RecordId, ValidatedRecord};
use crate::error::BicflowError;

#[async_trait]
pub trait PersistenceGateway: Send + Sync {
    /// Opens a unit of work. Holding the returned transaction keeps other
    /// writers of the paired tables out until it is committed or dropped.
    async fn begin(&self) -> Result<Box<dyn Transaction>, BicflowError>;

    fn engine_name(&self) -> &str;
}

/// One open unit of work. Dropping it without `commit` rolls it back.
#[async_trait]
pub trait Transaction: Send {
    /// Stores the record as submitted and returns its generated identifier.
    async fn insert_raw(&mut self, record: &ValidatedRecord) -> Result<RecordId, BicflowError>;

    async fn insert_derived(
        &mut self,
        raw_id: RecordId,
        features: &DerivedFeatureRecord,
    ) -> Result<(), BicflowError>;

    async fn commit(self: Box<Self>) -> Result<(), BicflowError>;

    async fn rollback(self: Box<Self>) -> Result<(), BicflowError>;
}

/// Consistency of the raw/derived pairing as seen by a store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PairingReport {
    pub raw_records: u64,
    pub derived_records: u64,
    /// Raw records with no derived record.
    pub orphan_raw: u64,
    /// Derived records whose raw record does not exist.
    pub orphan_derived: u64,
}

impl PairingReport {
    pub fn is_consistent(&self) -> bool {
        self.orphan_raw == 0 && self.orphan_derived == 0 && self.raw_records == self.derived_records
    }
}
