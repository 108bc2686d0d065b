// bicflow-core/src/infrastructure/adapters/memory.rs

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::domain::record::{DerivedFeatureRecord, RawPersistedRecord, RecordId, ValidatedRecord};
use crate::error::BicflowError;
use crate::ports::persistence::{PairingReport, PersistenceGateway, Transaction};

#[derive(Debug, Default)]
struct MemoryState {
    next_id: i64,
    raw: Vec<RawPersistedRecord>,
    derived: Vec<(RecordId, DerivedFeatureRecord)>,
}

/// Volatile store used for dry runs and tests. Writes are staged inside the
/// transaction and only reach the shared state on commit.
#[derive(Debug, Clone, Default)]
pub struct InMemoryGateway {
    state: Arc<Mutex<MemoryState>>,
}

impl InMemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn raw_records(&self) -> Vec<RawPersistedRecord> {
        self.state.lock().await.raw.clone()
    }

    pub async fn derived_records(&self) -> Vec<(RecordId, DerivedFeatureRecord)> {
        self.state.lock().await.derived.clone()
    }

    pub async fn pairing_report(&self) -> PairingReport {
        let state = self.state.lock().await;
        let raw_ids: HashSet<RecordId> = state.raw.iter().map(|r| r.id).collect();
        let derived_ids: HashSet<RecordId> = state.derived.iter().map(|(id, _)| *id).collect();

        PairingReport {
            raw_records: state.raw.len() as u64,
            derived_records: state.derived.len() as u64,
            orphan_raw: raw_ids.difference(&derived_ids).count() as u64,
            orphan_derived: state
                .derived
                .iter()
                .filter(|(id, _)| !raw_ids.contains(id))
                .count() as u64,
        }
    }
}

#[async_trait]
impl PersistenceGateway for InMemoryGateway {
    async fn begin(&self) -> Result<Box<dyn Transaction>, BicflowError> {
        let state = self.state.clone().lock_owned().await;
        Ok(Box::new(MemoryTransaction {
            next_id: state.next_id,
            state,
            raw: Vec::new(),
            derived: Vec::new(),
        }))
    }

    fn engine_name(&self) -> &str {
        "memory"
    }
}

struct MemoryTransaction {
    state: OwnedMutexGuard<MemoryState>,
    next_id: i64,
    raw: Vec<RawPersistedRecord>,
    derived: Vec<(RecordId, DerivedFeatureRecord)>,
}

impl MemoryTransaction {
    fn raw_exists(&self, id: RecordId) -> bool {
        self.raw.iter().chain(self.state.raw.iter()).any(|r| r.id == id)
    }

    fn derived_exists(&self, id: RecordId) -> bool {
        self.derived
            .iter()
            .chain(self.state.derived.iter())
            .any(|(raw_id, _)| *raw_id == id)
    }
}

#[async_trait]
impl Transaction for MemoryTransaction {
    async fn insert_raw(&mut self, record: &ValidatedRecord) -> Result<RecordId, BicflowError> {
        self.next_id += 1;
        let id = RecordId(self.next_id);
        self.raw.push(RawPersistedRecord {
            id,
            created_at: Utc::now(),
            record: record.clone(),
        });
        Ok(id)
    }

    // Same pairing constraints as the DuckDB schema.
    async fn insert_derived(
        &mut self,
        raw_id: RecordId,
        features: &DerivedFeatureRecord,
    ) -> Result<(), BicflowError> {
        if !self.raw_exists(raw_id) {
            return Err(BicflowError::InternalError(format!(
                "derived record references unknown raw record {}",
                raw_id
            )));
        }
        if self.derived_exists(raw_id) {
            return Err(BicflowError::InternalError(format!(
                "raw record {} already has derived features",
                raw_id
            )));
        }
        self.derived.push((raw_id, features.clone()));
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), BicflowError> {
        let mut tx = self;
        let raw = std::mem::take(&mut tx.raw);
        let derived = std::mem::take(&mut tx.derived);
        tx.state.next_id = tx.next_id;
        tx.state.raw.extend(raw);
        tx.state.derived.extend(derived);
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), BicflowError> {
        // Staged writes are dropped with the transaction.
        Ok(())
    }
}
